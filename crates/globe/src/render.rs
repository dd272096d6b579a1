use serde::Serialize;

use crate::color::Color;
use crate::pointer::Viewport;
use crate::rotation::Rotation;

/// Mutable per-country record, one per feature in atlas order.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct CountryState {
    pub value: Option<f64>,
    pub color: Color,
    pub border_color: Color,
}

/// Everything a renderer needs to draw the globe for the current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame<'a> {
    pub viewport: Viewport,
    /// Projection translate, widget-local pixels.
    pub center: [f64; 2],
    /// Projection scale (globe radius in pixels).
    pub scale: f64,
    pub rotation: Rotation,
    pub fill_color: Color,
    pub outer_border_color: Color,
    pub highlight_color: Color,
    pub highlight: Option<usize>,
    pub countries: &'a [CountryState],
}

/// Draws frames produced by the view. Projection and path generation live
/// behind this seam.
pub trait GlobeRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>);
}

/// Renderer that discards every frame.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopRenderer;

impl GlobeRenderer for NoopRenderer {
    fn render(&mut self, _frame: &RenderFrame<'_>) {}
}

impl<F> GlobeRenderer for F
where
    F: FnMut(&RenderFrame<'_>),
{
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self(frame)
    }
}
