use foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Bounding box of the widget element plus the document scroll offset.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height).max(0.0)
    }

    /// Client (window) coordinates to widget-local coordinates.
    pub fn to_local(&self, client: Vec2) -> Vec2 {
        Vec2::new(
            client.x + self.scroll_x - self.left,
            client.y + self.scroll_y - self.top,
        )
    }
}

/// Position of a mouse or touch event.
///
/// `client_*` is relative to the window, `page_*` to the document; for touch
/// events pass the first changed touch.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
    pub page_x: f64,
    pub page_y: f64,
}

impl PointerEvent {
    /// Event on an unscrolled page, where client and page coordinates agree.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            client_x: x,
            client_y: y,
            page_x: x,
            page_y: y,
        }
    }

    pub fn client(&self) -> Vec2 {
        Vec2::new(self.client_x, self.client_y)
    }

    pub fn page(&self) -> Vec2 {
        Vec2::new(self.page_x, self.page_y)
    }
}

/// Raw wheel input as browsers report it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    /// `wheelDelta` (positive when scrolling up, 120 per notch).
    Wheel(f64),
    /// Firefox `detail` (positive when scrolling down, 3 per notch).
    Detail(f64),
}

impl WheelDelta {
    /// Relative zoom step; the scale factor is multiplied by `1 - step`.
    pub fn zoom_step(self) -> f64 {
        match self {
            WheelDelta::Wheel(d) => d / 3000.0,
            WheelDelta::Detail(d) => -d / 300.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,
}

/// Drag bookkeeping, in widget-local coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerState {
    pub pos: Vec2,
    /// Position at the last applied drag step.
    pub saved: Vec2,
    pub down: bool,
}

impl PointerState {
    pub fn phase(&self) -> DragPhase {
        if self.down {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Viewport, WheelDelta};
    use foundation::math::Vec2;

    #[test]
    fn local_coordinates_account_for_offset_and_scroll() {
        let vp = Viewport {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 300.0,
            scroll_x: 10.0,
            scroll_y: 20.0,
        };
        assert_eq!(vp.to_local(Vec2::new(150.0, 60.0)), Vec2::new(60.0, 30.0));
        assert_eq!(vp.center(), Vec2::new(200.0, 150.0));
        assert_eq!(vp.min_side(), 300.0);
    }

    #[test]
    fn wheel_steps_follow_browser_conventions() {
        assert_eq!(WheelDelta::Wheel(120.0).zoom_step(), 0.04);
        assert_eq!(WheelDelta::Detail(3.0).zoom_step(), -0.01);
    }
}
