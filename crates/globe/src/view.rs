use foundation::math::Vec2;
use foundation::time::Time;
use tracing::{debug, warn};

use crate::atlas::CountryAtlas;
use crate::color::{Color, ColorScale, LegendEntry};
use crate::config::{GlobeConfig, MIN_SCALE_FACTOR};
use crate::hooks::{CountryRef, DefaultHooks, GlobeHooks, Tooltip};
use crate::pointer::{DragPhase, PointerEvent, PointerState, Viewport, WheelDelta};
use crate::render::{CountryState, GlobeRenderer, RenderFrame};
use crate::rotation::{CompletionCallback, Rotation, RotationTransition, TransitionStep};

/// Pointer interaction on a rendered country shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CountryAction {
    Hover,
    Move,
    Leave,
    Click,
    DoubleClick,
}

/// State of the rotating globe widget.
///
/// Owns the country atlas and one [`CountryState`] per feature. Rotation,
/// resize and zoom redraw immediately; value, color and highlight setters only
/// update state and take effect on the next [`GlobeView::redraw`].
pub struct GlobeView {
    atlas: CountryAtlas,
    states: Vec<CountryState>,
    config: GlobeConfig,
    viewport: Viewport,
    scale_factor: f64,
    scale: f64,
    center: Vec2,
    rotation: Rotation,
    highlight: Option<usize>,
    pointer: PointerState,
    color_scale: Option<ColorScale>,
    transition: Option<RotationTransition>,
    tooltip: Option<Tooltip>,
    renderer: Box<dyn GlobeRenderer>,
    hooks: Box<dyn GlobeHooks>,
}

impl std::fmt::Debug for GlobeView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobeView")
            .field("countries", &self.states.len())
            .field("viewport", &self.viewport)
            .field("scale_factor", &self.scale_factor)
            .field("rotation", &self.rotation)
            .field("highlight", &self.highlight)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

impl GlobeView {
    /// Builds the view with every country unset and draws the first frame.
    pub fn new(
        atlas: CountryAtlas,
        config: GlobeConfig,
        viewport: Viewport,
        renderer: impl GlobeRenderer + 'static,
    ) -> Self {
        let initial = CountryState {
            value: None,
            color: config.palette.null_color,
            border_color: config.palette.border_color,
        };
        let mut view = Self {
            states: vec![initial; atlas.len()],
            atlas,
            scale_factor: config.scale_factor.max(zoom_floor(&config)),
            config,
            viewport,
            scale: 0.0,
            center: Vec2::ZERO,
            rotation: Rotation::default(),
            highlight: None,
            pointer: PointerState::default(),
            color_scale: None,
            transition: None,
            tooltip: None,
            renderer: Box::new(renderer),
            hooks: Box::new(DefaultHooks),
        };
        view.resize(viewport);
        view
    }

    pub fn with_hooks(mut self, hooks: impl GlobeHooks + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn atlas(&self) -> &CountryAtlas {
        &self.atlas
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn countries(&self) -> &[CountryState] {
        &self.states
    }

    pub fn country(&self, id: &str) -> Option<CountryRef<'_>> {
        country_ref(&self.atlas, &self.states, self.atlas.index_of(id)?)
    }

    fn state_mut(&mut self, id: &str) -> Option<&mut CountryState> {
        let index = self.atlas.index_of(id)?;
        self.states.get_mut(index)
    }

    pub fn set_value(&mut self, id: &str, value: f64) {
        match self.state_mut(id) {
            Some(state) => state.value = Some(value),
            None => debug!(id, "set_value: unknown country"),
        }
    }

    pub fn clear_value(&mut self, id: &str) {
        if let Some(state) = self.state_mut(id) {
            state.value = None;
        }
    }

    pub fn value(&self, id: &str) -> Option<f64> {
        self.states.get(self.atlas.index_of(id)?)?.value
    }

    pub fn set_color(&mut self, id: &str, color: Color) {
        match self.state_mut(id) {
            Some(state) => state.color = color,
            None => debug!(id, "set_color: unknown country"),
        }
    }

    pub fn color(&self, id: &str) -> Option<Color> {
        Some(self.states.get(self.atlas.index_of(id)?)?.color)
    }

    pub fn set_border_color(&mut self, id: &str, color: Color) {
        if let Some(state) = self.state_mut(id) {
            state.border_color = color;
        }
    }

    pub fn border_color(&self, id: &str) -> Option<Color> {
        Some(self.states.get(self.atlas.index_of(id)?)?.border_color)
    }

    /// Recolors every country from its value on a linear `0..max_value` scale.
    ///
    /// `max_value` defaults to the largest set value (0 when nothing is set)
    /// and `min_color` to the palette's. Countries without a value get the
    /// null color. The scale is kept for [`GlobeView::legend`].
    pub fn recompute_colors_from_values(
        &mut self,
        max_color: Color,
        max_value: Option<f64>,
        min_color: Option<Color>,
    ) -> ColorScale {
        let max_value = max_value.unwrap_or_else(|| {
            self.states
                .iter()
                .filter_map(|s| s.value)
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
                .unwrap_or(0.0)
        });
        let scale = ColorScale::new(
            max_value,
            min_color.unwrap_or(self.config.palette.min_color),
            max_color,
        );
        let null_color = self.config.palette.null_color;
        for state in &mut self.states {
            state.color = match state.value {
                Some(v) => scale.apply(v),
                None => null_color,
            };
        }
        debug!(max_value, "country colors recomputed from values");
        self.color_scale = Some(scale);
        scale
    }

    pub fn color_scale(&self) -> Option<&ColorScale> {
        self.color_scale.as_ref()
    }

    /// Legend cells of the last computed scale; empty before any recompute.
    pub fn legend(&self, cells: usize) -> Vec<LegendEntry> {
        self.color_scale
            .map(|scale| scale.legend(cells))
            .unwrap_or_default()
    }

    /// Highlights `id`; an unknown id clears the highlight.
    pub fn set_highlight(&mut self, id: &str) {
        self.highlight = self.atlas.index_of(id);
    }

    pub fn clear_highlight(&mut self) {
        self.highlight = None;
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Sets the rotation, latitude clamped. Non-finite rotations are ignored.
    pub fn rotate_to(&mut self, rotation: Rotation) {
        if !rotation.is_finite() {
            warn!(?rotation, "ignoring non-finite rotation");
            return;
        }
        self.rotation = rotation.clamped();
        self.redraw();
    }

    pub fn rotate_relative(&mut self, delta: Rotation) {
        self.rotate_to(self.rotation.offset(delta));
    }

    /// Starts an eased rotation towards `target`, advanced by [`GlobeView::tick`].
    ///
    /// A running transition is replaced and its callback dropped without
    /// being called. A non-finite target starts nothing and drops `on_complete`.
    pub fn animate_rotate_to(
        &mut self,
        target: Rotation,
        on_complete: Option<CompletionCallback>,
    ) {
        if !target.is_finite() {
            warn!(?target, "ignoring non-finite rotation target");
            return;
        }
        if let Some(previous) = self.transition.take() {
            debug!(target = ?previous.target(), "rotation transition superseded");
        }
        self.transition = Some(RotationTransition::new(
            self.rotation,
            target.clamped(),
            Time::from_millis(self.config.transition_ms),
            on_complete,
        ));
    }

    /// Animates towards the centroid of `id`. Returns `false` and starts
    /// nothing when the country is unknown or has no geometry.
    pub fn animate_rotate_to_country(
        &mut self,
        id: &str,
        on_complete: Option<CompletionCallback>,
    ) -> bool {
        let Some(centroid) = self.atlas.centroid(id) else {
            debug!(id, "no centroid to rotate to");
            return false;
        };
        debug!(id, lon = centroid.lon_deg, lat = centroid.lat_deg, "rotating to country");
        self.animate_rotate_to(Rotation::centered_on(centroid), on_complete);
        true
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Advances the running transition by `dt_s` seconds. Returns whether a
    /// transition is still running afterwards.
    pub fn tick(&mut self, dt_s: f64) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        match transition.advance(dt_s) {
            TransitionStep::Running(rotation) => {
                self.rotate_to(rotation);
                true
            }
            TransitionStep::Finished(rotation, on_complete) => {
                self.transition = None;
                self.rotate_to(rotation);
                if let Some(callback) = on_complete {
                    callback();
                }
                false
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Projection scale in pixels.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Projection translate in widget-local pixels.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scale = viewport.min_side() * self.scale_factor;
        self.center = viewport.center();
        self.redraw();
    }

    pub fn on_zoom(&mut self, delta: WheelDelta) {
        let factor = self.scale_factor * (1.0 - delta.zoom_step());
        self.scale_factor = factor.max(zoom_floor(&self.config));
        self.resize(self.viewport);
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.pointer.phase()
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        let pos = self.viewport.to_local(event.client());
        self.pointer.pos = pos;
        if self.pointer.down {
            let d = pos - self.pointer.saved;
            let k = self.config.drag_sensitivity;
            self.rotate_relative(Rotation::new(k * d.x, -k * d.y));
            self.pointer.saved = pos;
        }
    }

    pub fn on_pointer_down(&mut self, event: PointerEvent) {
        self.on_pointer_move(event);
        self.pointer.saved = self.pointer.pos;
        self.pointer.down = true;
    }

    pub fn on_pointer_up(&mut self, event: PointerEvent) {
        self.on_pointer_move(event);
        self.pointer.down = false;
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    /// Handles pointer activity on the rendered country at `index` and
    /// returns the tooltip visible afterwards.
    pub fn on_country_pointer(
        &mut self,
        index: usize,
        action: CountryAction,
        event: PointerEvent,
    ) -> Option<Tooltip> {
        match action {
            CountryAction::Leave => self.tooltip = None,
            CountryAction::Move => {
                if let Some(tooltip) = self.tooltip.as_mut() {
                    tooltip.move_to(event.page());
                }
            }
            CountryAction::Hover | CountryAction::Click | CountryAction::DoubleClick => {
                let Some(country) = country_ref(&self.atlas, &self.states, index) else {
                    debug!(index, ?action, "pointer on unresolvable country");
                    return self.tooltip.clone();
                };
                match action {
                    CountryAction::Click => self.hooks.on_country_click(country),
                    CountryAction::DoubleClick => self.hooks.on_country_double_click(country),
                    _ => {
                        self.tooltip = self
                            .hooks
                            .on_country_hover(country)
                            .filter(|content| !content.is_empty())
                            .map(|content| Tooltip::at(content, event.page()));
                    }
                }
            }
        }
        self.tooltip.clone()
    }

    /// Hands the current state to the renderer.
    pub fn redraw(&mut self) {
        let palette = &self.config.palette;
        let frame = RenderFrame {
            viewport: self.viewport,
            center: [self.center.x, self.center.y],
            scale: self.scale,
            rotation: self.rotation,
            fill_color: palette.fill_color,
            outer_border_color: palette.outer_border_color,
            highlight_color: palette.highlight_color,
            highlight: self.highlight,
            countries: &self.states,
        };
        self.renderer.render(&frame);
    }
}

fn zoom_floor(config: &GlobeConfig) -> f64 {
    config.min_scale_factor.max(MIN_SCALE_FACTOR)
}

fn country_ref<'a>(
    atlas: &'a CountryAtlas,
    states: &'a [CountryState],
    index: usize,
) -> Option<CountryRef<'a>> {
    let feature = atlas.feature(index)?;
    let state = states.get(index)?;
    Some(CountryRef {
        index,
        id: feature.id.as_deref()?,
        properties: &feature.properties,
        value: state.value,
        color: state.color,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::{CountryAction, GlobeView};
    use crate::atlas::tests::sample_atlas;
    use crate::color::Color;
    use crate::config::GlobeConfig;
    use crate::hooks::{CountryRef, GlobeHooks};
    use crate::pointer::{DragPhase, PointerEvent, Viewport, WheelDelta};
    use crate::render::{GlobeRenderer, NoopRenderer, RenderFrame};
    use crate::rotation::{CompletionCallback, Rotation};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Snapshot {
        rotation: Rotation,
        scale: f64,
        center: [f64; 2],
        highlight: Option<usize>,
        colors: Vec<Color>,
    }

    #[derive(Default, Clone)]
    struct Recorder(Rc<RefCell<Vec<Snapshot>>>);

    impl Recorder {
        fn count(&self) -> usize {
            self.0.borrow().len()
        }

        fn last(&self) -> Snapshot {
            self.0.borrow().last().cloned().unwrap()
        }
    }

    impl GlobeRenderer for Recorder {
        fn render(&mut self, frame: &RenderFrame<'_>) {
            self.0.borrow_mut().push(Snapshot {
                rotation: frame.rotation,
                scale: frame.scale,
                center: frame.center,
                highlight: frame.highlight,
                colors: frame.countries.iter().map(|c| c.color).collect(),
            });
        }
    }

    #[derive(Default, Clone)]
    struct RecordingHooks(Rc<RefCell<Vec<String>>>);

    impl GlobeHooks for RecordingHooks {
        fn on_country_click(&mut self, country: CountryRef<'_>) {
            self.0.borrow_mut().push(format!("click {}", country.id));
        }

        fn on_country_double_click(&mut self, country: CountryRef<'_>) {
            self.0.borrow_mut().push(format!("dblclick {}", country.id));
        }
    }

    fn view() -> (GlobeView, Recorder) {
        let recorder = Recorder::default();
        let view = GlobeView::new(
            sample_atlas(),
            GlobeConfig::default(),
            Viewport::new(800.0, 600.0),
            recorder.clone(),
        );
        (view, recorder)
    }

    #[test]
    fn starts_unset_and_draws_once() {
        let (view, recorder) = view();
        let null = GlobeConfig::default().palette.null_color;
        assert_eq!(recorder.count(), 1);
        assert_eq!(recorder.last().colors, vec![null; 3]);
        assert_eq!(view.value("004"), None);
        assert_eq!(view.color("024"), Some(null));
        assert_eq!(view.border_color("900"), Some(Color::rgb(0xee, 0xee, 0xee)));
        assert_eq!(view.country("004").unwrap().name(), Some("Afghanistan"));
    }

    #[test]
    fn values_round_trip_for_known_ids() {
        let (mut view, _) = view();
        for (id, v) in [("004", 0.0), ("024", -3.5), ("900", 1e9)] {
            view.set_value(id, v);
            assert_eq!(view.value(id), Some(v));
        }
        view.clear_value("024");
        assert_eq!(view.value("024"), None);

        view.set_color("004", Color::rgb(1, 2, 3));
        assert_eq!(view.color("004"), Some(Color::rgb(1, 2, 3)));
        view.set_border_color("004", Color::rgb(4, 5, 6));
        assert_eq!(view.border_color("004"), Some(Color::rgb(4, 5, 6)));
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (mut view, _) = view();
        view.set_value("999", 1.0);
        view.set_color("999", Color::rgb(0, 0, 0));
        assert_eq!(view.value("999"), None);
        assert_eq!(view.color("999"), None);
        assert_eq!(view.border_color("999"), None);
        assert!(view.country("999").is_none());

        view.set_highlight("024");
        assert_eq!(view.highlight(), Some(1));
        view.set_highlight("999");
        assert_eq!(view.highlight(), None);
    }

    #[test]
    fn rotate_to_clamps_latitude() {
        let (mut view, recorder) = view();
        view.rotate_to(Rotation::new(12.0, 95.0));
        assert_eq!(view.rotation(), Rotation::new(12.0, 90.0));
        view.rotate_to(Rotation::new(12.0, -200.0));
        assert_eq!(view.rotation(), Rotation::new(12.0, -90.0));
        assert_eq!(recorder.last().rotation, Rotation::new(12.0, -90.0));

        view.rotate_relative(Rotation::new(3.0, -5.0));
        assert_eq!(view.rotation(), Rotation::new(15.0, -90.0));
    }

    #[test]
    fn non_finite_rotations_leave_state_usable() {
        let (mut view, recorder) = view();
        view.rotate_to(Rotation::new(10.0, 20.0));
        let frames = recorder.count();

        view.rotate_to(Rotation::new(0.0, f64::NAN));
        view.rotate_to(Rotation::new(f64::INFINITY, 0.0));
        assert_eq!(view.rotation(), Rotation::new(10.0, 20.0));
        assert_eq!(recorder.count(), frames);

        view.rotate_relative(Rotation::new(1.0, f64::NAN));
        view.rotate_relative(Rotation::new(1.0, 1.0));
        assert_eq!(view.rotation(), Rotation::new(11.0, 21.0));

        view.animate_rotate_to(Rotation::new(f64::NAN, 0.0), None);
        assert!(!view.is_animating());
    }

    #[test]
    fn zoom_never_goes_below_minimum() {
        let (mut view, recorder) = view();
        for _ in 0..20 {
            view.on_zoom(WheelDelta::Wheel(1.0e6));
            assert!(view.scale_factor() >= 0.1);
        }
        assert_eq!(view.scale_factor(), 0.1);
        assert_close(recorder.last().scale, 60.0, 1e-9);

        let before = view.scale_factor();
        view.on_zoom(WheelDelta::Detail(3.0));
        assert_close(view.scale_factor(), before * 1.01, 1e-12);
    }

    #[test]
    fn zoom_floor_holds_for_unvalidated_configs() {
        for min_scale_factor in [0.0, 0.01, f64::NAN] {
            let config = GlobeConfig {
                min_scale_factor,
                ..GlobeConfig::default()
            };
            let mut view =
                GlobeView::new(sample_atlas(), config, Viewport::new(800.0, 600.0), NoopRenderer);
            for _ in 0..20 {
                view.on_zoom(WheelDelta::Wheel(1.0e6));
            }
            assert_eq!(view.scale_factor(), 0.1);
            assert_close(view.scale(), 60.0, 1e-9);
        }

        let config = GlobeConfig {
            min_scale_factor: 0.3,
            ..GlobeConfig::default()
        };
        let viewport = Viewport::new(800.0, 600.0);
        let mut view = GlobeView::new(sample_atlas(), config, viewport, NoopRenderer);
        view.on_zoom(WheelDelta::Wheel(1.0e6));
        assert_eq!(view.scale_factor(), 0.3);
    }

    #[test]
    fn resize_recomputes_scale_and_center() {
        let (mut view, recorder) = view();
        assert_close(view.scale(), 600.0 / 2.2, 1e-9);
        view.resize(Viewport::new(300.0, 500.0));
        assert_close(view.scale(), 300.0 / 2.2, 1e-9);
        assert_eq!(recorder.last().center, [150.0, 250.0]);
    }

    #[test]
    fn colors_follow_values_with_implicit_max() {
        let (mut view, recorder) = view();
        view.set_value("004", 0.0);
        view.set_value("024", 10.0);
        let max_color = Color::rgb(0, 0, 128);
        let scale = view.recompute_colors_from_values(max_color, None, None);

        assert_eq!(scale.max_value, 10.0);
        assert_eq!(view.color("004"), Some(Color::rgb(0xdd, 0xdd, 0xdd)));
        assert_eq!(view.color("024"), Some(max_color));
        assert_eq!(view.color("900"), Some(GlobeConfig::default().palette.null_color));
        assert_eq!(view.color_scale(), Some(&scale));

        let labels: Vec<String> = view.legend(3).into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["0", "5", "10"]);

        // Setters do not redraw on their own.
        assert_eq!(recorder.count(), 1);
        view.redraw();
        assert_eq!(recorder.last().colors[1], max_color);
    }

    #[test]
    fn explicit_scale_bounds_and_empty_values() {
        let (mut view, _) = view();
        assert!(view.legend(5).is_empty());
        let scale = view.recompute_colors_from_values(Color::rgb(0, 0, 0), None, None);
        assert_eq!(scale.max_value, 0.0);

        view.set_value("024", 10.0);
        view.recompute_colors_from_values(
            Color::rgb(200, 200, 200),
            Some(20.0),
            Some(Color::rgb(0, 0, 0)),
        );
        assert_eq!(view.color("024"), Some(Color::rgb(100, 100, 100)));
    }

    #[test]
    fn second_animation_supersedes_first() {
        let (mut view, _) = view();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let (first, second) = (calls.clone(), calls.clone());

        view.animate_rotate_to(
            Rotation::new(40.0, 10.0),
            Some(Box::new(move || first.borrow_mut().push("first"))),
        );
        assert!(view.tick(0.2));
        view.animate_rotate_to(
            Rotation::new(-60.0, 10.0),
            Some(Box::new(move || second.borrow_mut().push("second"))),
        );
        assert!(view.tick(0.5));
        assert!(calls.borrow().is_empty());

        assert!(!view.tick(1.0));
        assert!(!view.is_animating());
        assert_eq!(view.rotation(), Rotation::new(-60.0, 10.0));
        assert!(!view.tick(1.0));
        assert_eq!(*calls.borrow(), vec!["second"]);
    }

    #[test]
    fn animation_redraws_every_frame() {
        let (mut view, recorder) = view();
        view.animate_rotate_to(Rotation::new(-20.0, 0.0), None);
        assert!(view.is_animating());
        let mut frames = 0;
        while view.tick(1.0 / 60.0) {
            frames += 1;
        }
        assert!(frames >= 70, "only {frames} frames");
        assert_eq!(recorder.count(), frames + 2);
        assert_eq!(recorder.last().rotation, Rotation::new(-20.0, 0.0));
    }

    #[test]
    fn rotates_to_country_centroid() {
        let (mut view, _) = view();
        let done = Rc::new(RefCell::new(false));
        let flag = done.clone();
        let on_complete: CompletionCallback = Box::new(move || *flag.borrow_mut() = true);
        assert!(view.animate_rotate_to_country("024", Some(on_complete)));
        while view.tick(0.1) {}
        let r = view.rotation();
        assert_close(r.lon_deg, -30.0, 1e-9);
        assert_close(r.lat_deg, 0.0, 1e-9);
        assert!(*done.borrow());

        assert!(!view.animate_rotate_to_country("999", None));
        assert!(!view.animate_rotate_to_country("900", None));
        assert!(!view.is_animating());
    }

    #[test]
    fn drag_rotates_by_pointer_delta() {
        let recorder = Recorder::default();
        let viewport = Viewport {
            left: 10.0,
            top: 20.0,
            width: 400.0,
            height: 400.0,
            scroll_x: 0.0,
            scroll_y: 5.0,
        };
        let mut view =
            GlobeView::new(sample_atlas(), GlobeConfig::default(), viewport, recorder.clone());

        view.on_pointer_move(PointerEvent::at(50.0, 50.0));
        assert_eq!(view.rotation(), Rotation::default());
        assert_eq!(view.drag_phase(), DragPhase::Idle);

        view.on_pointer_down(PointerEvent::at(110.0, 120.0));
        assert_eq!(view.drag_phase(), DragPhase::Dragging);
        assert_eq!(view.rotation(), Rotation::default());

        view.on_pointer_move(PointerEvent::at(120.0, 110.0));
        assert_close(view.rotation().lon_deg, 3.0, 1e-12);
        assert_close(view.rotation().lat_deg, 3.0, 1e-12);

        view.on_pointer_up(PointerEvent::at(130.0, 110.0));
        assert_eq!(view.drag_phase(), DragPhase::Idle);
        assert_close(view.rotation().lon_deg, 6.0, 1e-12);

        let frames = recorder.count();
        view.on_pointer_move(PointerEvent::at(300.0, 300.0));
        assert_eq!(recorder.count(), frames);
        assert_close(view.rotation().lon_deg, 6.0, 1e-12);
    }

    #[test]
    fn hover_shows_value_tooltip_next_to_pointer() {
        let (mut view, _) = view();
        view.set_value("024", 12.34);

        let tip = view
            .on_country_pointer(1, CountryAction::Hover, PointerEvent::at(100.0, 100.0))
            .unwrap();
        assert_eq!(tip.content, "12.3");
        assert_eq!((tip.left, tip.top), (107.0, 85.0));

        let moved = view
            .on_country_pointer(1, CountryAction::Move, PointerEvent::at(200.0, 50.0))
            .unwrap();
        assert_eq!((moved.left, moved.top), (207.0, 35.0));

        assert_eq!(
            view.on_country_pointer(1, CountryAction::Leave, PointerEvent::default()),
            None
        );
        assert_eq!(
            view.on_country_pointer(0, CountryAction::Hover, PointerEvent::default()),
            None
        );
        assert!(view.tooltip().is_none());
    }

    #[test]
    fn clicks_reach_hooks_only_for_resolvable_countries() {
        let hooks = RecordingHooks::default();
        let (view, _) = view();
        let mut view = view.with_hooks(hooks.clone());

        view.on_country_pointer(1, CountryAction::Click, PointerEvent::default());
        view.on_country_pointer(0, CountryAction::DoubleClick, PointerEvent::default());
        view.on_country_pointer(42, CountryAction::Click, PointerEvent::default());
        view.on_country_pointer(42, CountryAction::Hover, PointerEvent::default());

        assert_eq!(*hooks.0.borrow(), vec!["click 024", "dblclick 004"]);
    }
}
