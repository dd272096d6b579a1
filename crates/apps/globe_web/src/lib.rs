use console_error_panic_hook::set_once;
use js_sys::Function;
use serde::Serialize;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;

use globe::{
    Color, CountryAction, CountryAtlas, CountryRef, DefaultHooks, GlobeConfig, GlobeHooks,
    GlobeRenderer, GlobeView, PointerEvent, RenderFrame, Rotation, Viewport, WheelDelta,
};

thread_local! {
    static STATE: RefCell<Option<GlobeView>> = const { RefCell::new(None) };
    // JS callbacks that may call back into the globe run after STATE is released.
    static PENDING: RefCell<Vec<(Function, JsValue)>> = const { RefCell::new(Vec::new()) };
}

fn log_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn defer(callback: Function, arg: JsValue) {
    PENDING.with(|pending| pending.borrow_mut().push((callback, arg)));
}

fn flush_pending() {
    let calls = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
    for (callback, arg) in calls {
        if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
            log_error(&format!("globe callback failed: {err:?}"));
        }
    }
}

fn with_view<R>(f: impl FnOnce(&mut GlobeView) -> R) -> Result<R, JsValue> {
    let result = STATE.with(|state| state.borrow_mut().as_mut().map(f));
    flush_pending();
    result.ok_or_else(|| JsValue::from_str("globe is not initialised; call globe_init first"))
}

fn parse_color(s: &str) -> Result<Color, JsValue> {
    Color::parse(s).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Hands every frame to a JS function as a JSON string.
///
/// The function must draw synchronously and not call back into the globe.
struct JsRenderer(Function);

impl GlobeRenderer for JsRenderer {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        let json = match serde_json::to_string(frame) {
            Ok(json) => json,
            Err(err) => {
                log_error(&format!("frame serialization failed: {err}"));
                return;
            }
        };
        if let Err(err) = self.0.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            log_error(&format!("render callback failed: {err:?}"));
        }
    }
}

#[derive(Default)]
struct JsHooks {
    click: Option<Function>,
    double_click: Option<Function>,
    hover: Option<Function>,
}

impl GlobeHooks for JsHooks {
    fn on_country_click(&mut self, country: CountryRef<'_>) {
        match &self.click {
            Some(f) => defer(f.clone(), JsValue::from_str(country.id)),
            None => DefaultHooks.on_country_click(country),
        }
    }

    fn on_country_double_click(&mut self, country: CountryRef<'_>) {
        match &self.double_click {
            Some(f) => defer(f.clone(), JsValue::from_str(country.id)),
            None => DefaultHooks.on_country_double_click(country),
        }
    }

    fn on_country_hover(&mut self, country: CountryRef<'_>) -> Option<String> {
        let Some(f) = &self.hover else {
            return DefaultHooks.on_country_hover(country);
        };
        let json = match serde_json::to_string(&country) {
            Ok(json) => json,
            Err(err) => {
                log_error(&format!("country serialization failed: {err}"));
                return None;
            }
        };
        match f.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
            Ok(content) => content.as_string(),
            Err(err) => {
                log_error(&format!("hover callback failed: {err:?}"));
                None
            }
        }
    }
}

#[derive(Serialize)]
struct ViewSummary {
    rotation: Rotation,
    scale_factor: f64,
    scale: f64,
    highlight: Option<String>,
    animating: bool,
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Creates the globe from a TopoJSON string and a JSON array of metadata
/// records. `config` is an optional partial `GlobeConfig` as JSON.
///
/// `on_hover` receives the hovered country as JSON (index, id, properties,
/// value and color) and returns the tooltip text. It runs while the globe is
/// borrowed and must not call back into it.
#[allow(clippy::too_many_arguments)]
#[wasm_bindgen]
pub fn globe_init(
    topology: &str,
    metadata: &str,
    config: Option<String>,
    width: f64,
    height: f64,
    render: Function,
    on_click: Option<Function>,
    on_double_click: Option<Function>,
    on_hover: Option<Function>,
) -> Result<(), JsValue> {
    let config = match config {
        Some(json) => GlobeConfig::from_json(&json),
        None => Ok(GlobeConfig::default()),
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let atlas = CountryAtlas::from_json(topology, metadata, &config.layer).map_err(|e| {
        let msg = format!("globe data error: {e}");
        log_error(&msg);
        JsValue::from_str(&msg)
    })?;

    let hooks = JsHooks {
        click: on_click,
        double_click: on_double_click,
        hover: on_hover,
    };
    let view = GlobeView::new(
        atlas,
        config,
        Viewport::new(width, height),
        JsRenderer(render),
    )
    .with_hooks(hooks);
    STATE.with(|state| *state.borrow_mut() = Some(view));
    Ok(())
}

/// Updates the widget's bounding rect and page scroll; call on resize and scroll.
#[wasm_bindgen]
pub fn globe_resize(
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    scroll_x: f64,
    scroll_y: f64,
) -> Result<(), JsValue> {
    with_view(|view| {
        view.resize(Viewport {
            left,
            top,
            width,
            height,
            scroll_x,
            scroll_y,
        })
    })
}

#[wasm_bindgen]
pub fn globe_redraw() -> Result<(), JsValue> {
    with_view(GlobeView::redraw)
}

#[wasm_bindgen]
pub fn globe_set_value(id: &str, value: f64) -> Result<(), JsValue> {
    with_view(|view| view.set_value(id, value))
}

#[wasm_bindgen]
pub fn globe_clear_value(id: &str) -> Result<(), JsValue> {
    with_view(|view| view.clear_value(id))
}

#[wasm_bindgen]
pub fn globe_value(id: &str) -> Result<Option<f64>, JsValue> {
    with_view(|view| view.value(id))
}

#[wasm_bindgen]
pub fn globe_set_color(id: &str, color: &str) -> Result<(), JsValue> {
    let color = parse_color(color)?;
    with_view(|view| view.set_color(id, color))
}

#[wasm_bindgen]
pub fn globe_color(id: &str) -> Result<Option<String>, JsValue> {
    with_view(|view| view.color(id).map(Color::to_hex))
}

#[wasm_bindgen]
pub fn globe_set_border_color(id: &str, color: &str) -> Result<(), JsValue> {
    let color = parse_color(color)?;
    with_view(|view| view.set_border_color(id, color))
}

/// Recolors countries from their values and returns the legend cells as JSON.
#[wasm_bindgen]
pub fn globe_recompute_colors(
    max_color: &str,
    max_value: Option<f64>,
    min_color: Option<String>,
    legend_cells: usize,
) -> Result<String, JsValue> {
    let max_color = parse_color(max_color)?;
    let min_color = min_color.as_deref().map(parse_color).transpose()?;
    let legend = with_view(|view| {
        view.recompute_colors_from_values(max_color, max_value, min_color);
        view.legend(legend_cells)
    })?;
    to_json(&legend)
}

#[wasm_bindgen]
pub fn globe_legend(cells: usize) -> Result<String, JsValue> {
    let legend = with_view(|view| view.legend(cells))?;
    to_json(&legend)
}

#[wasm_bindgen]
pub fn globe_set_highlight(id: &str) -> Result<(), JsValue> {
    with_view(|view| view.set_highlight(id))
}

#[wasm_bindgen]
pub fn globe_clear_highlight() -> Result<(), JsValue> {
    with_view(GlobeView::clear_highlight)
}

/// `lon`/`lat` are the rotation angles, i.e. the negated view centre.
#[wasm_bindgen]
pub fn globe_rotate_to(lon: f64, lat: f64) -> Result<(), JsValue> {
    with_view(|view| view.rotate_to(Rotation::new(lon, lat)))
}

#[wasm_bindgen]
pub fn globe_rotate_relative(d_lon: f64, d_lat: f64) -> Result<(), JsValue> {
    with_view(|view| view.rotate_relative(Rotation::new(d_lon, d_lat)))
}

#[wasm_bindgen]
pub fn globe_animate_rotate_to(
    lon: f64,
    lat: f64,
    on_complete: Option<Function>,
) -> Result<(), JsValue> {
    with_view(|view| {
        view.animate_rotate_to(Rotation::new(lon, lat), completion(on_complete));
    })
}

#[wasm_bindgen]
pub fn globe_animate_rotate_to_country(
    id: &str,
    on_complete: Option<Function>,
) -> Result<bool, JsValue> {
    with_view(|view| view.animate_rotate_to_country(id, completion(on_complete)))
}

fn completion(on_complete: Option<Function>) -> Option<globe::CompletionCallback> {
    on_complete.map(|f| -> globe::CompletionCallback {
        Box::new(move || defer(f, JsValue::UNDEFINED))
    })
}

/// Advances a running rotation; call from `requestAnimationFrame`.
#[wasm_bindgen]
pub fn globe_tick(dt_s: f64) -> Result<bool, JsValue> {
    with_view(|view| view.tick(dt_s))
}

/// `wheel_delta` is the legacy `wheelDelta`; when it is 0 the Firefox
/// `detail` is used instead.
#[wasm_bindgen]
pub fn globe_wheel(wheel_delta: f64, detail: f64) -> Result<(), JsValue> {
    let delta = if wheel_delta != 0.0 {
        WheelDelta::Wheel(wheel_delta)
    } else {
        WheelDelta::Detail(detail)
    };
    with_view(|view| view.on_zoom(delta))
}

fn pointer(client_x: f64, client_y: f64, page_x: f64, page_y: f64) -> PointerEvent {
    PointerEvent {
        client_x,
        client_y,
        page_x,
        page_y,
    }
}

#[wasm_bindgen]
pub fn globe_pointer_down(client_x: f64, client_y: f64) -> Result<(), JsValue> {
    with_view(|view| view.on_pointer_down(pointer(client_x, client_y, client_x, client_y)))
}

#[wasm_bindgen]
pub fn globe_pointer_move(client_x: f64, client_y: f64) -> Result<(), JsValue> {
    with_view(|view| view.on_pointer_move(pointer(client_x, client_y, client_x, client_y)))
}

#[wasm_bindgen]
pub fn globe_pointer_up(client_x: f64, client_y: f64) -> Result<(), JsValue> {
    with_view(|view| view.on_pointer_up(pointer(client_x, client_y, client_x, client_y)))
}

/// Pointer activity on the country path at `index`. `action` is one of
/// `mouseover`, `mousemove`, `mouseout`, `click` or `dblclick`. Returns the
/// visible tooltip as JSON, or `None` when it is hidden.
#[wasm_bindgen]
pub fn globe_country_pointer(
    index: usize,
    action: &str,
    page_x: f64,
    page_y: f64,
) -> Result<Option<String>, JsValue> {
    let action = match action {
        "mouseover" | "hover" => CountryAction::Hover,
        "mousemove" | "move" => CountryAction::Move,
        "mouseout" | "leave" => CountryAction::Leave,
        "click" => CountryAction::Click,
        "dblclick" => CountryAction::DoubleClick,
        other => return Err(JsValue::from_str(&format!("unknown country action: {other}"))),
    };
    let tooltip =
        with_view(|view| view.on_country_pointer(index, action, pointer(0.0, 0.0, page_x, page_y)))?;
    tooltip.as_ref().map(to_json).transpose()
}

#[wasm_bindgen]
pub fn globe_state() -> Result<String, JsValue> {
    let summary = with_view(|view| ViewSummary {
        rotation: view.rotation(),
        scale_factor: view.scale_factor(),
        scale: view.scale(),
        highlight: view
            .highlight()
            .and_then(|i| view.atlas().feature(i))
            .and_then(|f| f.id.clone()),
        animating: view.is_animating(),
    })?;
    to_json(&summary)
}
