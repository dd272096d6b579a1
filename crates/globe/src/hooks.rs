use foundation::math::Vec2;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::color::Color;

/// Tooltip placement relative to the pointer's page position.
pub const TOOLTIP_OFFSET: Vec2 = Vec2 { x: 7.0, y: -15.0 };

/// Read-only view of one country handed to hooks.
#[derive(Debug, Copy, Clone, Serialize)]
pub struct CountryRef<'a> {
    pub index: usize,
    pub id: &'a str,
    pub properties: &'a Map<String, Value>,
    pub value: Option<f64>,
    pub color: Color,
}

impl<'a> CountryRef<'a> {
    /// `name` property merged from the metadata, if any.
    pub fn name(&self) -> Option<&'a str> {
        self.properties.get("name").and_then(Value::as_str)
    }
}

/// Country interaction callbacks, supplied to the view at construction.
pub trait GlobeHooks {
    fn on_country_click(&mut self, country: CountryRef<'_>) {
        debug!(id = country.id, "country clicked");
    }

    fn on_country_double_click(&mut self, country: CountryRef<'_>) {
        debug!(id = country.id, "country double-clicked");
    }

    /// Tooltip content for a hovered country; `None` shows no tooltip.
    fn on_country_hover(&mut self, country: CountryRef<'_>) -> Option<String> {
        country.value.map(|v| format!("{v:.1}"))
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultHooks;

impl GlobeHooks for DefaultHooks {}

/// Visible tooltip: content plus its page position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub content: String,
    pub left: f64,
    pub top: f64,
}

impl Tooltip {
    pub fn at(content: String, page: Vec2) -> Self {
        let pos = page + TOOLTIP_OFFSET;
        Self {
            content,
            left: pos.x,
            top: pos.y,
        }
    }

    pub fn move_to(&mut self, page: Vec2) {
        let pos = page + TOOLTIP_OFFSET;
        self.left = pos.x;
        self.top = pos.y;
    }
}

#[cfg(test)]
mod tests {
    use super::{CountryRef, DefaultHooks, GlobeHooks, Tooltip};
    use crate::color::Color;
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};

    #[test]
    fn default_hover_formats_one_decimal() {
        let mut properties = Map::new();
        properties.insert("name".into(), json!("Angola"));
        let mut country = CountryRef {
            index: 1,
            id: "024",
            properties: &properties,
            value: Some(12.345),
            color: Color::rgb(0, 0, 0),
        };
        assert_eq!(country.name(), Some("Angola"));
        assert_eq!(DefaultHooks.on_country_hover(country).as_deref(), Some("12.3"));

        country.value = None;
        assert_eq!(DefaultHooks.on_country_hover(country), None);
    }

    #[test]
    fn country_serializes_with_properties_and_hex_color() {
        let mut properties = Map::new();
        properties.insert("name".into(), json!("Angola"));
        let country = CountryRef {
            index: 1,
            id: "024",
            properties: &properties,
            value: Some(12.345),
            color: Color::rgb(0, 0, 0),
        };
        assert_eq!(
            serde_json::to_value(country).unwrap(),
            json!({
                "index": 1,
                "id": "024",
                "properties": {"name": "Angola"},
                "value": 12.345,
                "color": "#000000"
            })
        );
    }

    #[test]
    fn tooltip_sits_right_of_and_above_pointer() {
        let tip = Tooltip::at("x".into(), Vec2::new(100.0, 200.0));
        assert_eq!((tip.left, tip.top), (107.0, 185.0));
    }
}
