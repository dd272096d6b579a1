//! Colors and the value-to-color scale behind the legend.

use serde::{Deserialize, Serialize};

/// Opaque RGB color. Serialized as a `#rrggbb` string.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("aliceblue", Color::rgb(240, 248, 255)),
    ("black", Color::rgb(0, 0, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("darkgreen", Color::rgb(0, 100, 0)),
    ("gray", Color::rgb(128, 128, 128)),
    ("green", Color::rgb(0, 128, 0)),
    ("grey", Color::rgb(128, 128, 128)),
    ("lightgray", Color::rgb(211, 211, 211)),
    ("lightgrey", Color::rgb(211, 211, 211)),
    ("navy", Color::rgb(0, 0, 128)),
    ("orange", Color::rgb(255, 165, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("red", Color::rgb(255, 0, 0)),
    ("steelblue", Color::rgb(70, 130, 180)),
    ("white", Color::rgb(255, 255, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl std::fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized color: {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r, g, b)` or one of a few CSS color names.
    pub fn parse(input: &str) -> Result<Self, ParseColorError> {
        let s = input.trim();
        let err = || ParseColorError(input.to_string());

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(err);
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            let channels: Vec<u8> = body
                .split(',')
                .map(|c| c.trim().parse::<f64>().ok().map(channel))
                .collect::<Option<_>>()
                .ok_or_else(err)?;
            return match channels.as_slice() {
                [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
                _ => Err(err()),
            };
        }
        let lower = s.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, c)| *c)
            .ok_or_else(err)
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation in RGB space. `t` is not clamped; channels are.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| channel(a as f64 + (b as f64 - a as f64) * t);
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok();
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(
            digit(0)? * 17,
            digit(1)? * 17,
            digit(2)? * 17,
        )),
        6 => Some(Color::rgb(pair(0)?, pair(2)?, pair(4)?)),
        _ => None,
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Linear scale mapping `0 -> min_color` and `max_value -> max_color`.
///
/// Values outside `[0, max_value]` extrapolate, with channels clamped. A zero
/// or non-finite `max_value` maps everything to the midpoint of the two colors.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub max_value: f64,
    pub min_color: Color,
    pub max_color: Color,
}

/// One legend cell: a value, its formatted label and its color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub value: f64,
    pub label: String,
    pub color: Color,
}

impl ColorScale {
    pub fn new(max_value: f64, min_color: Color, max_color: Color) -> Self {
        Self {
            max_value,
            min_color,
            max_color,
        }
    }

    pub fn apply(&self, value: f64) -> Color {
        let t = if self.max_value != 0.0 && self.max_value.is_finite() {
            value / self.max_value
        } else {
            0.5
        };
        self.min_color.lerp(self.max_color, t)
    }

    /// `cells` evenly spaced entries from 0 to `max_value`, labelled with no decimals.
    pub fn legend(&self, cells: usize) -> Vec<LegendEntry> {
        let steps = cells.saturating_sub(1).max(1) as f64;
        (0..cells)
            .map(|i| {
                let value = self.max_value * i as f64 / steps;
                LegendEntry {
                    value,
                    label: format!("{value:.0}"),
                    color: self.apply(value),
                }
            })
            .collect()
    }
}
