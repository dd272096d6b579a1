//! Data inspection helpers behind the `globe` CLI.

use formats::{Topology, normalize_iso_n3};
use globe::{
    AtlasError, Color, CountryAtlas, GlobeConfig, GlobeView, LegendEntry, NoopRenderer, Viewport,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Viewport used for headless views; only the scale depends on it.
pub const HEADLESS_VIEWPORT: Viewport = Viewport {
    left: 0.0,
    top: 0.0,
    width: 960.0,
    height: 960.0,
    scroll_x: 0.0,
    scroll_y: 0.0,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologySummary {
    pub layers: Vec<String>,
    pub arcs: usize,
    pub countries: usize,
    pub without_geometry: usize,
    pub vertices: usize,
}

pub fn summarize_topology(payload: &str, layer: &str) -> Result<TopologySummary, String> {
    let topology = Topology::from_json_str(payload).map_err(|e| format!("topology: {e}"))?;
    let features = topology
        .features(layer)
        .map_err(|e| format!("topology: {e}"))?;
    Ok(TopologySummary {
        layers: topology.layer_names().map(str::to_string).collect(),
        arcs: topology.arc_count(),
        countries: features.len(),
        without_geometry: features.iter().filter(|f| f.geometry.is_none()).count(),
        vertices: features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .map(|g| g.vertex_count())
            .sum(),
    })
}

/// Builds a view that renders nowhere.
pub fn headless_view(
    topology: &str,
    metadata: &str,
    config: GlobeConfig,
) -> Result<GlobeView, AtlasError> {
    let atlas = CountryAtlas::from_json(topology, metadata, &config.layer)?;
    Ok(GlobeView::new(atlas, config, HEADLESS_VIEWPORT, NoopRenderer))
}

/// Parses country values given either as an object `{"004": 1.5}` or as an
/// array of `{"iso_n3": 4, "value": 1.5}` records. Codes are normalized like
/// metadata codes; `null` values are skipped.
pub fn parse_values(payload: &str) -> Result<Vec<(String, f64)>, String> {
    let value: Value = serde_json::from_str(payload).map_err(|e| format!("values: {e}"))?;
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                if v.is_null() {
                    continue;
                }
                let id = normalize_iso_n3(&Value::String(key.clone()))
                    .ok_or_else(|| format!("values: invalid country code {key:?}"))?;
                let v = v
                    .as_f64()
                    .ok_or_else(|| format!("values: {key}: expected a number, got {v}"))?;
                out.push((id, v));
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let id = item
                    .get("iso_n3")
                    .and_then(normalize_iso_n3)
                    .ok_or_else(|| format!("values[{i}]: missing or invalid iso_n3"))?;
                match item.get("value") {
                    None | Some(Value::Null) => continue,
                    Some(v) => {
                        let v = v
                            .as_f64()
                            .ok_or_else(|| format!("values[{i}]: expected a number, got {v}"))?;
                        out.push((id, v));
                    }
                }
            }
        }
        _ => return Err("values: expected a JSON object or array".to_string()),
    }
    Ok(out)
}

/// Sets every value on the view and returns the ids that matched no country.
pub fn apply_values(view: &mut GlobeView, values: &[(String, f64)]) -> Vec<String> {
    let mut unknown = Vec::new();
    for (id, v) in values {
        if view.atlas().index_of(id).is_none() {
            warn!(%id, "value for unknown country");
            unknown.push(id.clone());
            continue;
        }
        view.set_value(id, *v);
    }
    unknown
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRow {
    pub index: usize,
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<f64>,
    pub color: Color,
    /// `[lon, lat]` in degrees.
    pub centroid: Option<[f64; 2]>,
}

pub fn country_rows(view: &GlobeView) -> Vec<CountryRow> {
    view.atlas()
        .features()
        .iter()
        .zip(view.countries())
        .enumerate()
        .map(|(index, (feature, state))| CountryRow {
            index,
            id: feature.id.clone(),
            name: feature
                .properties
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string),
            value: state.value,
            color: state.color,
            centroid: feature
                .geometry
                .as_ref()
                .and_then(|g| g.centroid())
                .map(|c| [c.lon_deg, c.lat_deg]),
        })
        .collect()
}

pub fn format_table(rows: &[CountryRow]) -> String {
    let mut out = format!(
        "{:>5}  {:<5}  {:<28}  {:>12}  {:<7}  {}\n",
        "#", "id", "name", "value", "color", "centroid"
    );
    for row in rows {
        let value = row.value.map(|v| format!("{v:.1}")).unwrap_or_default();
        let centroid = row
            .centroid
            .map(|[lon, lat]| format!("{lon:.2}, {lat:.2}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>5}  {:<5}  {:<28}  {:>12}  {:<7}  {}\n",
            row.index,
            row.id.as_deref().unwrap_or("-"),
            row.name.as_deref().unwrap_or(""),
            value,
            row.color,
            centroid
        ));
    }
    out
}

pub fn format_legend(entries: &[LegendEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:>12}  {}\n", e.label, e.color))
        .collect()
}
