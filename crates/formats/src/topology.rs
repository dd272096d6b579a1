use std::collections::BTreeMap;

use foundation::math::{LonLat, spherical_centroid};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::metadata::normalize_iso_n3;

/// Default object layer holding the country polygons.
pub const COUNTRIES_LAYER: &str = "countries";

/// A closed ring of positions; the first position is repeated at the end.
pub type Ring = Vec<LonLat>;

#[derive(Debug, Clone, PartialEq)]
pub enum CountryGeometry {
    /// Exterior ring followed by holes.
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl CountryGeometry {
    /// Iterates the polygons as ring lists, whatever the geometry kind.
    pub fn polygons(&self) -> impl Iterator<Item = &[Ring]> + '_ {
        let (single, multi): (Option<&[Ring]>, &[Vec<Ring>]) = match self {
            CountryGeometry::Polygon(rings) => (Some(rings.as_slice()), &[]),
            CountryGeometry::MultiPolygon(polys) => (None, polys.as_slice()),
        };
        single.into_iter().chain(multi.iter().map(Vec::as_slice))
    }

    pub fn centroid(&self) -> Option<LonLat> {
        spherical_centroid(self.polygons())
    }

    pub fn vertex_count(&self) -> usize {
        self.polygons().flatten().map(Vec::len).sum()
    }
}

/// A country shape decoded from the topology.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    /// Normalized ISO numeric code, `None` if the topology carried no id.
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    /// `None` for features whose topology geometry has a null type.
    pub geometry: Option<CountryGeometry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopologyError {
    Json(String),
    NotATopology,
    MissingLayer(String),
    InvalidGeometry { index: usize, reason: String },
    ArcOutOfRange { index: usize, arc: i64 },
    MalformedArc { arc: usize, position: usize },
}

impl std::fmt::Display for TopologyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TopologyError::Json(msg) => write!(f, "topology JSON parse error: {msg}"),
            TopologyError::NotATopology => write!(f, "expected a TopoJSON Topology"),
            TopologyError::MissingLayer(name) => write!(f, "topology has no object {name:?}"),
            TopologyError::InvalidGeometry { index, reason } => {
                write!(f, "invalid geometry at index {index}: {reason}")
            }
            TopologyError::ArcOutOfRange { index, arc } => {
                write!(f, "geometry at index {index} references missing arc {arc}")
            }
            TopologyError::MalformedArc { arc, position } => {
                write!(f, "arc {arc} position {position} needs at least two coordinates")
            }
        }
    }
}

impl std::error::Error for TopologyError {}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct QuantizeTransform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct RawTopology {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    transform: Option<QuantizeTransform>,
    arcs: Vec<Vec<Vec<f64>>>,
    objects: BTreeMap<String, RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    geometries: Option<Vec<RawGeometry>>,
}

/// Decoded TopoJSON topology: absolute arc coordinates plus the raw objects.
#[derive(Debug)]
pub struct Topology {
    arcs: Vec<Vec<LonLat>>,
    objects: BTreeMap<String, RawGeometry>,
}

impl Topology {
    pub fn from_json_str(payload: &str) -> Result<Self, TopologyError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| TopologyError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, TopologyError> {
        let is_topology = value.get("type").and_then(Value::as_str) == Some("Topology");
        if !is_topology {
            return Err(TopologyError::NotATopology);
        }
        let raw: RawTopology =
            serde_json::from_value(value).map_err(|e| TopologyError::Json(e.to_string()))?;
        debug_assert_eq!(raw.kind, "Topology");

        let arcs: Vec<Vec<LonLat>> = raw
            .arcs
            .iter()
            .enumerate()
            .map(|(i, arc)| decode_arc(i, arc, raw.transform.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            arcs,
            objects: raw.objects,
        })
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    /// Converts one object layer into features, in topology order.
    ///
    /// A `GeometryCollection` yields one feature per member; any other object
    /// yields a single feature.
    pub fn features(&self, layer: &str) -> Result<Vec<CountryFeature>, TopologyError> {
        let object = self
            .objects
            .get(layer)
            .ok_or_else(|| TopologyError::MissingLayer(layer.to_string()))?;

        match (object.kind.as_deref(), &object.geometries) {
            (Some("GeometryCollection"), Some(members)) => members
                .iter()
                .enumerate()
                .map(|(index, g)| self.feature(index, g))
                .collect(),
            (Some("GeometryCollection"), None) => Err(TopologyError::InvalidGeometry {
                index: 0,
                reason: "GeometryCollection without geometries".to_string(),
            }),
            _ => Ok(vec![self.feature(0, object)?]),
        }
    }

    fn feature(&self, index: usize, raw: &RawGeometry) -> Result<CountryFeature, TopologyError> {
        let id = match &raw.id {
            None | Some(Value::Null) => None,
            Some(v) => Some(normalize_iso_n3(v).ok_or_else(|| TopologyError::InvalidGeometry {
                index,
                reason: format!("unusable id: {v}"),
            })?),
        };
        let geometry = self.geometry(index, raw)?;
        Ok(CountryFeature {
            id,
            properties: raw.properties.clone().unwrap_or_default(),
            geometry,
        })
    }

    fn geometry(
        &self,
        index: usize,
        raw: &RawGeometry,
    ) -> Result<Option<CountryGeometry>, TopologyError> {
        let invalid = |reason: String| TopologyError::InvalidGeometry { index, reason };

        match raw.kind.as_deref() {
            None => Ok(None),
            Some("Polygon") => {
                let arcs: Vec<Vec<i64>> = arc_refs(raw).map_err(invalid)?;
                let rings = self.polygon(index, &arcs)?;
                Ok(Some(CountryGeometry::Polygon(rings)))
            }
            Some("MultiPolygon") => {
                let arcs: Vec<Vec<Vec<i64>>> = arc_refs(raw).map_err(invalid)?;
                let polys = arcs
                    .iter()
                    .map(|poly| self.polygon(index, poly))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(CountryGeometry::MultiPolygon(polys)))
            }
            Some(other) => Err(invalid(format!("unsupported geometry type: {other}"))),
        }
    }

    fn polygon(&self, index: usize, rings: &[Vec<i64>]) -> Result<Vec<Ring>, TopologyError> {
        rings.iter().map(|r| self.ring(index, r)).collect()
    }

    /// Stitches arcs into a ring. Consecutive arcs share their junction point.
    fn ring(&self, index: usize, arc_indices: &[i64]) -> Result<Ring, TopologyError> {
        let mut points: Ring = Vec::new();
        for &arc in arc_indices {
            let (slot, reversed) = if arc < 0 {
                ((!arc) as usize, true)
            } else {
                (arc as usize, false)
            };
            let coords = self
                .arcs
                .get(slot)
                .ok_or(TopologyError::ArcOutOfRange { index, arc })?;

            points.pop();
            let start = points.len();
            points.extend_from_slice(coords);
            if reversed {
                points[start..].reverse();
            }
        }
        if let Some(&first) = points.first()
            && points.len() < 4
        {
            points.push(first);
        }
        Ok(points)
    }
}

fn arc_refs<T: serde::de::DeserializeOwned>(raw: &RawGeometry) -> Result<T, String> {
    let arcs = raw.arcs.clone().ok_or_else(|| "geometry missing arcs".to_string())?;
    serde_json::from_value(arcs).map_err(|e| format!("malformed arcs: {e}"))
}

/// Resolves one arc to absolute positions, undoing delta encoding when quantized.
fn decode_arc(
    index: usize,
    arc: &[Vec<f64>],
    transform: Option<&QuantizeTransform>,
) -> Result<Vec<LonLat>, TopologyError> {
    let (mut x, mut y) = (0.0, 0.0);
    arc.iter()
        .enumerate()
        .map(|(position, p)| {
            let [px, py, ..] = p.as_slice() else {
                return Err(TopologyError::MalformedArc { arc: index, position });
            };
            Ok(match transform {
                Some(t) => {
                    x += px;
                    y += py;
                    LonLat::new(x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1])
                }
                None => LonLat::new(*px, *py),
            })
        })
        .collect()
}

/// Decodes `layer` of a TopoJSON document into country features.
pub fn decode_countries(payload: &str, layer: &str) -> Result<Vec<CountryFeature>, TopologyError> {
    Topology::from_json_str(payload)?.features(layer)
}
