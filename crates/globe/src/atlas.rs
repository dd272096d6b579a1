use std::collections::HashMap;

use formats::{
    CountryFeature, CountryRecord, MetadataError, Topology, TopologyError, parse_records,
};
use foundation::math::LonLat;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum AtlasError {
    Topology(TopologyError),
    Metadata(MetadataError),
    NoCountries,
}

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtlasError::Topology(e) => write!(f, "geography: {e}"),
            AtlasError::Metadata(e) => write!(f, "country metadata: {e}"),
            AtlasError::NoCountries => write!(f, "geography contains no countries"),
        }
    }
}

impl std::error::Error for AtlasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AtlasError::Topology(e) => Some(e),
            AtlasError::Metadata(e) => Some(e),
            AtlasError::NoCountries => None,
        }
    }
}

impl From<TopologyError> for AtlasError {
    fn from(e: TopologyError) -> Self {
        AtlasError::Topology(e)
    }
}

impl From<MetadataError> for AtlasError {
    fn from(e: MetadataError) -> Self {
        AtlasError::Metadata(e)
    }
}

/// Ordered country features with their id lookup.
///
/// Built once; the feature order defines the index used by every per-country
/// array of the view and by the renderer.
#[derive(Debug, Clone)]
pub struct CountryAtlas {
    features: Vec<CountryFeature>,
    index: HashMap<String, usize>,
}

impl CountryAtlas {
    /// Decodes `layer` of a TopoJSON document and merges a JSON array of metadata records.
    pub fn from_json(topology: &str, metadata: &str, layer: &str) -> Result<Self, AtlasError> {
        let features = Topology::from_json_str(topology)?.features(layer)?;
        let records = parse_records(metadata)?;
        Self::new(features, &records)
    }

    /// Builds the id lookup and merges metadata into feature properties.
    ///
    /// Each feature takes the fields of the first record with the same code;
    /// record fields overwrite existing properties of the same name. Records
    /// matching no feature are ignored.
    pub fn new(
        mut features: Vec<CountryFeature>,
        records: &[CountryRecord],
    ) -> Result<Self, AtlasError> {
        if features.is_empty() {
            return Err(AtlasError::NoCountries);
        }

        let mut by_code: HashMap<&str, &CountryRecord> = HashMap::with_capacity(records.len());
        for record in records {
            by_code.entry(record.iso_n3.as_str()).or_insert(record);
        }

        let mut index = HashMap::with_capacity(features.len());
        let mut merged = 0usize;
        for (i, feature) in features.iter_mut().enumerate() {
            let Some(id) = feature.id.clone() else {
                warn!(index = i, "country feature without id is not addressable");
                continue;
            };
            if let Some(record) = by_code.get(id.as_str()) {
                feature
                    .properties
                    .extend(record.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged += 1;
            }
            if let Some(first) = index.get(&id) {
                warn!(%id, first, duplicate = i, "duplicate country id, keeping the first");
            } else {
                index.insert(id, i);
            }
        }

        let unmatched = records
            .iter()
            .filter(|r| !index.contains_key(&r.iso_n3))
            .count();
        if unmatched > 0 {
            debug!(unmatched, "metadata records without a country feature");
        }
        info!(
            countries = features.len(),
            with_metadata = merged,
            "country atlas ready"
        );

        Ok(Self { features, index })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn feature(&self, index: usize) -> Option<&CountryFeature> {
        self.features.get(index)
    }

    pub fn feature_by_id(&self, id: &str) -> Option<&CountryFeature> {
        self.index_of(id).and_then(|i| self.feature(i))
    }

    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }

    /// Spherical centroid of a country, `None` for unknown ids or missing geometry.
    pub fn centroid(&self, id: &str) -> Option<LonLat> {
        self.feature_by_id(id)?.geometry.as_ref()?.centroid()
    }
}
