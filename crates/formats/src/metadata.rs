use serde_json::{Map, Value};

/// Width of an ISO 3166-1 numeric country code.
pub const ISO_N3_WIDTH: usize = 3;

/// One auxiliary descriptive record (name, continent, ...) keyed by ISO numeric code.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    /// Normalized code, see [`normalize_iso_n3`].
    pub iso_n3: String,
    /// All fields of the record, `iso_n3` included in its normalized form.
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataError {
    Json(String),
    NotAnArray,
    InvalidRecord { index: usize, reason: String },
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::Json(msg) => write!(f, "metadata JSON parse error: {msg}"),
            MetadataError::NotAnArray => write!(f, "expected an array of country records"),
            MetadataError::InvalidRecord { index, reason } => {
                write!(f, "invalid country record at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for MetadataError {}

/// Normalizes an ISO numeric code to its canonical string form.
///
/// Integers and all-digit strings are zero-padded to three digits (`4` and
/// `"4"` both become `"004"`). Other strings, such as the `"-99"` placeholder
/// used for disputed territories, are kept verbatim. Returns `None` for values
/// that cannot be a code (objects, booleans, fractional numbers, ...).
pub fn normalize_iso_n3(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let int = match n.as_i64() {
                Some(i) => i,
                None => {
                    let f = n.as_f64()?;
                    if f.fract() != 0.0 || !f.is_finite() {
                        return None;
                    }
                    f as i64
                }
            };
            Some(format!("{int:0width$}", width = ISO_N3_WIDTH))
        }
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                Some(format!("{s:0>width$}", width = ISO_N3_WIDTH))
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

pub fn parse_records(payload: &str) -> Result<Vec<CountryRecord>, MetadataError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| MetadataError::Json(e.to_string()))?;
    records_from_value(value)
}

pub fn records_from_value(value: Value) -> Result<Vec<CountryRecord>, MetadataError> {
    let Value::Array(items) = value else {
        return Err(MetadataError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(mut fields) = item else {
            return Err(MetadataError::InvalidRecord {
                index,
                reason: "record must be an object".to_string(),
            });
        };
        let raw = fields
            .get("iso_n3")
            .ok_or_else(|| MetadataError::InvalidRecord {
                index,
                reason: "missing iso_n3".to_string(),
            })?;
        let iso_n3 = normalize_iso_n3(raw).ok_or_else(|| MetadataError::InvalidRecord {
            index,
            reason: format!("iso_n3 is not a code: {raw}"),
        })?;
        fields.insert("iso_n3".to_string(), Value::String(iso_n3.clone()));
        records.push(CountryRecord { iso_n3, fields });
    }
    Ok(records)
}
