use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User preferences resolved from a loosely-typed JSON object.
///
/// Each key accepts its snake_case and camelCase spelling; when both are
/// set the snake_case value wins, and an unset snake_case value (null,
/// empty or zero) falls through to the camelCase one. Unknown keys are ignored. A numeric
/// bound of zero or an empty string leaves that dimension unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ConstraintSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processor_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstraintError {
    #[error("constraint `{key}` must be a number, got {found}")]
    NotNumeric { key: &'static str, found: String },
    #[error("constraint `{key}` must be a string, got {found}")]
    NotText { key: &'static str, found: String },
}

impl ConstraintSet {
    pub fn with_brand(brand: impl Into<String>) -> Self {
        Self {
            brand: Some(brand.into()),
            ..Self::default()
        }
    }

    pub fn with_max_price(max_price: f64) -> Self {
        Self {
            max_price: Some(max_price).filter(|value| *value > 0.0),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `self` with every field that `preset` sets replaced by the preset value.
    pub fn overlaid_with(self, preset: &ConstraintSet) -> Self {
        Self {
            brand: preset.brand.clone().or(self.brand),
            max_price: preset.max_price.or(self.max_price),
            min_rating: preset.min_rating.or(self.min_rating),
            processor_type: preset.processor_type.clone().or(self.processor_type),
            min_memory: preset.min_memory.clone().or(self.min_memory),
            storage_type: preset.storage_type.clone().or(self.storage_type),
        }
    }
}

impl TryFrom<Map<String, Value>> for ConstraintSet {
    type Error = ConstraintError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            brand: text(&map, "brand", "brand")?,
            max_price: number(&map, "max_price", "maxPrice")?,
            min_rating: number(&map, "min_rating", "minRating")?,
            processor_type: text(&map, "processor_type", "processorType")?,
            min_memory: text(&map, "min_memory", "minMemory")?,
            storage_type: text(&map, "storage_type", "storageType")?,
        })
    }
}

/// Resolves `key` first and falls back to `alias` when the first spelling
/// is missing or resolves to unset.
fn resolve<T>(
    map: &Map<String, Value>,
    key: &'static str,
    alias: &str,
    read: fn(Option<&Value>, &'static str) -> Result<Option<T>, ConstraintError>,
) -> Result<Option<T>, ConstraintError> {
    match read(map.get(key), key)? {
        Some(value) => Ok(Some(value)),
        None if alias == key => Ok(None),
        None => read(map.get(alias), key),
    }
}

fn text(
    map: &Map<String, Value>,
    key: &'static str,
    alias: &str,
) -> Result<Option<String>, ConstraintError> {
    resolve(map, key, alias, read_text)
}

fn number(
    map: &Map<String, Value>,
    key: &'static str,
    alias: &str,
) -> Result<Option<f64>, ConstraintError> {
    resolve(map, key, alias, read_number)
}

fn read_text(value: Option<&Value>, key: &'static str) -> Result<Option<String>, ConstraintError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(other) => Err(ConstraintError::NotText {
            key,
            found: other.to_string(),
        }),
    }
}

fn read_number(value: Option<&Value>, key: &'static str) -> Result<Option<f64>, ConstraintError> {
    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(value)) if value.trim().is_empty() => None,
        Some(Value::String(value)) => {
            Some(value.trim().parse::<f64>().map_err(|_| ConstraintError::NotNumeric {
                key,
                found: format!("\"{value}\""),
            })?)
        }
        Some(other) => {
            return Err(ConstraintError::NotNumeric {
                key,
                found: other.to_string(),
            })
        }
    };

    match parsed {
        Some(value) if !value.is_finite() || value < 0.0 => Err(ConstraintError::NotNumeric {
            key,
            found: value.to_string(),
        }),
        Some(value) if value == 0.0 => Ok(None),
        other => Ok(other),
    }
}
