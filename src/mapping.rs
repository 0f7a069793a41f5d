//! JSON mapping targeted by `#[easy_mappable]`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("mapped value rejected the input")]
    Rejected,
}

/// Keyed view over a JSON object that mappable types read their properties from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map {
    json: serde_json::Map<String, Value>,
}

impl Map {
    pub fn new(json: serde_json::Map<String, Value>) -> Self {
        Self { json }
    }

    /// Map over `json`, which must be an object.
    pub fn from_json(json: Value) -> Result<Self, MappingError> {
        match json {
            Value::Object(json) => Ok(Self::new(json)),
            Value::Null => Err(MappingError::NotAnObject("null")),
            Value::Bool(_) => Err(MappingError::NotAnObject("a boolean")),
            Value::Number(_) => Err(MappingError::NotAnObject("a number")),
            Value::String(_) => Err(MappingError::NotAnObject("a string")),
            Value::Array(_) => Err(MappingError::NotAnObject("an array")),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Self::from_json(serde_json::from_str(json)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.json.get(key)
    }

    /// Value under `key` decoded as `T`. Missing keys and values of the wrong shape both yield
    /// `None`.
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.json.get(key)?;

        match T::deserialize(value) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(key, %error, "skipping unmappable value");
                None
            }
        }
    }

    /// Assign the value under `key` to `target` if it decodes as `T`, otherwise leave `target`
    /// untouched. Returns whether `target` was written.
    pub fn read<T: DeserializeOwned>(&self, key: &str, target: &mut T) -> bool {
        match self.value(key) {
            Some(value) => {
                *target = value;
                true
            }
            None => false,
        }
    }

    /// Nested object under `key`.
    pub fn map(&self, key: &str) -> Option<Map> {
        match self.json.get(key)? {
            Value::Object(json) => Some(Map::new(json.clone())),
            _ => None,
        }
    }
}

impl From<serde_json::Map<String, Value>> for Map {
    fn from(json: serde_json::Map<String, Value>) -> Self {
        Self::new(json)
    }
}

/// A type that fills itself in from a [`Map`].
///
/// Only [`Mappable::map_properties`] needs writing by hand. `#[easy_mappable]` on the impl block
/// generates [`Mappable::from_map`] and [`Mappable::mapping`] from it.
pub trait Mappable: Default {
    /// Read every property out of `map`.
    fn map_properties(&mut self, map: &Map);

    /// A default value with its properties read from `map`.
    fn from_map(map: &Map) -> Option<Self>;

    /// Update the properties present in `map`.
    fn mapping(&mut self, map: &Map);

    fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Self::from_map(&Map::from_json_str(json)?).ok_or(MappingError::Rejected)
    }
}
