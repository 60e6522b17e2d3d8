//! # Generic Object Model
//!
//! The schemaless record exchanged with the backend. System fields
//! (`id`, `type`, timestamps, ownership) are typed; everything else lives
//! in an ordered `fields` map that round-trips unknown keys untouched, so
//! the client stays forward-compatible with server schema evolution.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ClientError, ClientResult};
use crate::request::urlenc;

/// Default type discriminator for objects created without one
pub const DEFAULT_TYPE: &str = "sysprop";

/// A schemaless object with required system fields.
///
/// Custom properties are kept in insertion order and never dropped or
/// reordered by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericObject {
    /// Globally unique id within a type + appid scope. Assigned by the
    /// server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Type discriminator
    #[serde(rename = "type", default = "default_type")]
    pub object_type: String,

    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Creation time, epoch millis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Last modification time, epoch millis. Server-populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<i64>,

    /// Owning application id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,

    /// Parent object id, for one-to-many relationships
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parentid: Option<String>,

    /// Id of the user who created this object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creatorid: Option<String>,

    /// Searchable tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub votes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// All non-system properties, in the order they were set or received
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

impl Default for GenericObject {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE)
    }
}

impl GenericObject {
    /// Create an empty object of the given type, timestamped now
    pub fn new(object_type: &str) -> Self {
        GenericObject {
            id: None,
            object_type: object_type.to_string(),
            name: None,
            timestamp: Some(Utc::now().timestamp_millis()),
            updated: None,
            appid: None,
            parentid: None,
            creatorid: None,
            tags: Vec::new(),
            votes: None,
            version: None,
            fields: Map::new(),
        }
    }

    /// Create an object with a known id
    pub fn with_id(object_type: &str, id: &str) -> Self {
        let mut obj = Self::new(object_type);
        obj.id = Some(id.to_string());
        obj
    }

    /// Read a custom property
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a custom property, preserving the order of earlier keys
    pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// The REST resource path for this object: `/{type}` or `/{type}/{id}`,
    /// with both segments percent-encoded
    pub fn object_uri(&self) -> String {
        let base = format!("/{}", urlenc(&self.object_type));
        match &self.id {
            Some(id) if !id.is_empty() => format!("{}/{}", base, urlenc(id)),
            _ => base,
        }
    }

    /// Decode an object from a JSON value, failing with a decode error on
    /// non-object shapes
    pub fn from_value(value: Value) -> ClientResult<Self> {
        serde_json::from_value(value).map_err(|e| ClientError::Decode {
            status: 200,
            path: String::new(),
            message: format!("not a valid object: {}", e),
        })
    }

    /// Encode this object as a JSON value
    pub fn to_value(&self) -> Value {
        // serialization of a plain struct + map cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
