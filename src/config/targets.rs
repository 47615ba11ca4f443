//! Target lists
//!
//! A targets document names the accounts to harvest. Three shapes are
//! accepted:
//!
//! ```yaml
//! # a list of account objects
//! - account_username: partido_a
//!   account_name: Partido A
//!
//! # a mapping of username to display name or object
//! partido_a: Partido A
//! partido_b: {name: Partido B, party: PB}
//!
//! # such a mapping nested under a group key (select it with `group`)
//! political_personalities:
//!   jane_doe: {name: Jane Doe, party: PA}
//! ```

use super::types::read_structured;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Keys that may carry the username in list-shaped documents, in priority order
const USERNAME_KEYS: &[&str] = &["account_username", "username"];

/// Metadata key used when a mapping value is a bare display name
pub const DISPLAY_NAME_KEY: &str = "display_name";

/// One account to harvest, with the metadata carried into exports
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Account handle sent to the API
    pub username: String,
    /// Extra columns, in document order
    pub metadata: JsonObject,
}

impl Target {
    /// Create a target without metadata
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            metadata: JsonObject::new(),
        }
    }

    /// Add a metadata value
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Display name, when the document gave one
    pub fn display_name(&self) -> Option<&str> {
        ["account_name", DISPLAY_NAME_KEY, "name"]
            .iter()
            .find_map(|key| self.metadata.get(*key).and_then(Value::as_str))
    }

    /// Username plus display name, for log lines
    pub fn label(&self) -> String {
        match self.display_name() {
            Some(name) => format!("{} ({name})", self.username),
            None => self.username.clone(),
        }
    }
}

/// Load targets from a JSON or YAML file
pub fn load_targets(path: impl AsRef<Path>, group: Option<&str>) -> Result<Vec<Target>> {
    let path = path.as_ref();
    let doc = read_structured(path)?;
    let targets = parse_targets(&doc, group)?;
    debug!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// Extract targets from an already-parsed document.
///
/// Order follows the document. Entries without a username are skipped with a
/// warning; repeated usernames keep their first occurrence.
pub fn parse_targets(doc: &Value, group: Option<&str>) -> Result<Vec<Target>> {
    let doc = match group {
        Some(group) => doc
            .get(group)
            .ok_or_else(|| Error::config(format!("Group '{group}' not found in targets")))?,
        None => doc,
    };

    let parsed = match doc {
        Value::Array(entries) => entries.iter().filter_map(from_list_entry).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(username, value)| from_mapping_entry(username, value))
            .collect(),
        _ => {
            return Err(Error::config(
                "Targets must be a list of accounts or a mapping of usernames",
            ))
        }
    };

    let targets = dedupe(parsed);
    if targets.is_empty() {
        return Err(Error::config("No targets to harvest"));
    }

    Ok(targets)
}

fn from_list_entry(entry: &Value) -> Option<Target> {
    match entry {
        Value::String(username) if !username.trim().is_empty() => {
            Some(Target::new(username.trim()))
        }
        Value::Object(fields) => {
            let Some((key, username)) = USERNAME_KEYS.iter().find_map(|key| {
                fields
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(|u| (*key, u))
            }) else {
                warn!("Skipping target without a username: {entry}");
                return None;
            };

            let metadata = fields
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();

            Some(Target {
                username: username.to_string(),
                metadata,
            })
        }
        _ => {
            warn!("Skipping target without a username: {entry}");
            None
        }
    }
}

fn from_mapping_entry(username: &str, value: &Value) -> Target {
    let metadata = match value {
        Value::Object(fields) => fields.clone(),
        Value::Null => JsonObject::new(),
        Value::String(name) => {
            let mut metadata = JsonObject::new();
            metadata.insert(DISPLAY_NAME_KEY.to_string(), Value::String(name.clone()));
            metadata
        }
        other => {
            let mut metadata = JsonObject::new();
            metadata.insert(DISPLAY_NAME_KEY.to_string(), Value::String(other.to_string()));
            metadata
        }
    };

    Target {
        username: username.trim().to_string(),
        metadata,
    }
}

fn dedupe(targets: Vec<Target>) -> Vec<Target> {
    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|t| {
            let fresh = seen.insert(t.username.clone());
            if !fresh {
                warn!("Target '{}' listed more than once; keeping the first", t.username);
            }
            fresh
        })
        .collect()
}
