use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WeftError};

/// Wire form of a node's settings: an array of `{key, value, required}`
/// triples, or the same array JSON-encoded as a string (older authoring
/// clients persist it that way).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSettings {
    Triples(Vec<SettingTriple>),
    Encoded(String),
}

impl Default for RawSettings {
    fn default() -> Self {
        Self::Triples(Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingTriple {
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default)]
    pub required: bool,
}

/// A single decoded setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub value: serde_json::Value,
    #[serde(default)]
    pub required: bool,
}

/// Decoded node configuration: key → value plus a required flag.
///
/// Decoded once at the boundary from [`RawSettings`]; execution-time code
/// only ever reads the map. BTreeMap keeps iteration (and therefore the
/// prompt's configuration dump) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsMap(BTreeMap<String, Setting>);

impl SettingsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the wire form. A JSON-encoded string must parse to the same
    /// triple array; anything else is a settings error.
    pub fn decode(raw: &RawSettings) -> Result<Self> {
        let triples = match raw {
            RawSettings::Triples(t) => t.clone(),
            RawSettings::Encoded(s) => {
                if s.trim().is_empty() {
                    Vec::new()
                } else {
                    serde_json::from_str::<Vec<SettingTriple>>(s)
                        .map_err(|e| WeftError::InvalidSettings(e.to_string()))?
                }
            }
        };

        let mut map = BTreeMap::new();
        for t in triples {
            map.insert(
                t.key,
                Setting {
                    value: t.value,
                    required: t.required,
                },
            );
        }
        Ok(Self(map))
    }

    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value, required: bool) {
        self.0.insert(key.into(), Setting { value, required });
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key).map(|s| &s.value)
    }

    /// Get a setting as a string, if present and textual.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    /// Get a setting that the agent cannot run without.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key)
            .ok_or_else(|| WeftError::InvalidSettings(format!("missing required setting '{}'", key)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Setting)> {
        self.0.iter()
    }
}
