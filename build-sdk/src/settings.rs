//! Two-tier build settings.
//!
//! Settings live in flat JSON objects keyed with a `dm_` prefix. A resolver
//! holds a user tier over a defaults tier; a key whose user value is absent,
//! null or an empty string falls through to the defaults.

use std::path::Path;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::types::{Error, Result};

/// Key prefix shared by every setting this crate reads.
const KEY_PREFIX: &str = "dm_";

/// Built-in defaults, the lower tier of every resolver.
///
/// On non-Windows hosts the installation path is left empty so executables
/// are resolved on `PATH` instead.
pub fn default_settings() -> Value {
    json!({
        "dm_installation_path": default_installation_path(),
        "dm_compiler_executable": "dm.exe",
        "dm_seeker_executable": "dreamseeker.exe",
        "dm_daemon_executable": "dreamdaemon.exe",
        "dm_encoding": "utf-8",
    })
}

#[cfg(windows)]
fn default_installation_path() -> &'static str {
    "C:\\Program Files (x86)\\BYOND\\bin\\"
}

#[cfg(not(windows))]
fn default_installation_path() -> &'static str {
    ""
}

/// User settings layered over defaults.
#[derive(Debug)]
pub struct SettingsResolver {
    user: Map<String, Value>,
    defaults: Map<String, Value>,
}

impl SettingsResolver {
    /// Build a resolver from two already-parsed tiers. Non-object values
    /// are treated as empty tiers.
    pub fn new(user: Value, defaults: Value) -> Self {
        Self {
            user: into_map(user),
            defaults: into_map(defaults),
        }
    }

    /// Load the user tier from a JSON file over the built-in defaults.
    ///
    /// A missing file is not an error; the resolver then answers purely
    /// from the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let user = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str(&raw)
                    .map_err(|e| Error::Settings(format!("{}: {}", path.display(), e)))?
            }
            Some(path) => {
                debug!(path = %path.display(), "settings file not found, using defaults");
                Value::Null
            }
            None => Value::Null,
        };
        Ok(Self::new(user, default_settings()))
    }

    /// Resolve a setting by its unprefixed name.
    pub fn get(&self, key: &str) -> Option<String> {
        let full = format!("{KEY_PREFIX}{key}");
        lookup(&self.user, &full).or_else(|| lookup(&self.defaults, &full))
    }

    /// Resolve a setting that must be present in one of the tiers.
    pub fn require(&self, key: &str) -> Result<String> {
        self.get(key)
            .ok_or_else(|| Error::Settings(format!("missing setting: {KEY_PREFIX}{key}")))
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A value participates only when it is a non-empty string.
fn lookup(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
