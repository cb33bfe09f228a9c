//! Flat per-hook option maps

use super::HookError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key-value options supplied to a hook from configuration
///
/// Keys are camelCase (`alertThreshold`, `slProximityPct`, ...). Each hook
/// parses the map into its own typed settings; unknown keys are ignored and
/// missing keys take the hook's documented defaults. `enabled` (default
/// `true`) is shared by all hooks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookOptions(Map<String, Value>);

impl HookOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the hook should be registered
    pub fn enabled(&self) -> bool {
        self.0
            .get("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Parse into typed hook settings
    pub fn parse<T: DeserializeOwned>(&self, hook: &'static str) -> Result<T, HookError> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|source| HookError::InvalidOptions { hook, source })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
