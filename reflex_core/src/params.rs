//! Simple runtime parameter system for Reflex
//!
//! Provides a shared key-value store for runtime configuration. Every clone of a
//! [`RuntimeParams`] points at the same storage, so a value written by a
//! reconfiguration tool is seen by nodes on their next read.

use crate::error::{ReflexError, ReflexResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Time-to-collision threshold in seconds used by the braking loop
pub const TTC_FINAL_KEY: &str = "ttc_final";

/// Default value for [`TTC_FINAL_KEY`]
pub const DEFAULT_TTC_FINAL: f64 = 1.0;

/// Simple runtime parameter store
#[derive(Clone, Debug)]
pub struct RuntimeParams {
    /// Parameter storage - BTreeMap maintains sorted order
    params: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl RuntimeParams {
    /// Create a parameter store populated with the Reflex defaults
    pub fn new() -> Self {
        let params = Self::empty();
        params.set_defaults();
        params
    }

    /// Create a parameter store with no entries
    pub fn empty() -> Self {
        Self {
            params: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Create a store with defaults, then overlay the values from `path`
    pub fn from_file(path: &Path) -> ReflexResult<Self> {
        let params = Self::new();
        params.load_from_disk(path)?;
        Ok(params)
    }

    fn set_defaults(&self) {
        let mut params = self.params.write();
        params.insert(TTC_FINAL_KEY.to_string(), Value::from(DEFAULT_TTC_FINAL));
    }

    /// Get a parameter value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let params = self.params.read();
        let value = params.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Get parameter with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get parameter as f64 with default
    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_or(key, default)
    }

    /// Get parameter as bool with default
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_or(key, default)
    }

    /// Get parameter as string with default
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_or(key, default.to_string())
    }

    /// Set a parameter value
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> ReflexResult<()> {
        let json_value = serde_json::to_value(value)?;
        self.params.write().insert(key.to_string(), json_value);
        Ok(())
    }

    /// Set a parameter only if it is not present yet
    ///
    /// Returns `true` when the default was written.
    pub fn declare<T: Serialize>(&self, key: &str, default: T) -> ReflexResult<bool> {
        let json_value = serde_json::to_value(default)?;
        let mut params = self.params.write();
        if params.contains_key(key) {
            return Ok(false);
        }
        params.insert(key.to_string(), json_value);
        Ok(true)
    }

    /// Check if a parameter exists
    pub fn has(&self, key: &str) -> bool {
        self.params.read().contains_key(key)
    }

    /// Clear all parameters and reset to defaults
    pub fn reset(&self) {
        self.params.write().clear();
        self.set_defaults();
    }

    /// Save parameters to a YAML or TOML file (chosen by extension)
    pub fn save_to_disk(&self, path: &Path) -> ReflexResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let params = self.params.read().clone();
        let text = match ParamFormat::from_path(path)? {
            ParamFormat::Yaml => serde_yaml::to_string(&params)?,
            ParamFormat::Toml => toml::to_string(&params)?,
        };
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Load parameters from a YAML or TOML file, overlaying existing values
    pub fn load_from_disk(&self, path: &Path) -> ReflexResult<()> {
        let text = std::fs::read_to_string(path)?;
        let loaded: BTreeMap<String, Value> = match ParamFormat::from_path(path)? {
            ParamFormat::Yaml => serde_yaml::from_str(&text)?,
            ParamFormat::Toml => toml::from_str(&text)?,
        };

        let count = loaded.len();
        self.params.write().extend(loaded);
        log::debug!("Loaded {} parameters from {}", count, path.display());
        Ok(())
    }
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self::new()
    }
}

enum ParamFormat {
    Yaml,
    Toml,
}

impl ParamFormat {
    fn from_path(path: &Path) -> ReflexResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(ParamFormat::Yaml),
            Some("toml") => Ok(ParamFormat::Toml),
            _ => Err(ReflexError::config(format!(
                "Unsupported parameter file '{}': expected .yaml, .yml or .toml",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let params = RuntimeParams::new();

        // Test defaults
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 0.0), 1.0);

        // Test set/get
        params.set("test_value", 42.5).unwrap();
        assert_eq!(params.get::<f64>("test_value"), Some(42.5));

        // Test overwrite
        params.set(TTC_FINAL_KEY, 2.0).unwrap();
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 0.0), 2.0);

        params.reset();
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 0.0), 1.0);
        assert!(!params.has("test_value"));
    }

    #[test]
    fn test_clones_share_storage() {
        let params = RuntimeParams::new();
        let reconfigure = params.clone();

        reconfigure.set(TTC_FINAL_KEY, 0.25).unwrap();
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 1.0), 0.25);
    }

    #[test]
    fn test_declare_keeps_existing_value() {
        let params = RuntimeParams::empty();
        assert!(params.declare(TTC_FINAL_KEY, 1.0).unwrap());

        params.set(TTC_FINAL_KEY, 0.5).unwrap();
        assert!(!params.declare(TTC_FINAL_KEY, 1.0).unwrap());
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 1.0), 0.5);
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let params = RuntimeParams::new();
        params.set("mode", "fast").unwrap();
        assert_eq!(params.get_f64("mode", 3.0), 3.0);
        assert_eq!(params.get_string("mode", ""), "fast");
    }

    #[test]
    fn test_yaml_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config/params.yaml");

        let params = RuntimeParams::new();
        params.set(TTC_FINAL_KEY, 0.75).unwrap();
        params.save_to_disk(&path).unwrap();

        let loaded = RuntimeParams::from_file(&path).unwrap();
        assert_eq!(loaded.get_f64(TTC_FINAL_KEY, 1.0), 0.75);
    }

    #[test]
    fn test_toml_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        std::fs::write(&path, "ttc_final = 1.5\nverbose = true\n").unwrap();

        let params = RuntimeParams::from_file(&path).unwrap();
        assert_eq!(params.get_f64(TTC_FINAL_KEY, 1.0), 1.5);
        assert!(params.get_bool("verbose", false));
    }

    #[test]
    fn test_unknown_extension_is_config_error() {
        let params = RuntimeParams::new();
        let err = params
            .save_to_disk(Path::new("/tmp/params.ini"))
            .unwrap_err();
        assert!(matches!(err, ReflexError::Config(_)));
    }
}
