//! Layered key/value configuration
//!
//! Keys are colon-separated paths (`Section:SubKey`). Layers are applied in
//! the order they were added; a later layer overrides any key an earlier one
//! set. Lookups ignore ASCII case.

mod env;
mod json;

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Separator between segments of a configuration path
pub const KEY_DELIMITER: char = ':';

/// Section holding named connection strings
pub const CONNECTION_STRINGS_SECTION: &str = "ConnectionStrings";

/// Read-only hierarchical configuration
pub trait ConfigurationProvider: Send + Sync {
    /// Read a value by its full path, `None` if unset
    fn value(&self, key: &str) -> Option<String>;

    /// Read a named connection string
    fn connection_string(&self, name: &str) -> Option<String> {
        self.value(&format!(
            "{}{}{}",
            CONNECTION_STRINGS_SECTION, KEY_DELIMITER, name
        ))
    }
}

/// Flattened configuration built from ordered layers
#[derive(Debug, Default, Clone)]
pub struct LayeredConfiguration {
    entries: HashMap<String, String>,
}

impl LayeredConfiguration {
    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_ascii_lowercase(), value);
    }
}

impl ConfigurationProvider for LayeredConfiguration {
    fn value(&self, key: &str) -> Option<String> {
        self.entries.get(&key.to_ascii_lowercase()).cloned()
    }
}

enum Layer {
    JsonFile { path: PathBuf, optional: bool },
    JsonStr { name: String, content: String },
    Environment { prefix: Option<String> },
    Variables {
        prefix: Option<String>,
        vars: Vec<(String, String)>,
    },
    InMemory(Vec<(String, String)>),
}

/// Collects configuration layers and flattens them into a `LayeredConfiguration`
#[derive(Default)]
pub struct ConfigurationBuilder {
    layers: Vec<Layer>,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a JSON settings file. A missing optional file is skipped.
    pub fn add_json_file(mut self, path: impl Into<PathBuf>, optional: bool) -> Self {
        self.layers.push(Layer::JsonFile {
            path: path.into(),
            optional,
        });
        self
    }

    /// Add JSON settings from a string; `name` is only used in errors
    pub fn add_json_str(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.layers.push(Layer::JsonStr {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Add the process environment, read when `build` runs
    pub fn add_environment_variables(mut self, prefix: Option<&str>) -> Self {
        self.layers.push(Layer::Environment {
            prefix: prefix.map(str::to_string),
        });
        self
    }

    /// Add an explicit set of environment-style variables
    pub fn add_variables<I, K, V>(mut self, prefix: Option<&str>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.layers.push(Layer::Variables {
            prefix: prefix.map(str::to_string),
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        });
        self
    }

    /// Add literal `path -> value` pairs
    pub fn add_in_memory<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.layers.push(Layer::InMemory(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Flatten all layers in order
    pub fn build(self) -> Result<LayeredConfiguration, ConfigError> {
        let mut configuration = LayeredConfiguration::default();

        for layer in self.layers {
            let entries = match layer {
                Layer::JsonFile { path, optional } => {
                    if optional && !path.exists() {
                        tracing::debug!(path = %path.display(), "Optional settings file not found, skipping");
                        continue;
                    }
                    let content = std::fs::read_to_string(&path)
                        .map_err(|e| ConfigError::file(&path, e.to_string()))?;
                    let entries = json::flatten(&path.display().to_string(), &content)?;
                    tracing::debug!(path = %path.display(), keys = entries.len(), "Loaded settings file");
                    entries
                }
                Layer::JsonStr { name, content } => json::flatten(&name, &content)?,
                Layer::Environment { prefix } => {
                    env::map_variables(prefix.as_deref(), env::process_variables())
                }
                Layer::Variables { prefix, vars } => env::map_variables(prefix.as_deref(), vars),
                Layer::InMemory(pairs) => pairs,
            };

            for (key, value) in entries {
                configuration.set(&key, value);
            }
        }

        Ok(configuration)
    }
}
