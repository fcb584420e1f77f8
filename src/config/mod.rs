//! Application configuration.
//!
//! The config file is an arbitrary mapping; only the `net` section is
//! interpreted here. Every key is optional.

mod loader;

use anyhow::{Result, bail};
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use loader::{ConfigSource, load_config};

/// Network settings from the `net` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub listen_port: Option<u16>,
    pub listen_to_network: Option<bool>,
    pub bind_ip: Option<String>,
}

/// Parsed configuration document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    document: Map<String, Value>,
}

impl AppConfig {
    /// Build from a parsed document. `null` (an empty file) is an empty
    /// config; anything other than a mapping is rejected.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(document) => Ok(Self { document }),
            Value::Null => Ok(Self::default()),
            other => bail!("expected a mapping at the top level, found {}", kind(&other)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// The `net` section. Each key is read on its own; a wrongly-typed
    /// value is ignored without affecting the others.
    pub fn net(&self) -> NetConfig {
        let section = match self.document.get("net") {
            None | Some(Value::Null) => return NetConfig::default(),
            Some(Value::Object(section)) => section,
            Some(other) => {
                warn!("Ignoring net settings: expected a mapping, found {}", kind(other));
                eprintln!(
                    "Warning: ignoring net settings: expected a mapping, found {}",
                    kind(other)
                );
                return NetConfig::default();
            }
        };

        NetConfig {
            listen_port: net_setting(section, "listen_port"),
            listen_to_network: net_setting(section, "listen_to_network"),
            bind_ip: net_setting(section, "bind_ip"),
        }
    }

    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_else(|_| "{}".to_string())
    }
}

fn net_setting<T: DeserializeOwned>(section: &Map<String, Value>, key: &str) -> Option<T> {
    let value = section.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(setting) => Some(setting),
        Err(e) => {
            warn!("Ignoring invalid net.{}: {}", key, e);
            eprintln!("Warning: ignoring invalid net.{} ({}): {}", key, value, e);
            None
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
