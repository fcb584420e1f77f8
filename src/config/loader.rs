use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::layout::AppLayout;
use crate::runtime::Runtime;

use super::AppConfig;

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Yaml(PathBuf),
    Json(PathBuf),
    /// No config file exists.
    Defaults,
}

/// Load the application config.
///
/// A legacy `scripts/config.yaml` is first moved over the canonical
/// location. Then the first existing of the canonical YAML and the JSON
/// fallback is parsed. Missing files and parse failures both yield an empty
/// config; parse failures are reported on stderr.
#[tracing::instrument(skip(runtime, layout))]
pub fn load_config<R: Runtime>(runtime: &R, layout: &AppLayout) -> (AppConfig, ConfigSource) {
    migrate_legacy(runtime, layout);

    let canonical = layout.canonical_config();
    let json = layout.json_config();

    let (source, parsed) = if runtime.is_file(&canonical) {
        (
            ConfigSource::Yaml(canonical.clone()),
            read_document(runtime, &canonical, parse_yaml),
        )
    } else if runtime.is_file(&json) {
        (
            ConfigSource::Json(json.clone()),
            read_document(runtime, &json, parse_json),
        )
    } else {
        debug!("No config file found, using defaults");
        return (AppConfig::default(), ConfigSource::Defaults);
    };

    match parsed {
        Ok(config) => {
            info!("Loaded config from {:?}", source);
            (config, source)
        }
        Err(e) => {
            error!("Failed to load config from {:?}: {:#}", source, e);
            eprintln!("{:#}", e);
            (AppConfig::default(), source)
        }
    }
}

/// Move the legacy config over the canonical one. Failure is not fatal.
fn migrate_legacy<R: Runtime>(runtime: &R, layout: &AppLayout) {
    let legacy = layout.legacy_config();
    if !runtime.is_file(&legacy) {
        return;
    }

    let canonical = layout.canonical_config();
    match runtime.rename(&legacy, &canonical) {
        Ok(()) => info!("Moved legacy config {:?} to {:?}", legacy, canonical),
        Err(e) => warn!("Could not move legacy config {:?}: {:#}", legacy, e),
    }
}

fn read_document<R: Runtime>(
    runtime: &R,
    path: &Path,
    parse: fn(&str) -> Result<Value>,
) -> Result<AppConfig> {
    let content = runtime.read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let value = parse(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
    AppConfig::from_value(value).with_context(|| format!("Invalid config file {}", path.display()))
}

fn parse_yaml(content: &str) -> Result<Value> {
    Ok(serde_yaml::from_str(content)?)
}

fn parse_json(content: &str) -> Result<Value> {
    Ok(serde_json::from_str(content)?)
}
