use std::ffi::OsString;
use std::path::{Path, PathBuf};

use esp_core::EspError;
use serde_json::Value;

use crate::mailer::Mailer;

/// Environment variable naming the provider configuration file.
pub const CONFIG_ENV: &str = "ESP_CONNECTOR_CONFIG";

/// Errors produced while locating or parsing a configuration file.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("no configuration file given; pass --config or set ESP_CONNECTOR_CONFIG")]
    Missing,
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported configuration format `{0}`; use .json, .yaml or .yml")]
    UnsupportedFormat(String),
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration parse error: {0}")]
    Yaml(#[from] serde_yaml_bw::Error),
    #[error("configuration root must be an array or an object with a `providers` key")]
    MissingProviders,
}

/// Provider configurations loaded from a JSON or YAML document.
///
/// The document root is either the array of provider configs or an object
/// holding that array under `providers`. Only the root is checked here; the
/// entries are validated by [`Mailer::init`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectorSettings {
    providers: Value,
}

impl ConnectorSettings {
    pub fn from_json_str(raw: &str) -> Result<Self, SettingsError> {
        Self::from_root(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, SettingsError> {
        Self::from_root(serde_yaml_bw::from_str(raw)?)
    }

    /// Loads a file, picking the parser from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let read = || {
            std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        match extension.as_str() {
            "json" => Self::from_json_str(&read()?),
            "yaml" | "yml" => Self::from_yaml_str(&read()?),
            other => Err(SettingsError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Loads `explicit` when given, otherwise the file named by [`CONFIG_ENV`].
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        Self::resolve_with(explicit, std::env::var_os(CONFIG_ENV))
    }

    fn resolve_with(explicit: Option<&Path>, env: Option<OsString>) -> Result<Self, SettingsError> {
        match (explicit, env) {
            (Some(path), _) => Self::from_path(path),
            (None, Some(path)) if !path.is_empty() => Self::from_path(PathBuf::from(path)),
            _ => Err(SettingsError::Missing),
        }
    }

    fn from_root(root: Value) -> Result<Self, SettingsError> {
        let providers = match root {
            Value::Array(_) => root,
            Value::Object(mut fields) => fields
                .remove("providers")
                .ok_or(SettingsError::MissingProviders)?,
            _ => return Err(SettingsError::MissingProviders),
        };
        Ok(Self { providers })
    }

    pub fn providers(&self) -> &Value {
        &self.providers
    }

    /// Initializes `mailer` with the loaded providers.
    pub fn apply(&self, mailer: &Mailer) -> Result<(), EspError> {
        mailer.init(&self.providers)
    }
}
