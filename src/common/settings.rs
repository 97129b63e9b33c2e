use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 30;
/// Polling faster than this hammers small Wizarr instances.
pub const MIN_UPDATE_INTERVAL_SECS: u64 = 10;

/// Bridge configuration, loaded from YAML plus `WIZARR__*` environment
/// overrides. Held by the running instance; there is no global copy.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_name")]
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
}

fn default_name() -> String {
    "Wizarr".to_string()
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL_SECS
}

impl AppSettings {
    /// Load settings from a YAML file and `WIZARR__*` environment variables.
    ///
    /// # Errors
    /// * If the file can't be read.
    /// * If a required field is missing or the wrong type.
    pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(
                config::Environment::with_prefix("WIZARR")
                    .separator("__")
                    .try_parsing(true),
            );
        builder.build()?.try_deserialize::<Self>()
    }

    /// Parse settings from a YAML string, still honoring environment
    /// overrides.
    ///
    /// # Errors
    /// Same failure modes as [`AppSettings::load`].
    pub fn from_yaml_str(contents: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Yaml))
            .add_source(
                config::Environment::with_prefix("WIZARR")
                    .separator("__")
                    .try_parsing(true),
            );
        builder.build()?.try_deserialize::<Self>()
    }

    /// Polling interval with the floor applied.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs.max(MIN_UPDATE_INTERVAL_SECS))
    }
}
