//! Host configuration: a TOML file plus credentials from the environment.
//!
//! ```toml
//! [search]
//! timeout_seconds = 8
//! default_radius_meters = 20000
//!
//! [google]
//! api_key = "..."
//!
//! [gemini]
//! model = "gemini-1.5-flash-latest"
//! ```
//!
//! API keys may also come from `GOOGLE_PLACES_API_KEY`,
//! `FOURSQUARE_API_KEY` and `GEMINI_API_KEY`, which take precedence over
//! the file.

use std::path::Path;

use place_search::config::{
    FOURSQUARE_BASE_URL, GEMINI_BASE_URL, GEMINI_DEFAULT_MODEL, GOOGLE_BASE_URL,
};
use place_search::{FoursquareConfig, GeminiConfig, GoogleConfig, SearchConfig};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const GOOGLE_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";
pub const FOURSQUARE_KEY_ENV: &str = "FOURSQUARE_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

/// Pipeline tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub timeout_seconds: u64,
    pub expansion_timeout_seconds: u64,
    pub default_radius_meters: f64,
    pub candidate_limit: usize,
    pub user_agent: Option<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        let defaults = SearchConfig::default();
        Self {
            timeout_seconds: defaults.timeout_seconds,
            expansion_timeout_seconds: defaults.expansion_timeout_seconds,
            default_radius_meters: defaults.default_radius_meters,
            candidate_limit: defaults.candidate_limit,
            user_agent: defaults.user_agent,
        }
    }
}

/// Credentials and endpoint for one place provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub api_key: Option<String>,
    /// Overrides the provider's public API host.
    pub base_url: Option<String>,
}

/// Credentials, model, and endpoint for the suggestion generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Everything the host reads at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchSection,
    pub google: ProviderSection,
    pub foursquare: ProviderSection,
    pub gemini: GeminiSection,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the file at `explicit`, or the default config path when `None`,
    /// then overlay credentials from the process environment.
    ///
    /// A missing default file means defaults; a missing explicit file is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a file that should be read cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = crate::paths::default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Overlay non-blank API keys returned by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let key = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(k) = key(GOOGLE_KEY_ENV) {
            self.google.api_key = Some(k);
        }
        if let Some(k) = key(FOURSQUARE_KEY_ENV) {
            self.foursquare.api_key = Some(k);
        }
        if let Some(k) = key(GEMINI_KEY_ENV) {
            self.gemini.api_key = Some(k);
        }
    }

    /// Build the library configuration. Sections without an API key stay
    /// inactive.
    pub fn to_search_config(&self) -> SearchConfig {
        let google = present(&self.google.api_key).map(|key| {
            GoogleConfig::new(key).with_base_url(
                self.google
                    .base_url
                    .clone()
                    .unwrap_or_else(|| GOOGLE_BASE_URL.to_owned()),
            )
        });
        let foursquare = present(&self.foursquare.api_key).map(|key| {
            FoursquareConfig::new(key).with_base_url(
                self.foursquare
                    .base_url
                    .clone()
                    .unwrap_or_else(|| FOURSQUARE_BASE_URL.to_owned()),
            )
        });
        let gemini = present(&self.gemini.api_key).map(|key| {
            GeminiConfig::new(key)
                .with_model(
                    self.gemini
                        .model
                        .clone()
                        .unwrap_or_else(|| GEMINI_DEFAULT_MODEL.to_owned()),
                )
                .with_base_url(
                    self.gemini
                        .base_url
                        .clone()
                        .unwrap_or_else(|| GEMINI_BASE_URL.to_owned()),
                )
        });

        SearchConfig {
            google,
            foursquare,
            gemini,
            timeout_seconds: self.search.timeout_seconds,
            expansion_timeout_seconds: self.search.expansion_timeout_seconds,
            default_radius_meters: self.search.default_radius_meters,
            candidate_limit: self.search.candidate_limit,
            user_agent: self.search.user_agent.clone(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn empty_file_gives_library_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "");
        let config = AppConfig::from_file(&path).expect("load");
        assert_eq!(config, AppConfig::default());

        let search = config.to_search_config();
        assert_eq!(search.timeout_seconds, 8);
        assert!(search.active_providers().is_empty());
        assert!(search.gemini.is_none());
    }

    #[test]
    fn file_values_flow_into_search_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
[search]
timeout_seconds = 3
default_radius_meters = 5000.0
candidate_limit = 5

[google]
api_key = "g-file"
base_url = "http://localhost:9000"

[gemini]
api_key = "m-file"
model = "gemini-2.0-flash"
"#,
        );
        let search = AppConfig::from_file(&path).expect("load").to_search_config();
        assert_eq!(search.timeout_seconds, 3);
        assert_eq!(search.candidate_limit, 5);
        assert!((search.default_radius_meters - 5000.0).abs() < f64::EPSILON);

        let google = search.google.expect("google");
        assert_eq!(google.api_key, "g-file");
        assert_eq!(google.base_url, "http://localhost:9000");
        assert!(search.foursquare.is_none());

        let gemini = search.gemini.expect("gemini");
        assert_eq!(gemini.model, "gemini-2.0-flash");
        assert_eq!(gemini.base_url, GEMINI_BASE_URL);
    }

    #[test]
    fn environment_keys_override_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "[google]\napi_key = \"g-file\"\n");
        let mut config = AppConfig::from_file(&path).expect("load");

        let env: HashMap<&str, &str> = HashMap::from([
            (GOOGLE_KEY_ENV, "g-env"),
            (FOURSQUARE_KEY_ENV, "f-env"),
            (GEMINI_KEY_ENV, "  "),
        ]);
        config.apply_env(|name| env.get(name).map(|v| (*v).to_owned()));

        let search = config.to_search_config();
        assert_eq!(search.google.expect("google").api_key, "g-env");
        assert_eq!(
            search.foursquare.expect("foursquare").base_url,
            FOURSQUARE_BASE_URL
        );
        assert!(search.gemini.is_none());
    }

    #[test]
    fn blank_key_in_file_leaves_provider_inactive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "[foursquare]\napi_key = \"\"\n");
        let search = AppConfig::from_file(&path).expect("load").to_search_config();
        assert!(search.foursquare.is_none());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "this is not valid toml {{{");
        let err = AppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn config_serializes_to_toml() {
        let mut config = AppConfig::default();
        config.google.api_key = Some("k".into());
        let text = toml::to_string_pretty(&config).expect("serialize");
        let back: AppConfig = toml::from_str(&text).expect("parse");
        assert_eq!(back, config);
    }
}
