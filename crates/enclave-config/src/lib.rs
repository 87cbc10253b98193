//! Configuration management for Enclave.
//!
//! Reads `enclave.toml`, either from an explicit path or the nearest one found
//! walking up from the working directory.
//!
//! The `[enclave]` section maps onto [`EnclaveConfig`], the by-value flag set
//! captured by the transformer and dispatcher at construction time. The
//! `[oembed]` section configures metadata fetches made by provider builders.
//!
//! Command-line flags are layered on top through [`CliSettings`].
//!
//! `enclave.default_image_alt_prefix` and `oembed.twitter_endpoint` accept
//! `${VAR}` (required) and `${VAR:-default}` references.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "enclave.toml";

/// Default prefix for generated image alt text.
pub const DEFAULT_IMAGE_ALT_PREFIX: &str = "An image to describe";

/// Default Twitter oEmbed endpoint.
pub const DEFAULT_TWITTER_OEMBED_ENDPOINT: &str = "https://publish.twitter.com/oembed";

/// Default timeout for oEmbed requests, in seconds.
const DEFAULT_OEMBED_TIMEOUT_SECS: u64 = 10;

/// Command-line overrides; `None` keeps the file value.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the iframe-disabled policy.
    pub iframe_disabled: Option<bool>,
    /// Override demotion of unclassified images.
    pub demote_unmatched_images: Option<bool>,
    /// Override the oEmbed request timeout.
    pub oembed_timeout_secs: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Embed policy flags.
    pub enclave: EnclaveConfig,
    /// oEmbed fetch configuration.
    pub oembed: OembedConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Embed policy flags consumed by the transformer and the render dispatcher.
///
/// Passed by value at extension construction and never mutated afterwards.
/// Each `*_disabled` flag makes classification skip the matching providers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnclaveConfig {
    /// Prefix for generated alt text (`"{prefix} {title}"`).
    pub default_image_alt_prefix: String,
    /// Render a placeholder image instead of any iframe.
    pub iframe_disabled: bool,
    /// Skip video providers (`YouTube`, Bilibili).
    pub video_disabled: bool,
    /// Skip tweet embeds.
    pub twitter_disabled: bool,
    /// Skip `TradingView` widgets.
    pub tradingview_disabled: bool,
    /// Skip Dify chatbot widgets.
    pub dify_widget_disabled: bool,
    /// Skip Quail subscription widgets.
    pub quail_widget_disabled: bool,
    /// Turn unclassified absolute-URL images into regular-image enclaves.
    pub demote_unmatched_images: bool,
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            default_image_alt_prefix: DEFAULT_IMAGE_ALT_PREFIX.to_owned(),
            iframe_disabled: false,
            video_disabled: false,
            twitter_disabled: false,
            tradingview_disabled: false,
            dify_widget_disabled: false,
            quail_widget_disabled: false,
            demote_unmatched_images: false,
        }
    }
}

/// oEmbed fetch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OembedConfig {
    /// Twitter oEmbed endpoint URL.
    pub twitter_endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OembedConfig {
    fn default() -> Self {
        Self {
            twitter_endpoint: DEFAULT_TWITTER_OEMBED_ENDPOINT.to_owned(),
            timeout_secs: DEFAULT_OEMBED_TIMEOUT_SECS,
        }
    }
}

impl OembedConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`oembed.twitter_endpoint`").
        field: String,
        /// Error message (e.g., "${`OEMBED_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `enclave.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Embed policy flags, by value.
    #[must_use]
    pub fn enclave(&self) -> EnclaveConfig {
        self.enclave.clone()
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(iframe_disabled) = settings.iframe_disabled {
            self.enclave.iframe_disabled = iframe_disabled;
        }
        if let Some(demote) = settings.demote_unmatched_images {
            self.enclave.demote_unmatched_images = demote;
        }
        if let Some(timeout) = settings.oembed_timeout_secs {
            self.oembed.timeout_secs = timeout;
        }
    }

    /// Nearest `enclave.toml` at or above the working directory.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(
            &self.enclave.default_image_alt_prefix,
            "enclave.default_image_alt_prefix",
        )?;
        self.validate_oembed()
    }

    /// Validate oEmbed configuration.
    fn validate_oembed(&self) -> Result<(), ConfigError> {
        const MAX_TIMEOUT_SECS: u64 = 300;

        require_non_empty(&self.oembed.twitter_endpoint, "oembed.twitter_endpoint")?;
        require_http_url(&self.oembed.twitter_endpoint, "oembed.twitter_endpoint")?;

        if self.oembed.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "oembed.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if self.oembed.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Validation(format!(
                "oembed.timeout_secs cannot exceed {MAX_TIMEOUT_SECS}"
            )));
        }

        Ok(())
    }

    /// Expand `${VAR}` references in the string settings that accept them.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_field(
            &mut self.enclave.default_image_alt_prefix,
            "enclave.default_image_alt_prefix",
        )?;
        expand::expand_field(&mut self.oembed.twitter_endpoint, "oembed.twitter_endpoint")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.enclave.default_image_alt_prefix,
            "An image to describe"
        );
        assert!(!config.enclave.iframe_disabled);
        assert!(!config.enclave.demote_unmatched_images);
        assert_eq!(
            config.oembed.twitter_endpoint,
            "https://publish.twitter.com/oembed"
        );
        assert_eq!(config.oembed.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.enclave, EnclaveConfig::default());
    }

    #[test]
    fn test_parse_enclave_flags() {
        let toml = r#"
[enclave]
default_image_alt_prefix = "Picture of"
iframe_disabled = true
video_disabled = true
twitter_disabled = true
tradingview_disabled = true
dify_widget_disabled = true
quail_widget_disabled = true
demote_unmatched_images = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let enclave = config.enclave();
        assert_eq!(enclave.default_image_alt_prefix, "Picture of");
        assert!(enclave.iframe_disabled);
        assert!(enclave.video_disabled);
        assert!(enclave.twitter_disabled);
        assert!(enclave.tradingview_disabled);
        assert!(enclave.dify_widget_disabled);
        assert!(enclave.quail_widget_disabled);
        assert!(enclave.demote_unmatched_images);
    }

    #[test]
    fn test_parse_oembed_config() {
        let toml = r#"
[oembed]
twitter_endpoint = "https://oembed.example.com/twitter"
timeout_secs = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.oembed.twitter_endpoint,
            "https://oembed.example.com/twitter"
        );
        assert_eq!(config.oembed.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_validate_rejects_empty_alt_prefix() {
        let mut config = Config::default();
        config.enclave.default_image_alt_prefix = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("default_image_alt_prefix"));
    }

    #[test]
    fn test_validate_rejects_non_http_endpoint() {
        let mut config = Config::default();
        config.oembed.twitter_endpoint = "ftp://example.com".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.oembed.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_timeout() {
        let mut config = Config::default();
        config.oembed.timeout_secs = 3600;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        let overrides = CliSettings {
            iframe_disabled: Some(true),
            demote_unmatched_images: Some(true),
            oembed_timeout_secs: Some(5),
        };

        config.apply_cli_settings(&overrides);

        assert!(config.enclave.iframe_disabled);
        assert!(config.enclave.demote_unmatched_images);
        assert_eq!(config.oembed.timeout_secs, 5);
        assert!(!config.enclave.video_disabled); // Unchanged
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.enclave, EnclaveConfig::default());
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/enclave.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enclave.toml");
        std::fs::write(
            &path,
            "[enclave]\nvideo_disabled = true\n\n[oembed]\ntimeout_secs = 7\n",
        )
        .unwrap();

        let settings = CliSettings {
            iframe_disabled: Some(true),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert!(config.enclave.video_disabled);
        assert!(config.enclave.iframe_disabled);
        assert_eq!(config.oembed.timeout_secs, 7);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enclave.toml");
        std::fs::write(&path, "[enclave\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_expand_env_vars_endpoint_default() {
        let toml = r#"
[oembed]
twitter_endpoint = "${ENCLAVE_TEST_OEMBED_UNSET:-https://oembed.test.com}/twitter"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.oembed.twitter_endpoint, "https://oembed.test.com/twitter");
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        let toml = r#"
[enclave]
default_image_alt_prefix = "${ENCLAVE_TEST_PREFIX_UNSET}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("enclave.default_image_alt_prefix"));
    }
}
