//! `enclave classify` command implementation.

use std::path::PathBuf;

use clap::Args;
use enclave_config::{Config, EnclaveConfig};
use enclave_objects::default_registry;
use enclave_renderer::{Classification, ProviderRegistry};
use serde_json::{Value, json};
use url::Url;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the classify command.
#[derive(Args)]
pub(crate) struct ClassifyArgs {
    /// Absolute URL to classify.
    url: String,

    /// Path to configuration file (default: auto-discover enclave.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ClassifyArgs {
    /// Execute the classify command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the URL is not absolute.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let url = Url::parse(&self.url)
            .map_err(|e| CliError::Validation(format!("Invalid URL {}: {e}", self.url)))?;

        let registry = default_registry(&config);
        let report = classification_json(&registry, &url, &config.enclave());
        if report["matched"] == Value::Bool(false) {
            output.warning(&format!("No provider matched {url}"));
        }
        output.result(&serde_json::to_string_pretty(&report)?)?;

        Ok(())
    }
}

fn classification_json(registry: &ProviderRegistry, url: &Url, config: &EnclaveConfig) -> Value {
    match registry.classify(url, config) {
        Classification::Matched(matched) => json!({
            "matched": true,
            "provider": matched.provider.as_str(),
            "object_id": matched.object_id,
            "theme": matched.theme,
            "params": matched.params,
        }),
        Classification::NotMatched => json!({
            "matched": false,
            "url": url.as_str(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(url: &str, config: &Config) -> Value {
        classification_json(
            &default_registry(config),
            &Url::parse(url).unwrap(),
            &config.enclave(),
        )
    }

    #[test]
    fn test_matched_json() {
        let report = classify("https://youtu.be/dQw4w9WgXcQ?t=90", &Config::default());
        assert_eq!(
            report,
            json!({
                "matched": true,
                "provider": "youtube",
                "object_id": "dQw4w9WgXcQ",
                "theme": "light",
                "params": { "start": "90" },
            })
        );
    }

    #[test]
    fn test_not_matched_json() {
        let report = classify("https://example.com/pic.png", &Config::default());
        assert_eq!(
            report,
            json!({ "matched": false, "url": "https://example.com/pic.png" })
        );
    }

    #[test]
    fn test_disabled_provider_not_matched() {
        let mut config = Config::default();
        config.enclave.twitter_disabled = true;
        let report = classify("https://x.com/jack/status/20", &config);
        assert_eq!(report["matched"], Value::Bool(false));
    }
}
