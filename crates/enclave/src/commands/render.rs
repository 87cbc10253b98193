//! `enclave render` command implementation.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use enclave_config::{CliSettings, Config};
use enclave_objects::default_registry;
use enclave_renderer::{EnclaveExtension, KbdExtension, Markdown};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (`-` reads stdin).
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover enclave.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replace iframe players with a linked placeholder image.
    #[arg(long)]
    iframe_disabled: bool,

    /// Render images without a provider through the plain image template.
    #[arg(long)]
    demote_unmatched: bool,

    /// Timeout in seconds for oEmbed requests.
    #[arg(long, value_name = "SECS")]
    oembed_timeout: Option<u64>,

    /// Disable GitHub Flavored Markdown extensions.
    #[arg(long)]
    no_gfm: bool,

    /// Enable verbose output (show embed failures and timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input or output file
    /// cannot be accessed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = self.cli_settings();
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if self.verbose {
            match &config.config_path {
                Some(path) => output.info(&format!("Config: {}", path.display())),
                None => output.info("Config: defaults"),
            }
        }

        let markdown = read_input(&self.input)?;
        let md = Markdown::new()
            .with_gfm(!self.no_gfm)
            .with_extension(KbdExtension)
            .with_extension(EnclaveExtension::new(config.enclave(), default_registry(&config)));

        let start = std::time::Instant::now();
        let html = md.convert(&markdown);
        tracing::info!(
            input = %self.input.display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Rendered markdown"
        );

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html)?;
                output.success(&format!("Wrote {}", path.display()));
            }
            None => output.result(&html)?,
        }

        Ok(())
    }

    /// Only flags that were passed override the configuration file.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            iframe_disabled: self.iframe_disabled.then_some(true),
            demote_unmatched_images: self.demote_unmatched.then_some(true),
            oembed_timeout_secs: self.oembed_timeout,
        }
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    if !path.is_file() {
        return Err(CliError::Validation(format!(
            "Input file not found: {}",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(argv: &[&str]) -> RenderArgs {
        TestCli::parse_from(std::iter::once("render").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_cli_settings_unset_flags_do_not_override() {
        let settings = parse(&["doc.md"]).cli_settings();
        assert_eq!(settings.iframe_disabled, None);
        assert_eq!(settings.demote_unmatched_images, None);
        assert_eq!(settings.oembed_timeout_secs, None);
    }

    #[test]
    fn test_cli_settings_oembed_timeout() {
        let settings = parse(&["doc.md", "--oembed-timeout", "3"]).cli_settings();
        assert_eq!(settings.oembed_timeout_secs, Some(3));

        let bad = ["render", "doc.md", "--oembed-timeout", "soon"];
        assert!(TestCli::try_parse_from(bad).is_err());
    }

    #[test]
    fn test_cli_settings_flags() {
        let args = parse(&["doc.md", "--iframe-disabled", "--demote-unmatched", "-v"]);
        assert!(args.verbose);
        let settings = args.cli_settings();
        assert_eq!(settings.iframe_disabled, Some(true));
        assert_eq!(settings.demote_unmatched_images, Some(true));
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/nonexistent/doc.md")).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
    }
}
