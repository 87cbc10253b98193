//! Embed provider handlers for Enclave.
//!
//! Each handler implements [`EmbedProvider`] for one [`Provider`]: it
//! recognises the provider's URLs and builds the embed markup. Iframe-based
//! handlers fall back to a linked placeholder image when the enclave has
//! iframes disabled. Twitter markup comes from an oEmbed endpoint through an
//! [`OembedClient`].
//!
//! [`default_registry`] wires every handler in classification order.
//!
//! # Example
//!
//! ```no_run
//! use enclave_config::Config;
//! use enclave_objects::default_registry;
//! use enclave_renderer::{EnclaveExtension, Markdown};
//!
//! let config = Config::default();
//! let md = Markdown::new().with_extension(EnclaveExtension::new(
//!     config.enclave(),
//!     default_registry(&config),
//! ));
//! let html = md.convert("![](https://youtu.be/dQw4w9WgXcQ)");
//! assert!(html.contains("youtube-enclave-object"));
//! ```
//!
//! [`EmbedProvider`]: enclave_renderer::EmbedProvider
//! [`Provider`]: enclave_renderer::Provider

mod consts;
mod markup;
mod oembed;
mod providers;

use std::sync::Arc;

use enclave_config::Config;
use enclave_renderer::ProviderRegistry;

pub use consts::IFRAME_DISABLED_PLACEHOLDER_URL;
pub use markup::IframePolicy;
pub use oembed::{OembedClient, OembedError, OembedResponse, UreqOembedClient};
pub use providers::{
    Bilibili, DifyWidget, Html5Audio, Podbean, QuailAd, QuailImage, QuailWidget, Spotify,
    TelegramEmoji, TradingView, Twitter, YouTube,
};

/// Registry with every provider handler, Twitter backed by `ureq`.
#[must_use]
pub fn default_registry(config: &Config) -> ProviderRegistry {
    let client = Arc::new(UreqOembedClient::new(config.oembed.timeout()));
    default_registry_with_client(config, client)
}

/// Registry with every provider handler and a custom oEmbed client.
///
/// Ad slots are tried before widgets and audio files before hosted images.
#[must_use]
pub fn default_registry_with_client(
    config: &Config,
    client: Arc<dyn OembedClient>,
) -> ProviderRegistry {
    let alt_prefix = &config.enclave.default_image_alt_prefix;
    let iframe = IframePolicy::new(alt_prefix.as_str());

    ProviderRegistry::new()
        .with_provider(YouTube::new(iframe.clone()))
        .with_provider(Bilibili::new(iframe.clone()))
        .with_provider(Twitter::new(config.oembed.twitter_endpoint.clone(), client))
        .with_provider(TradingView::new(iframe.clone()))
        .with_provider(DifyWidget::new(iframe.clone()))
        .with_provider(QuailAd::new(iframe.clone()))
        .with_provider(QuailWidget::new(iframe.clone()))
        .with_provider(Spotify::new(iframe.clone()))
        .with_provider(Podbean::new(iframe))
        .with_provider(TelegramEmoji)
        .with_provider(Html5Audio)
        .with_provider(QuailImage::new(alt_prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use enclave_renderer::{Classification, Provider};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(&Config::default());
        let order: Vec<Provider> = registry.providers().collect();
        assert_eq!(
            order,
            vec![
                Provider::YouTube,
                Provider::Bilibili,
                Provider::Twitter,
                Provider::TradingView,
                Provider::DifyWidget,
                Provider::QuailAd,
                Provider::QuailWidget,
                Provider::Spotify,
                Provider::Podbean,
                Provider::TelegramEmoji,
                Provider::Html5Audio,
                Provider::QuailImage,
            ]
        );
    }

    #[test]
    fn test_static_audio_is_audio() {
        let config = Config::default();
        let registry = default_registry(&config);
        let Classification::Matched(matched) =
            registry.classify_str("https://static.quaily.com/ep/1.mp3", &config.enclave)
        else {
            panic!("expected a match");
        };
        assert_eq!(matched.provider, Provider::Html5Audio);
    }

    #[test]
    fn test_disabled_flags_skip_handlers() {
        let mut config = Config::default();
        config.enclave.video_disabled = true;
        let registry = default_registry(&config);
        assert!(
            !registry
                .classify_str("https://youtu.be/dQw4w9WgXcQ", &config.enclave)
                .is_matched()
        );
    }
}
