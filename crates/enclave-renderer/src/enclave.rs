//! Enclave node model.
//!
//! An [`Enclave`] is the payload of [`NodeKind::Enclave`](crate::NodeKind::Enclave):
//! an image reference that was recognised as an embed. It carries the
//! resolved [`Provider`] together with the original alt text, title and URL.

use std::collections::HashMap;
use std::fmt;

use enclave_config::EnclaveConfig;
use url::Url;

use crate::provider::EmbedMatch;

/// Embed provider recognised by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    YouTube,
    Bilibili,
    Twitter,
    TradingView,
    DifyWidget,
    QuailWidget,
    QuailImage,
    QuailAd,
    Spotify,
    Html5Audio,
    Podbean,
    TelegramEmoji,
    /// Plain image, rendered as `<img>` without any wrapper.
    RegularImage,
}

/// How the dispatcher wraps a provider's markup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapPolicy {
    /// Surround with the uniform container markup.
    Wrapped { is_normal: bool, has_border: bool },
    /// Emit the builder output as-is.
    Unwrapped,
    /// Skip the builder entirely and emit a plain `<img>`.
    Bare,
}

impl Provider {
    /// Every provider, in default classification order.
    pub const ALL: [Self; 13] = [
        Self::YouTube,
        Self::Bilibili,
        Self::Twitter,
        Self::TradingView,
        Self::DifyWidget,
        Self::QuailAd,
        Self::QuailWidget,
        Self::Spotify,
        Self::Podbean,
        Self::TelegramEmoji,
        Self::Html5Audio,
        Self::QuailImage,
        Self::RegularImage,
    ];

    /// Stable identifier, used in logs and CLI output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Bilibili => "bilibili",
            Self::Twitter => "twitter",
            Self::TradingView => "tradingview",
            Self::DifyWidget => "dify-widget",
            Self::QuailWidget => "quail-widget",
            Self::QuailImage => "quail-image",
            Self::QuailAd => "quail-ad",
            Self::Spotify => "spotify",
            Self::Html5Audio => "html5-audio",
            Self::Podbean => "podbean",
            Self::TelegramEmoji => "tg-emoji",
            Self::RegularImage => "regular-image",
        }
    }

    /// CSS class stem used in `{name}-enclave-object`.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::Bilibili => "bilibili",
            Self::Twitter => "twitter",
            Self::TradingView => "tradingview",
            Self::DifyWidget => "dify",
            Self::QuailWidget => "quail",
            Self::QuailImage => "quail-image",
            Self::QuailAd => "quail-ad",
            Self::Spotify => "spotify",
            Self::Html5Audio => "audio",
            Self::Podbean => "podbean",
            Self::TelegramEmoji => "tg-emoji",
            Self::RegularImage => "regular-image",
        }
    }

    #[must_use]
    pub fn wrap_policy(self) -> WrapPolicy {
        match self {
            Self::YouTube | Self::Bilibili | Self::TradingView => WrapPolicy::Wrapped {
                is_normal: false,
                has_border: false,
            },
            Self::Twitter
            | Self::DifyWidget
            | Self::QuailWidget
            | Self::Spotify
            | Self::Html5Audio
            | Self::Podbean
            | Self::TelegramEmoji => WrapPolicy::Wrapped {
                is_normal: true,
                has_border: false,
            },
            Self::QuailAd | Self::QuailImage => WrapPolicy::Unwrapped,
            Self::RegularImage => WrapPolicy::Bare,
        }
    }

    /// Whether the configuration turns classification for this provider off.
    #[must_use]
    pub fn is_disabled(self, config: &EnclaveConfig) -> bool {
        match self {
            Self::YouTube | Self::Bilibili => config.video_disabled,
            Self::Twitter => config.twitter_disabled,
            Self::TradingView => config.tradingview_disabled,
            Self::DifyWidget => config.dify_widget_disabled,
            Self::QuailWidget => config.quail_widget_disabled,
            _ => false,
        }
    }

    /// Whether the provider's markup is an iframe (or an iframe-backed widget).
    #[must_use]
    pub fn uses_iframe(self) -> bool {
        matches!(
            self,
            Self::YouTube
                | Self::Bilibili
                | Self::TradingView
                | Self::DifyWidget
                | Self::QuailWidget
                | Self::QuailAd
                | Self::Spotify
                | Self::Podbean
        )
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved embed carried by an Enclave node.
#[derive(Clone, Debug, PartialEq)]
pub struct Enclave {
    /// Alt text of the original image reference.
    pub alt: String,
    /// Title of the original image reference.
    pub title: String,
    /// Absolute URL of the original image reference.
    pub url: Url,
    /// Render a placeholder instead of any iframe.
    pub iframe_disabled: bool,
    pub provider: Provider,
    /// Provider-specific identifier (video id, tweet id, symbol, ...).
    pub object_id: String,
    /// Display theme, `"light"` unless the URL says otherwise.
    pub theme: String,
    pub params: HashMap<String, String>,
}

impl Enclave {
    #[must_use]
    pub fn new(url: Url, provider: Provider, object_id: impl Into<String>) -> Self {
        Self {
            alt: String::new(),
            title: String::new(),
            url,
            iframe_disabled: false,
            provider,
            object_id: object_id.into(),
            theme: crate::provider::DEFAULT_THEME.to_owned(),
            params: HashMap::new(),
        }
    }

    /// Build an enclave from a classifier match and the original image fields.
    #[must_use]
    pub fn from_match(
        url: Url,
        alt: impl Into<String>,
        title: impl Into<String>,
        matched: EmbedMatch,
        iframe_disabled: bool,
    ) -> Self {
        Self {
            alt: alt.into(),
            title: title.into(),
            url,
            iframe_disabled,
            provider: matched.provider,
            object_id: matched.object_id,
            theme: matched.theme,
            params: matched.params,
        }
    }

    /// Degenerate enclave for an image no provider claimed.
    #[must_use]
    pub fn regular_image(url: Url, alt: impl Into<String>, title: impl Into<String>) -> Self {
        let object_id = url.as_str().to_owned();
        Self {
            alt: alt.into(),
            title: title.into(),
            ..Self::new(url, Provider::RegularImage, object_id)
        }
    }

    #[must_use]
    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_iframe_disabled(mut self, disabled: bool) -> Self {
        self.iframe_disabled = disabled;
        self
    }

    /// Look up a provider parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Alt text for generated markup.
    ///
    /// Uses the node's own alt when non-empty, otherwise `"{prefix} {title}"`,
    /// otherwise `"{prefix} post"`.
    #[must_use]
    pub fn fallback_alt(&self, prefix: &str) -> String {
        if !self.alt.is_empty() {
            self.alt.clone()
        } else if !self.title.is_empty() {
            format!("{prefix} {}", self.title)
        } else {
            format!("{prefix} post")
        }
    }
}
