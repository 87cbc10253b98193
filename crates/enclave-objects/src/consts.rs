//! Provider endpoints and markup constants.

/// Image shown instead of an iframe when iframes are disabled (e.g. email).
pub const IFRAME_DISABLED_PLACEHOLDER_URL: &str =
    "https://static.quail.ink/assets/not-available-in-email.png";

pub(crate) const YOUTUBE_EMBED_URL: &str = "https://www.youtube.com/embed";

pub(crate) const BILIBILI_PLAYER_URL: &str = "https://player.bilibili.com/player.html";

pub(crate) const TRADINGVIEW_WIDGET_SCRIPT: &str =
    "https://s3.tradingview.com/external-embedding/embed-widget-symbol-overview.js";

pub(crate) const DIFY_CHATBOT_URL: &str = "https://udify.app/chatbot";

pub(crate) const QUAIL_BASE_URL: &str = "https://quaily.com";

pub(crate) const SPOTIFY_EMBED_URL: &str = "https://open.spotify.com/embed";

pub(crate) const PODBEAN_PLAYER_URL: &str = "https://www.podbean.com/player-v2/";

/// Podbean player skin colors per theme.
pub(crate) const PODBEAN_SKIN_LIGHT: &str = "f6f6f6";
pub(crate) const PODBEAN_SKIN_DARK: &str = "1b1b1b";

/// File extensions played through an HTML5 `<audio>` element.
pub(crate) const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "m4a", "wav", "ogg", "oga", "flac", "aac", "opus",
];
