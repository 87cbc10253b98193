use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::SPOTIFY_EMBED_URL;
use crate::markup::{IframePolicy, host_matches, is_web, query_theme, segments};

const KINDS: &[&str] = &["track", "album", "playlist", "episode", "show", "artist"];

static SPOTIFY_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{22}$").unwrap());

/// Parse a `{type}/{id}` object id.
fn split_object_id(object_id: &str) -> Option<(&str, &str)> {
    let (kind, id) = object_id.split_once('/')?;
    (KINDS.contains(&kind) && SPOTIFY_ID.is_match(id)).then_some((kind, id))
}

/// Spotify tracks, albums, playlists, episodes, shows and artists.
#[derive(Default)]
pub struct Spotify {
    iframe: IframePolicy,
}

impl Spotify {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for Spotify {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["open.spotify.com"]) {
            return None;
        }
        let segs = segments(url);
        // Localised links carry an `intl-xx` prefix.
        let rest = match segs.as_slice() {
            [first, rest @ ..] if first.starts_with("intl-") => rest,
            all => all,
        };
        let [kind, id, ..] = rest else {
            return None;
        };
        let object_id = format!("{kind}/{id}");
        split_object_id(&object_id)?;

        let mut matched = EmbedMatch::new(Provider::Spotify, object_id);
        if let Some(theme) = query_theme(url) {
            matched = matched.with_theme(theme);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        let (kind, id) =
            split_object_id(&enclave.object_id).ok_or_else(|| ProviderError::InvalidObjectId {
                provider: Provider::Spotify,
                object_id: enclave.object_id.clone(),
            })?;

        let theme = if enclave.theme == "dark" { "&theme=0" } else { "" };
        let height = if matches!(kind, "track" | "episode") { 152 } else { 352 };
        Ok(format!(
            r#"<iframe style="border-radius:12px" src="{SPOTIFY_EMBED_URL}/{kind}/{id}?utm_source=generator{theme}" width="100%" height="{height}" frameborder="0" allowfullscreen="" allow="autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture" loading="lazy"></iframe>"#
        ))
    }
}
