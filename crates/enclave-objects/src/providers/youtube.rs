use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::YOUTUBE_EMBED_URL;
use crate::markup::{IframePolicy, host_matches, is_web, query_value, segments};

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

/// `1h2m3s`, `90s` or plain seconds.
static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<h>\d+)h)?(?:(?P<m>\d+)m)?(?:(?P<s>\d+)s?)?$").unwrap()
});

/// Convert a `t`/`start` value to seconds; `None` when out of range.
fn parse_timestamp(value: &str) -> Option<u64> {
    if value.is_empty() {
        return None;
    }
    let caps = TIMESTAMP.captures(value)?;
    let part = |name: &str| -> Option<u64> {
        caps.name(name).map_or(Some(0), |m| m.as_str().parse().ok())
    };
    part("h")?
        .checked_mul(3600)?
        .checked_add(part("m")?.checked_mul(60)?)?
        .checked_add(part("s")?)
}

/// YouTube videos, shorts and live streams.
#[derive(Default)]
pub struct YouTube {
    iframe: IframePolicy,
}

impl YouTube {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }

    fn video_id(url: &Url) -> Option<String> {
        let segs = segments(url);
        if host_matches(url, &["youtu.be"]) {
            return segs.first().map(|s| (*s).to_owned());
        }
        if !host_matches(url, &["youtube.com", "youtube-nocookie.com"]) {
            return None;
        }
        match segs.as_slice() {
            ["watch"] => query_value(url, "v"),
            ["embed" | "shorts" | "live" | "v", id, ..] => Some((*id).to_owned()),
            _ => None,
        }
    }
}

impl EmbedProvider for YouTube {
    fn provider(&self) -> Provider {
        Provider::YouTube
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) {
            return None;
        }
        let id = Self::video_id(url).filter(|id| VIDEO_ID.is_match(id))?;
        let mut matched = EmbedMatch::new(Provider::YouTube, id);

        let start = query_value(url, "t")
            .or_else(|| query_value(url, "start"))
            .and_then(|t| parse_timestamp(&t))
            .filter(|&s| s > 0);
        if let Some(start) = start {
            matched = matched.with_param("start", start.to_string());
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !VIDEO_ID.is_match(&enclave.object_id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::YouTube,
                object_id: enclave.object_id.clone(),
            });
        }

        let start = enclave
            .param("start")
            .and_then(|s| s.parse::<u64>().ok())
            .map(|s| format!("?start={s}"))
            .unwrap_or_default();
        let src = format!("{YOUTUBE_EMBED_URL}/{}{start}", enclave.object_id);
        Ok(format!(
            r#"<iframe src="{src}" title="YouTube video player" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share" referrerpolicy="strict-origin-when-cross-origin" allowfullscreen></iframe>"#
        ))
    }
}
