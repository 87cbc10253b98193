use std::sync::LazyLock;

use enclave_renderer::{EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError};
use regex::Regex;
use url::Url;

use crate::consts::BILIBILI_PLAYER_URL;
use crate::markup::{IframePolicy, host_matches, is_web, query_value, segments};

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:BV[0-9A-Za-z]{10}|av\d+)$").unwrap());

/// Bilibili videos, addressed by `BV` id or legacy `av` number.
#[derive(Default)]
pub struct Bilibili {
    iframe: IframePolicy,
}

impl Bilibili {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for Bilibili {
    fn provider(&self) -> Provider {
        Provider::Bilibili
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, &["bilibili.com"]) {
            return None;
        }
        let segs = segments(url);
        let ["video", id, ..] = segs.as_slice() else {
            return None;
        };
        if !VIDEO_ID.is_match(id) {
            return None;
        }

        let mut matched = EmbedMatch::new(Provider::Bilibili, *id);
        if let Some(page) = query_value(url, "p").filter(|p| p.parse::<u32>().is_ok_and(|n| n > 0)) {
            matched = matched.with_param("page", page);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        let id = enclave.object_id.as_str();
        if !VIDEO_ID.is_match(id) {
            return Err(ProviderError::InvalidObjectId {
                provider: Provider::Bilibili,
                object_id: enclave.object_id.clone(),
            });
        }

        let video = match id.strip_prefix("av") {
            Some(aid) => format!("aid={aid}"),
            None => format!("bvid={id}"),
        };
        let page = enclave
            .param("page")
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(1);
        Ok(format!(
            r#"<iframe src="{BILIBILI_PLAYER_URL}?{video}&page={page}&high_quality=1&danmaku=0" scrolling="no" border="0" frameborder="no" framespacing="0" allowfullscreen="true"></iframe>"#
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn classify(s: &str) -> Option<EmbedMatch> {
        Bilibili::default().classify(&Url::parse(s).unwrap())
    }

    #[test]
    fn test_classify_bvid() {
        let matched = classify("https://www.bilibili.com/video/BV1GJ411x7h7/?p=2").unwrap();
        assert_eq!(matched.object_id, "BV1GJ411x7h7");
        assert_eq!(matched.params.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_classify_aid() {
        let matched = classify("https://m.bilibili.com/video/av170001").unwrap();
        assert_eq!(matched.object_id, "av170001");
        assert!(matched.params.is_empty());
    }

    #[test]
    fn test_classify_rejects_other_pages() {
        assert!(classify("https://www.bilibili.com/bangumi/play/ep1").is_none());
        assert!(classify("https://www.bilibili.com/video/BVshort").is_none());
        assert!(classify("https://space.bilibili.com/123").is_none());
    }

    #[test]
    fn test_render_bvid_player() {
        let enc = Enclave::new(
            Url::parse("https://www.bilibili.com/video/BV1GJ411x7h7").unwrap(),
            Provider::Bilibili,
            "BV1GJ411x7h7",
        );
        let html = Bilibili::default().render(&enc).unwrap();
        assert!(html.contains(
            "https://player.bilibili.com/player.html?bvid=BV1GJ411x7h7&page=1&high_quality=1"
        ));
    }

    #[test]
    fn test_render_aid_player() {
        let enc = Enclave::new(
            Url::parse("https://www.bilibili.com/video/av170001").unwrap(),
            Provider::Bilibili,
            "av170001",
        )
        .with_param("page", "3");
        let html = Bilibili::default().render(&enc).unwrap();
        assert!(html.contains("?aid=170001&page=3&"));
    }
}
