//! Quaily subscription widgets, ads and hosted images.

use std::sync::LazyLock;

use enclave_config::DEFAULT_IMAGE_ALT_PREFIX;
use enclave_renderer::{
    EmbedMatch, EmbedProvider, Enclave, Provider, ProviderError, escape_html,
};
use regex::Regex;
use url::Url;

use crate::consts::QUAIL_BASE_URL;
use crate::markup::{IframePolicy, host_matches, is_web, query_theme, query_value, segments};

const QUAIL_HOSTS: &[&str] = &["quaily.com", "quail.ink"];
const QUAIL_STATIC_HOSTS: &[&str] = &["static.quaily.com", "static.quail.ink"];

const DEFAULT_WIDGET_LAYOUT: &str = "subscribe_form";

static SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Whether the URL points at the Quaily site rather than its static host.
fn is_quail_site(url: &Url) -> bool {
    is_web(url) && host_matches(url, QUAIL_HOSTS) && !host_matches(url, QUAIL_STATIC_HOSTS)
}

fn invalid(provider: Provider, enclave: &Enclave) -> ProviderError {
    ProviderError::InvalidObjectId {
        provider,
        object_id: enclave.object_id.clone(),
    }
}

/// `/{list}/widget` subscription widgets.
#[derive(Default)]
pub struct QuailWidget {
    iframe: IframePolicy,
}

impl QuailWidget {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for QuailWidget {
    fn provider(&self) -> Provider {
        Provider::QuailWidget
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_quail_site(url) {
            return None;
        }
        let segs = segments(url);
        let [list, "widget"] = segs.as_slice() else {
            return None;
        };
        if !SLUG.is_match(list) {
            return None;
        }

        let layout = query_value(url, "layout")
            .filter(|l| SLUG.is_match(l))
            .unwrap_or_else(|| DEFAULT_WIDGET_LAYOUT.to_owned());
        let mut matched = EmbedMatch::new(Provider::QuailWidget, *list).with_param("layout", layout);
        if let Some(theme) = query_theme(url) {
            matched = matched.with_theme(theme);
        }
        Some(matched)
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !SLUG.is_match(&enclave.object_id) {
            return Err(invalid(Provider::QuailWidget, enclave));
        }

        let layout = enclave
            .param("layout")
            .filter(|l| SLUG.is_match(l))
            .unwrap_or(DEFAULT_WIDGET_LAYOUT);
        let theme = if enclave.theme == "dark" { "dark" } else { "light" };
        let height = if layout == DEFAULT_WIDGET_LAYOUT { 200 } else { 400 };
        Ok(format!(
            r#"<iframe src="{QUAIL_BASE_URL}/{}/widget?layout={layout}&theme={theme}" data-theme="{theme}" width="100%" height="{height}" frameborder="0" scrolling="no"></iframe>"#,
            enclave.object_id
        ))
    }
}

/// `/ad/{id}` ad slots.
#[derive(Default)]
pub struct QuailAd {
    iframe: IframePolicy,
}

impl QuailAd {
    #[must_use]
    pub fn new(iframe: IframePolicy) -> Self {
        Self { iframe }
    }
}

impl EmbedProvider for QuailAd {
    fn provider(&self) -> Provider {
        Provider::QuailAd
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_quail_site(url) {
            return None;
        }
        match segments(url).as_slice() {
            ["ad", id] if SLUG.is_match(id) => Some(EmbedMatch::new(Provider::QuailAd, *id)),
            _ => None,
        }
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        if let Some(placeholder) = self.iframe.placeholder(enclave) {
            return Ok(placeholder);
        }
        if !SLUG.is_match(&enclave.object_id) {
            return Err(invalid(Provider::QuailAd, enclave));
        }
        Ok(format!(
            r#"<div class="quail-ad"><iframe src="{QUAIL_BASE_URL}/ad/{}" width="100%" height="120" frameborder="0" scrolling="no" loading="lazy"></iframe></div>"#,
            enclave.object_id
        ))
    }
}

/// Images hosted on the Quaily static CDN.
///
/// Rendered as a lazy-loaded `<img>` with the fallback alt text.
pub struct QuailImage {
    alt_prefix: String,
}

impl QuailImage {
    #[must_use]
    pub fn new(alt_prefix: impl Into<String>) -> Self {
        Self {
            alt_prefix: alt_prefix.into(),
        }
    }
}

impl Default for QuailImage {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_ALT_PREFIX)
    }
}

impl EmbedProvider for QuailImage {
    fn provider(&self) -> Provider {
        Provider::QuailImage
    }

    fn classify(&self, url: &Url) -> Option<EmbedMatch> {
        if !is_web(url) || !host_matches(url, QUAIL_STATIC_HOSTS) || segments(url).is_empty() {
            return None;
        }
        Some(EmbedMatch::new(Provider::QuailImage, url.path()))
    }

    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        let alt = enclave.fallback_alt(&self.alt_prefix);
        let title = if enclave.title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(&enclave.title))
        };
        Ok(format!(
            r#"<img class="quail-image" src="{}" alt="{}"{title} loading="lazy" />"#,
            escape_html(enclave.url.as_str()),
            escape_html(&alt)
        ))
    }
}
