//! Helpers shared by provider handlers.

use enclave_config::DEFAULT_IMAGE_ALT_PREFIX;
use enclave_renderer::{Enclave, escape_html};
use url::Url;

use crate::consts::IFRAME_DISABLED_PLACEHOLDER_URL;

/// Placeholder rendering for iframe-based providers.
///
/// When an enclave has `iframe_disabled` set, iframe providers emit a linked
/// placeholder image instead of their player.
#[derive(Clone, Debug)]
pub struct IframePolicy {
    alt_prefix: String,
}

impl IframePolicy {
    #[must_use]
    pub fn new(alt_prefix: impl Into<String>) -> Self {
        Self {
            alt_prefix: alt_prefix.into(),
        }
    }

    /// Placeholder markup, or `None` when iframes are allowed.
    pub(crate) fn placeholder(&self, enclave: &Enclave) -> Option<String> {
        enclave.iframe_disabled.then(|| {
            format!(
                r#"<a href="{}"><img src="{IFRAME_DISABLED_PLACEHOLDER_URL}" alt="{}" /></a>"#,
                escape_html(enclave.url.as_str()),
                escape_html(&enclave.fallback_alt(&self.alt_prefix))
            )
        })
    }
}

impl Default for IframePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_ALT_PREFIX)
    }
}

/// Whether the URL uses `http` or `https`.
pub(crate) fn is_web(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Whether the host is one of `domains` or a subdomain of one.
pub(crate) fn host_matches(url: &Url, domains: &[&str]) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    domains.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|rest| rest.ends_with('.'))
    })
}

/// Non-empty path segments.
pub(crate) fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

/// First value of a query parameter.
pub(crate) fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Theme requested by the URL's `theme` query parameter, if recognised.
pub(crate) fn query_theme(url: &Url) -> Option<&'static str> {
    match query_value(url, "theme")?.to_ascii_lowercase().as_str() {
        "dark" => Some("dark"),
        "light" => Some("light"),
        _ => None,
    }
}
