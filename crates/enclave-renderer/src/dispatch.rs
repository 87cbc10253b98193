//! Enclave node rendering.
//!
//! Provider markup is wrapped in uniform container markup:
//!
//! ```html
//! <div class="enclave-object-wrapper normal-wrapper">
//!   <div class="enclave-object twitter-enclave-object normal-object no-border">...</div>
//! </div>
//! ```
//!
//! When a builder fails or returns nothing, a styled error placeholder takes
//! its place. Rendering never aborts.

use std::sync::Arc;

use enclave_config::EnclaveConfig;

use crate::ast::{Document, NodeId, NodeKind};
use crate::enclave::{Enclave, WrapPolicy};
use crate::html::{NodeRenderer, WalkStatus, escape_html};
use crate::provider::ProviderRegistry;

/// Wrap provider markup in the enclave container.
///
/// The outer class is `normal-wrapper` for normal-sized objects and
/// `auto-resize` otherwise. The inner class gains `normal-object` for
/// normal-sized objects and `no-border` unless `has_border` is set.
#[must_use]
pub fn wrap_enclave_html(name: &str, html: &str, is_normal: bool, has_border: bool) -> String {
    let wrapper_class = if is_normal {
        "normal-wrapper"
    } else {
        "auto-resize"
    };
    let mut object_class = format!("enclave-object {name}-enclave-object");
    if is_normal {
        object_class.push_str(" normal-object");
    }
    if !has_border {
        object_class.push_str(" no-border");
    }
    format!(
        r#"<div class="enclave-object-wrapper {wrapper_class}"><div class="{object_class}">{html}</div></div>"#
    )
}

/// Error placeholder for an embed that could not be built.
#[must_use]
pub fn wrap_enclave_error_html(name: &str, object_id: &str) -> String {
    format!(
        r#"<div class="enclave-object-wrapper normal-wrapper"><div class="enclave-object {name}-enclave-object error">Failed to load {name} from {}</div></div>"#,
        escape_html(object_id)
    )
}

/// Plain `<img>` for a regular image enclave.
#[must_use]
pub fn regular_image_html(enclave: &Enclave, alt_prefix: &str) -> String {
    format!(
        r#"<img src="{}" alt="{}" />"#,
        escape_html(enclave.url.as_str()),
        escape_html(&enclave.fallback_alt(alt_prefix))
    )
}

/// [`NodeRenderer`] for [`Kind::Enclave`](crate::Kind::Enclave) nodes.
pub struct EnclaveRenderer {
    config: EnclaveConfig,
    registry: Arc<ProviderRegistry>,
}

impl EnclaveRenderer {
    #[must_use]
    pub fn new(config: EnclaveConfig, registry: Arc<ProviderRegistry>) -> Self {
        Self { config, registry }
    }

    /// Produce the final markup for one enclave.
    #[must_use]
    pub fn render_enclave(&self, enclave: &Enclave) -> String {
        let name = enclave.provider.class_name();

        let (is_normal, has_border) = match enclave.provider.wrap_policy() {
            WrapPolicy::Bare => {
                return regular_image_html(enclave, &self.config.default_image_alt_prefix);
            }
            WrapPolicy::Unwrapped => (None, false),
            WrapPolicy::Wrapped {
                is_normal,
                has_border,
            } => (Some(is_normal), has_border),
        };

        let html = match self.registry.render(enclave) {
            Ok(html) if !html.is_empty() => html,
            Ok(_) => {
                tracing::warn!(
                    provider = %enclave.provider,
                    object_id = %enclave.object_id,
                    "Embed builder returned empty markup"
                );
                return wrap_enclave_error_html(name, &enclave.object_id);
            }
            Err(e) => {
                tracing::warn!(
                    provider = %enclave.provider,
                    object_id = %enclave.object_id,
                    error = %e,
                    "Embed builder failed"
                );
                return wrap_enclave_error_html(name, &enclave.object_id);
            }
        };

        match is_normal {
            Some(is_normal) => wrap_enclave_html(name, &html, is_normal, has_border),
            None => html,
        }
    }
}

impl NodeRenderer for EnclaveRenderer {
    fn render(
        &self,
        out: &mut String,
        doc: &mut Document,
        node: NodeId,
        entering: bool,
    ) -> WalkStatus {
        if entering {
            doc.remove_children(node);
            return WalkStatus::Continue;
        }
        if let NodeKind::Enclave(enclave) = doc.kind(node) {
            out.push_str(&self.render_enclave(enclave));
        }
        WalkStatus::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enclave::Provider;
    use crate::provider::{EmbedMatch, EmbedProvider, ProviderError};
    use pretty_assertions::assert_eq;
    use url::Url;

    /// Handler returning a fixed result for one provider.
    struct Fixed {
        provider: Provider,
        result: Result<&'static str, &'static str>,
    }

    impl EmbedProvider for Fixed {
        fn provider(&self) -> Provider {
            self.provider
        }

        fn classify(&self, _url: &Url) -> Option<EmbedMatch> {
            None
        }

        fn render(&self, _enclave: &Enclave) -> Result<String, ProviderError> {
            self.result
                .map(ToOwned::to_owned)
                .map_err(|e| ProviderError::Fetch(e.to_owned()))
        }
    }

    fn renderer(handlers: Vec<Fixed>) -> EnclaveRenderer {
        let mut registry = ProviderRegistry::new();
        for handler in handlers {
            registry.register(handler);
        }
        EnclaveRenderer::new(EnclaveConfig::default(), Arc::new(registry))
    }

    fn enclave(provider: Provider, object_id: &str) -> Enclave {
        Enclave::new(
            Url::parse("https://example.com/embed").unwrap(),
            provider,
            object_id,
        )
    }

    #[test]
    fn test_wrap_normal_borderless() {
        assert_eq!(
            wrap_enclave_html("twitter", "<p>t</p>", true, false),
            r#"<div class="enclave-object-wrapper normal-wrapper"><div class="enclave-object twitter-enclave-object normal-object no-border"><p>t</p></div></div>"#
        );
    }

    #[test]
    fn test_wrap_auto_resize() {
        assert_eq!(
            wrap_enclave_html("youtube", "<iframe></iframe>", false, false),
            r#"<div class="enclave-object-wrapper auto-resize"><div class="enclave-object youtube-enclave-object no-border"><iframe></iframe></div></div>"#
        );
    }

    #[test]
    fn test_wrap_with_border() {
        assert_eq!(
            wrap_enclave_html("x", "", false, true),
            r#"<div class="enclave-object-wrapper auto-resize"><div class="enclave-object x-enclave-object"></div></div>"#
        );
    }

    #[test]
    fn test_error_html() {
        assert_eq!(
            wrap_enclave_error_html("twitter", "123"),
            r#"<div class="enclave-object-wrapper normal-wrapper"><div class="enclave-object twitter-enclave-object error">Failed to load twitter from 123</div></div>"#
        );
    }

    #[test]
    fn test_success_is_wrapped() {
        let r = renderer(vec![Fixed {
            provider: Provider::Twitter,
            result: Ok("<blockquote>tweet</blockquote>"),
        }]);
        let html = r.render_enclave(&enclave(Provider::Twitter, "42"));

        assert!(html.contains("enclave-object twitter-enclave-object"));
        assert!(html.contains("normal-wrapper"));
        assert!(html.contains("normal-object"));
        assert!(html.contains("no-border"));
        assert!(html.contains("<blockquote>tweet</blockquote>"));
        assert!(!html.contains("error"));
    }

    #[test]
    fn test_youtube_is_auto_resize() {
        let r = renderer(vec![Fixed {
            provider: Provider::YouTube,
            result: Ok("<iframe></iframe>"),
        }]);
        let html = r.render_enclave(&enclave(Provider::YouTube, "abc"));

        assert!(html.contains("auto-resize"));
        assert!(html.contains("no-border"));
        assert!(!html.contains("normal-object"));
    }

    #[test]
    fn test_builder_error_renders_placeholder() {
        let r = renderer(vec![Fixed {
            provider: Provider::Twitter,
            result: Err("boom"),
        }]);
        let html = r.render_enclave(&enclave(Provider::Twitter, "42"));

        assert!(html.contains("enclave-object twitter-enclave-object error"));
        assert!(html.contains("42"));
    }

    #[test]
    fn test_empty_output_renders_placeholder() {
        let r = renderer(vec![Fixed {
            provider: Provider::Spotify,
            result: Ok(""),
        }]);
        let html = r.render_enclave(&enclave(Provider::Spotify, "track/1"));
        assert_eq!(html, wrap_enclave_error_html("spotify", "track/1"));
    }

    #[test]
    fn test_whitespace_output_is_wrapped() {
        let r = renderer(vec![Fixed {
            provider: Provider::Spotify,
            result: Ok("  \n"),
        }]);
        let html = r.render_enclave(&enclave(Provider::Spotify, "track/1"));
        assert!(!html.contains("error"));
        assert!(html.ends_with("\">  \n</div></div>"));
    }

    #[test]
    fn test_unregistered_provider_renders_placeholder() {
        let html = renderer(vec![]).render_enclave(&enclave(Provider::Podbean, "x-pb"));
        assert!(html.contains("podbean-enclave-object error"));
    }

    #[test]
    fn test_unwrapped_providers_emit_raw_markup() {
        let r = renderer(vec![
            Fixed {
                provider: Provider::QuailAd,
                result: Ok("<div>ad</div>"),
            },
            Fixed {
                provider: Provider::QuailImage,
                result: Err("nope"),
            },
        ]);

        assert_eq!(
            r.render_enclave(&enclave(Provider::QuailAd, "7")),
            "<div>ad</div>"
        );
        assert_eq!(
            r.render_enclave(&enclave(Provider::QuailImage, "/a.png")),
            wrap_enclave_error_html("quail-image", "/a.png")
        );
    }

    #[test]
    fn test_regular_image_alt_fallbacks() {
        let r = renderer(vec![]);
        let url = Url::parse("https://example.com/pic.png").unwrap();

        assert_eq!(
            r.render_enclave(&Enclave::regular_image(url.clone(), "", "Foo")),
            r#"<img src="https://example.com/pic.png" alt="An image to describe Foo" />"#
        );
        assert_eq!(
            r.render_enclave(&Enclave::regular_image(url.clone(), "", "")),
            r#"<img src="https://example.com/pic.png" alt="An image to describe post" />"#
        );
        assert_eq!(
            r.render_enclave(&Enclave::regular_image(url, "A \"cat\"", "")),
            r#"<img src="https://example.com/pic.png" alt="A &quot;cat&quot;" />"#
        );
    }

    #[test]
    fn test_regular_image_uses_configured_prefix() {
        let config = EnclaveConfig {
            default_image_alt_prefix: "Picture of".to_owned(),
            ..EnclaveConfig::default()
        };
        let r = EnclaveRenderer::new(config, Arc::new(ProviderRegistry::new()));
        let enc = Enclave::regular_image(Url::parse("https://a.com/b.png").unwrap(), "", "Bar");
        assert!(r.render_enclave(&enc).contains(r#"alt="Picture of Bar""#));
    }

    #[test]
    fn test_error_placeholder_escapes_object_id() {
        let html = wrap_enclave_error_html("quail-image", "<script>");
        assert!(html.contains("from &lt;script&gt;"));
    }

    #[test]
    fn test_error_placeholder_escapes_ampersand_in_id() {
        let r = renderer(vec![Fixed {
            provider: Provider::Twitter,
            result: Err("boom"),
        }]);
        let html = r.render_enclave(&enclave(Provider::Twitter, "20&ref=x"));
        assert!(html.ends_with("Failed to load twitter from 20&amp;ref=x</div></div>"));
    }

    #[test]
    fn test_render_hook_clears_children() {
        let mut doc = Document::new();
        let root = doc.root();
        let para = doc.create_node(NodeKind::Paragraph);
        doc.append_child(root, para);
        let node = doc.create_node(NodeKind::Enclave(Box::new(enclave(
            Provider::QuailAd,
            "1",
        ))));
        doc.append_child(para, node);
        let alt = doc.create_node(NodeKind::Text("alt".to_owned()));
        doc.append_child(node, alt);

        let r = renderer(vec![Fixed {
            provider: Provider::QuailAd,
            result: Ok("<ad/>"),
        }]);
        let mut out = String::new();
        assert_eq!(r.render(&mut out, &mut doc, node, true), WalkStatus::Continue);
        assert_eq!(doc.first_child(node), None);
        assert_eq!(out, "");

        r.render(&mut out, &mut doc, node, false);
        assert_eq!(out, "<ad/>");
    }
}
