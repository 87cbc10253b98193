//! Image-to-enclave tree rewrite.

use std::sync::Arc;

use enclave_config::EnclaveConfig;
use url::Url;

use crate::ast::{Document, Kind, NodeId, NodeKind};
use crate::enclave::Enclave;
use crate::markdown::AstTransformer;
use crate::provider::{Classification, ProviderRegistry};

/// Replaces classified image nodes with Enclave nodes.
///
/// The walk is pre-order over the whole document, so images nested in
/// links, emphasis, tables or list items are found as well. Each
/// replacement takes the exact position of the image it replaces.
pub struct EnclaveTransformer {
    config: EnclaveConfig,
    registry: Arc<ProviderRegistry>,
}

impl EnclaveTransformer {
    #[must_use]
    pub fn new(config: EnclaveConfig, registry: Arc<ProviderRegistry>) -> Self {
        Self { config, registry }
    }

    /// Build the replacement payload for an image, if any.
    fn resolve(&self, url: &str, title: &str, alt: String) -> Option<Enclave> {
        // Relative references cannot name an embed.
        let url = Url::parse(url).ok()?;
        match self.registry.classify(&url, &self.config) {
            Classification::Matched(matched) => Some(Enclave::from_match(
                url,
                alt,
                title,
                matched,
                self.config.iframe_disabled,
            )),
            Classification::NotMatched if self.config.demote_unmatched_images => {
                Some(Enclave::regular_image(url, alt, title))
            }
            Classification::NotMatched => None,
        }
    }

    fn replace_image(&self, doc: &mut Document, image: NodeId) -> Option<NodeId> {
        let NodeKind::Image { url, title } = doc.kind(image) else {
            return None;
        };
        let enclave = self.resolve(url, title, doc.text_content(image))?;

        tracing::debug!(
            provider = %enclave.provider,
            object_id = %enclave.object_id,
            "Replacing image with enclave"
        );

        let node = doc.create_node(NodeKind::Enclave(Box::new(enclave)));
        doc.replace(image, node);
        doc.move_children(image, node);
        Some(node)
    }
}

impl AstTransformer for EnclaveTransformer {
    fn transform(&self, doc: &mut Document) {
        let root = doc.root();
        let mut replaced = 0usize;
        let mut cursor = doc.first_child(root);

        while let Some(id) = cursor {
            let descend = match doc.kind(id).kind() {
                Kind::Image => {
                    if let Some(node) = self.replace_image(doc, id) {
                        replaced += 1;
                        cursor = doc.next_in_preorder(node, root, false);
                        continue;
                    }
                    // Alt text never holds another image.
                    false
                }
                _ => true,
            };
            cursor = doc.next_in_preorder(id, root, descend);
        }

        tracing::debug!(replaced, "Enclave transform complete");
    }
}
