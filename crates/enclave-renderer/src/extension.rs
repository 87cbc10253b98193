use std::sync::Arc;

use enclave_config::EnclaveConfig;

use crate::ast::Kind;
use crate::dispatch::EnclaveRenderer;
use crate::markdown::{Extension, Markdown};
use crate::provider::ProviderRegistry;
use crate::transform::EnclaveTransformer;

/// Installs the enclave transformer and the enclave node renderer.
///
/// Both share one provider registry and a copy of the configuration taken
/// at construction.
pub struct EnclaveExtension {
    config: EnclaveConfig,
    registry: Arc<ProviderRegistry>,
}

impl EnclaveExtension {
    #[must_use]
    pub fn new(config: EnclaveConfig, registry: impl Into<Arc<ProviderRegistry>>) -> Self {
        Self {
            config,
            registry: registry.into(),
        }
    }
}

impl Extension for EnclaveExtension {
    fn extend(self, md: &mut Markdown) {
        md.add_transformer(EnclaveTransformer::new(
            self.config.clone(),
            Arc::clone(&self.registry),
        ));
        md.register_node_renderer(Kind::Enclave, EnclaveRenderer::new(self.config, self.registry));
    }
}
