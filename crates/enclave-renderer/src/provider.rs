//! URL classification and provider dispatch.
//!
//! Each embed provider implements [`EmbedProvider`]: a pure, syntactic
//! [`classify`](EmbedProvider::classify) over an absolute URL and a
//! [`render`](EmbedProvider::render) that builds the provider markup for a
//! resolved [`Enclave`]. Handlers are collected in a [`ProviderRegistry`]
//! shared by the transformer (classification) and the dispatcher (rendering).
//!
//! # Example
//!
//! ```
//! use enclave_renderer::{Enclave, EmbedMatch, EmbedProvider, Provider, ProviderError};
//! use url::Url;
//!
//! struct Emoji;
//!
//! impl EmbedProvider for Emoji {
//!     fn provider(&self) -> Provider {
//!         Provider::TelegramEmoji
//!     }
//!
//!     fn classify(&self, url: &Url) -> Option<EmbedMatch> {
//!         let id = url.query_pairs().find(|(k, _)| k == "id")?.1;
//!         Some(EmbedMatch::new(Provider::TelegramEmoji, id))
//!     }
//!
//!     fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
//!         Ok(format!("<tg-emoji>{}</tg-emoji>", enclave.object_id))
//!     }
//! }
//! ```

use std::collections::HashMap;

use enclave_config::EnclaveConfig;
use url::Url;

use crate::enclave::{Enclave, Provider};

/// Theme used when a URL does not request one.
pub const DEFAULT_THEME: &str = "light";

/// Successful classification of a URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedMatch {
    pub provider: Provider,
    pub object_id: String,
    pub theme: String,
    pub params: HashMap<String, String>,
}

impl EmbedMatch {
    #[must_use]
    pub fn new(provider: Provider, object_id: impl Into<String>) -> Self {
        Self {
            provider,
            object_id: object_id.into(),
            theme: DEFAULT_THEME.to_owned(),
            params: HashMap::new(),
        }
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
}

/// Result of classifying an image URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    NotMatched,
    Matched(EmbedMatch),
}

impl Classification {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Consume the classification, yielding the match if any.
    #[must_use]
    pub fn into_match(self) -> Option<EmbedMatch> {
        match self {
            Self::Matched(m) => Some(m),
            Self::NotMatched => None,
        }
    }
}

/// Error produced while building provider markup.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No handler is registered for the provider.
    #[error("no handler registered for {0}")]
    Unregistered(Provider),
    /// The object id cannot be used by this provider.
    #[error("invalid {provider} object id: {object_id}")]
    InvalidObjectId {
        provider: Provider,
        object_id: String,
    },
    /// Remote metadata fetch failed.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// Markup could not be assembled.
    #[error("build failed: {0}")]
    Build(String),
}

/// Handler for one embed provider.
pub trait EmbedProvider: Send + Sync {
    /// Provider this handler serves.
    fn provider(&self) -> Provider;

    /// Recognise an absolute URL, extracting the object id and parameters.
    ///
    /// Must be side-effect-free and return `None` for anything it does not
    /// understand.
    fn classify(&self, url: &Url) -> Option<EmbedMatch>;

    /// Build provider markup for a resolved enclave.
    ///
    /// # Errors
    ///
    /// Returns an error when the markup cannot be produced; the dispatcher
    /// renders a placeholder instead.
    fn render(&self, enclave: &Enclave) -> Result<String, ProviderError>;
}

/// Ordered collection of provider handlers.
#[derive(Default)]
pub struct ProviderRegistry {
    handlers: Vec<Box<dyn EmbedProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler for the same provider.
    ///
    /// A replacement keeps the original classification position.
    pub fn register<P: EmbedProvider + 'static>(&mut self, handler: P) {
        let provider = handler.provider();
        if let Some(slot) = self.handlers.iter_mut().find(|h| h.provider() == provider) {
            *slot = Box::new(handler);
        } else {
            self.handlers.push(Box::new(handler));
        }
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with_provider<P: EmbedProvider + 'static>(mut self, handler: P) -> Self {
        self.register(handler);
        self
    }

    #[must_use]
    pub fn get(&self, provider: Provider) -> Option<&dyn EmbedProvider> {
        self.handlers
            .iter()
            .find(|h| h.provider() == provider)
            .map(|h| &**h)
    }

    /// Registered providers in classification order.
    pub fn providers(&self) -> impl Iterator<Item = Provider> + '_ {
        self.handlers.iter().map(|h| h.provider())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Classify a URL: first enabled handler to match wins.
    #[must_use]
    pub fn classify(&self, url: &Url, config: &EnclaveConfig) -> Classification {
        self.handlers
            .iter()
            .filter(|h| !h.provider().is_disabled(config))
            .find_map(|h| h.classify(url))
            .map_or(Classification::NotMatched, Classification::Matched)
    }

    /// Classify a raw URL string; relative or malformed URLs never match.
    #[must_use]
    pub fn classify_str(&self, url: &str, config: &EnclaveConfig) -> Classification {
        match Url::parse(url) {
            Ok(url) => self.classify(&url, config),
            Err(_) => Classification::NotMatched,
        }
    }

    /// Build markup through the handler registered for the enclave's provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unregistered`] when no handler exists, or the
    /// handler's own error.
    pub fn render(&self, enclave: &Enclave) -> Result<String, ProviderError> {
        self.get(enclave.provider)
            .ok_or(ProviderError::Unregistered(enclave.provider))?
            .render(enclave)
    }
}
