//! Embed-aware markdown pipeline.
//!
//! This crate parses markdown into an arena [`Document`] tree, rewrites image
//! references that point at known embed providers into Enclave nodes, and
//! renders the tree to HTML with pluggable per-kind [`NodeRenderer`]s.
//!
//! # Architecture
//!
//! - [`ProviderRegistry`]: ordered [`EmbedProvider`] handlers, each classifying
//!   URLs and building markup for one [`Provider`]
//! - [`EnclaveTransformer`]: post-parse pass replacing matched images in place
//! - [`EnclaveRenderer`]: render hook wrapping provider markup, with a uniform
//!   error placeholder when a builder fails
//! - [`EnclaveExtension`]: installs both into a [`Markdown`] pipeline
//! - [`KbdExtension`]: lets `<kbd>` tags through the raw HTML escaping
//!
//! Concrete provider handlers live in the `enclave-objects` crate.
//!
//! # Example
//!
//! ```
//! use enclave_config::EnclaveConfig;
//! use enclave_renderer::{EnclaveExtension, Markdown, ProviderRegistry};
//!
//! let md = Markdown::new().with_extension(EnclaveExtension::new(
//!     EnclaveConfig::default(),
//!     ProviderRegistry::new(),
//! ));
//! let html = md.convert("![logo](https://example.com/logo.png)");
//! assert_eq!(html, r#"<p><img src="https://example.com/logo.png" alt="logo"></p>"#);
//! ```

mod ast;
mod dispatch;
mod enclave;
mod extension;
mod html;
mod kbd;
mod markdown;
mod parse;
mod provider;
mod transform;

pub use ast::{Children, Descendants, Document, Kind, NodeId, NodeKind};
pub use dispatch::{
    EnclaveRenderer, regular_image_html, wrap_enclave_error_html, wrap_enclave_html,
};
pub use enclave::{Enclave, Provider, WrapPolicy};
pub use extension::EnclaveExtension;
pub use html::{HtmlRenderer, NodeRenderer, WalkStatus, escape_html};
pub use kbd::{KbdExtension, KbdRenderer};
pub use markdown::{AstTransformer, Extension, Markdown};
pub use parse::parse_document;
pub use provider::{
    Classification, DEFAULT_THEME, EmbedMatch, EmbedProvider, ProviderError, ProviderRegistry,
};
pub use transform::EnclaveTransformer;
