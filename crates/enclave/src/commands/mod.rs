//! CLI command implementations.

pub(crate) mod classify;
pub(crate) mod render;

pub(crate) use classify::ClassifyArgs;
pub(crate) use render::RenderArgs;
