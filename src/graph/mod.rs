//! Graph integration for voices.
//!
//! A [`WaveVoice`](crate::WaveVoice) implements [`node::GraphNode`], so it can
//! sit anywhere a block-rendering node with note events is expected.

/// Core traits shared by all graph nodes.
pub mod node;

pub use node::{GraphNode, RenderCtx};
