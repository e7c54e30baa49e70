//! Runtime side of refs: what the renderer reports after each pass

pub mod binding;
pub mod component;

pub use binding::{LiveRefBinding, Mutation, Refs, RenderedNode, RuntimeError};
pub use component::ComponentRefs;
