//! Conflux Core — registries, prefixing, and shared error types.
//!
//! This crate provides the foundational pieces used across all Conflux
//! crates. It has no internal Conflux dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`registry`]: Insertion-ordered keyed registry with duplicate policy
//! - [`prefix`]: Pure namespace-prefixing strategy for composed servers

pub mod error;
pub mod prefix;
pub mod registry;

mod proptests;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use prefix::{KeyFormat, ResourcePrefixFormat};
pub use registry::{DuplicateBehavior, Registry};
