//! Core types, traits, and error definitions for Pagebrief.
//!
//! This crate provides the foundational building blocks shared across all layers
//! of the summary pipeline: the cache key derivation, the cache entry model,
//! and the contracts for the cache store and the summarization backend.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{BackendError, Error, Result};
pub use fingerprint::fingerprint;
pub use traits::*;
pub use types::*;
