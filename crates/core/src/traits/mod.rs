//! Core traits for Pagebrief.
//!
//! Traits are organized by the collaborator they describe:
//! - `store`: the persistent summary cache (SummaryCache)
//! - `llm`: the generative summarization backend (SummaryBackend)
//! - `source`: freshness lookup for sources without their own timestamp (FreshnessResolver)

pub mod llm;
pub mod source;
pub mod store;

pub use llm::*;
pub use source::*;
pub use store::*;
