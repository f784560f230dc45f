//! Summary pipeline controller for Pagebrief.
//!
//! This crate provides the retrying summarization orchestrator and the
//! cache-aware pipeline that decides between serving and recomputing.

pub mod builder;
pub mod orchestrator;
pub mod pipeline;

pub use builder::PipelineBuilder;
pub use orchestrator::{RetryPolicy, SummarizationOrchestrator};
pub use pipeline::PipelineController;
