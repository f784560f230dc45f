//! Core type definitions for Pagebrief.
//!
//! Broken down into submodules for better maintainability.

pub mod entry;
pub mod freshness;
pub mod request;

pub use entry::*;
pub use freshness::*;
pub use request::*;
