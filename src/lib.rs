//! Reference documentation generator for TypeScript declarations.
//!
//! Interfaces and type aliases tagged with `@docsCategory` are extracted from
//! source, cross-referenced by title, and rendered into a category-partitioned
//! tree of Hugo-flavoured Markdown documents.

pub mod config;
pub mod core;
pub mod error;

pub use crate::config::Config;
pub use crate::core::{Engine, GenerationReport, SharedTypeIndex, TypeReferenceIndex};
pub use crate::error::{DocgenError, Result};
