//! Shared location types for diagnostics

pub mod span;

pub use span::{Position, SourceMap, Span};
