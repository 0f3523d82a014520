//! Parametric 2D Drafting Engine
//!
//! This crate provides:
//! - Typed, grouped properties with defaults and Reference Links
//! - Drawing features (line, circle, rectangle, polygon, text, dimension)
//! - A document that tracks the dependency graph between features
//! - Recompute scheduling in dependency order with cycle and failure isolation
//! - Geometry helpers and printf-style number formatting

pub mod config;
pub mod document;
pub mod feature;
pub mod property;
pub mod shape;

// Re-exports for convenience
pub use config::EngineConfig;
pub use document::{
    Document, DocumentError, DocumentResult, RecomputeReport, SharedDocument,
    create_shared_document,
};
pub use feature::{
    Feature, FeatureKind, FeatureStatus, RecomputeError, RecomputeResult, ReferenceResolver,
};
pub use property::{LinkSub, Property, PropertyBag, PropertyError, PropertyType, PropertyValue};
pub use shape::{FormatError, ShapeError, format_value};
