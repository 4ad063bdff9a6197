//! Annotation Module
//!
//! Data model for timestamped collaboration comments as delivered by
//! the upstream collaboration service.

mod models;

pub use models::{Annotation, AnnotationKind, Author, Priority};
