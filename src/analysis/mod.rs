//! Analysis and result aggregation modules
//!
//! Combines all feature extraction results into the final analysis:
//! - Result types
//! - Metadata
//! - Chord chart serialization

pub mod metadata;
pub mod report;
pub mod result;
