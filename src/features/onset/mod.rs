//! Onset detection modules
//!
//! Produces the onset strength envelope that drives tempo estimation, beat
//! tracking and meter inference.

pub mod strength;

pub use strength::onset_strength;
