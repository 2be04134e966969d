//! Audio preprocessing modules
//!
//! This module contains utilities for preparing audio for analysis:
//! - Normalization (peak, RMS)
//! - Sample-rate conversion
//! - Channel mixing (multi-channel to mono)

pub mod channel_mixer;
pub mod normalization;
pub mod resample;
