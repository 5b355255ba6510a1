//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math value types (vectors, colors, quaternions, angles, rectangles)
//! - Logging utilities

pub mod math;
pub mod logging;
