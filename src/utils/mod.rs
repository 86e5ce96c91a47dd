//! Utility functions and helpers.

pub mod format;
