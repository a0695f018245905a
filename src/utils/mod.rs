//! Shared utility functions.
//!
//! - UTF-8 safe string truncation for prompt rendering and terminal output

mod string;

pub use string::{truncate_chars, truncate_with_marker};
