#![warn(missing_docs, clippy::unwrap_used)]
#![doc = include_str!("../README.md")]

/// Custom error type.
pub mod error;

/// Column state of the falling-glyph field.
pub mod field;

/// Glyph alphabet and fill styles.
pub mod glyphs;

/// Web utility functions.
mod utils;

/// The backdrop component.
mod backdrop;

// Re-export web_sys crate.
pub use web_sys;

pub use backdrop::{BackdropOptions, GlyphBackdrop, DEFAULT_CANVAS_ID};
pub use field::{ColumnField, GLYPH_SIZE};
pub use glyphs::{GlyphFill, ALPHABET};
