//! Text utilities.
//!
//! Mapping tables speak byte offsets; the LSP surface speaks UTF-16
//! line/character positions. This module converts between the two.

pub mod position;

pub use position::{
    LineIndex, compute_line_starts, convert_byte_to_utf16_in_line, convert_utf16_to_byte_in_line,
};
