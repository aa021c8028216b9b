//! Channel layer for line framing over the child's byte streams.
//!
//! This module handles the newline-delimited protocol framing,
//! turning arbitrary pipe chunks into whole response lines.

mod buffer;

pub use buffer::LineBuffer;
