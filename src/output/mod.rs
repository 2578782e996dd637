//! Output formatting
//!
//! The repeat-section writer for the data stream, plus human-readable and JSON
//! reports of what a run produced.

pub mod json;
pub mod repeat;
pub mod text;
