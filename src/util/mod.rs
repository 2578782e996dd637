//! Shared utilities
//!
//! Buffer management, permits and stream verification.

pub mod buffer;
pub mod permit;
pub mod verification;
