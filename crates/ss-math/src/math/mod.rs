//! Core math modules.

pub mod aggregate;
pub mod efficiency;
pub mod expectation;
pub mod grid;
pub mod significance;
