//! Shared helpers

pub mod fs;
pub mod search_path;
