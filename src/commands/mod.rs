//! Command implementations for the deskforge CLI

pub mod completions;
pub mod phases;
pub mod provision;
pub mod verify;
