//! # Scribe SDK
//!
//! Host wiring for the `scribe` binary.

pub mod commands;

pub use commands::{create_package_command_executor, create_package_inventory};
