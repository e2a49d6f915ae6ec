//! Host command configuration for the package inventory

pub mod package;

pub use package::{create_package_command_executor, create_package_inventory};
