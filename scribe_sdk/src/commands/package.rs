//! Package manager command executor configuration
//!
//! Provides a whitelisted command executor for package inventory queries.

use scribe_base::inventory::{CommandExecutor, CommandPackageInventory};
use std::time::Duration;

/// Create command executor restricted to package manager queries
///
/// Whitelist includes:
/// - rpm: RPM database queries
/// - dpkg-query: Debian package database queries
pub fn create_package_command_executor(timeout: Duration) -> CommandExecutor {
    let mut executor = CommandExecutor::with_timeout(timeout);

    executor.allow_commands(&[
        "rpm",        // RHEL, Fedora, SUSE
        "dpkg-query", // Debian, Ubuntu
    ]);

    executor
}

/// Package inventory backed by the host package manager
pub fn create_package_inventory(timeout: Duration) -> CommandPackageInventory {
    CommandPackageInventory::new(create_package_command_executor(timeout))
}
