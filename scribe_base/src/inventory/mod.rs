//! # Package Inventory
//!
//! Installed software lookup used by package sources. The command backed
//! inventory queries `rpm` first and falls back to `dpkg-query`; the static
//! inventory serves embedders that already hold a package list.

pub mod command_executor;

pub use command_executor::{CommandError, CommandExecutor, CommandOutput};

use crate::log_debug;
use std::collections::HashMap;

/// Package inventory errors
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Package command failed: {0}")]
    Command(#[from] CommandError),

    #[error("No supported package manager found (tried {tried})")]
    NoPackageManager { tried: String },
}

/// Lookup of installed package versions
pub trait PackageInventory: Send + Sync {
    /// Installed versions of `name`, empty when the package is not installed
    fn installed_versions(&self, name: &str) -> Result<Vec<String>, InventoryError>;

    fn inventory_id(&self) -> &str;
}

/// In-memory package list
#[derive(Debug, Clone, Default)]
pub struct StaticPackageInventory {
    packages: HashMap<String, Vec<String>>,
}

impl StaticPackageInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.insert(name, version);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.packages
            .entry(name.into())
            .or_default()
            .push(version.into());
    }
}

impl PackageInventory for StaticPackageInventory {
    fn installed_versions(&self, name: &str) -> Result<Vec<String>, InventoryError> {
        Ok(self.packages.get(name).cloned().unwrap_or_default())
    }

    fn inventory_id(&self) -> &str {
        "static"
    }
}

/// Inventory backed by the host package manager
#[derive(Debug, Clone)]
pub struct CommandPackageInventory {
    executor: CommandExecutor,
}

impl CommandPackageInventory {
    /// The executor must whitelist `rpm` and/or `dpkg-query`
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    fn query_rpm(&self, name: &str) -> Result<Vec<String>, CommandError> {
        let output = self.executor.execute(
            "rpm",
            &["-q", "--queryformat", "%{VERSION}-%{RELEASE}\\n", name],
            None,
        )?;
        // rpm exits non-zero with "package X is not installed"
        if !output.success() {
            return Ok(Vec::new());
        }
        Ok(output.lines().map(str::to_string).collect())
    }

    fn query_dpkg(&self, name: &str) -> Result<Vec<String>, CommandError> {
        let output = self.executor.execute(
            "dpkg-query",
            &["-W", "-f=${Status}\\t${Version}\\n", name],
            None,
        )?;
        if !output.success() {
            return Ok(Vec::new());
        }
        Ok(parse_dpkg_status(&output.stdout))
    }
}

impl PackageInventory for CommandPackageInventory {
    fn installed_versions(&self, name: &str) -> Result<Vec<String>, InventoryError> {
        match self.query_rpm(name) {
            Ok(versions) => return Ok(versions),
            Err(CommandError::ProgramNotFound { .. } | CommandError::SecurityViolation { .. }) => {
                log_debug!("rpm unavailable, trying dpkg-query", "package" => name);
            }
            Err(e) => return Err(e.into()),
        }

        match self.query_dpkg(name) {
            Ok(versions) => Ok(versions),
            Err(CommandError::ProgramNotFound { .. } | CommandError::SecurityViolation { .. }) => {
                Err(InventoryError::NoPackageManager {
                    tried: "rpm, dpkg-query".to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn inventory_id(&self) -> &str {
        "command"
    }
}

/// Versions from `${Status}\t${Version}` lines whose status is installed
fn parse_dpkg_status(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter(|(status, version)| status.ends_with(" installed") && !version.is_empty())
        .map(|(_, version)| version.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_static_inventory() {
        let inventory = StaticPackageInventory::new()
            .with_package("openssl", "3.0.7-1")
            .with_package("openssl", "1.1.1k-9");

        assert_eq!(
            inventory.installed_versions("openssl").unwrap(),
            vec!["3.0.7-1", "1.1.1k-9"]
        );
        assert!(inventory.installed_versions("absent").unwrap().is_empty());
        assert_eq!(inventory.inventory_id(), "static");
    }

    #[test]
    fn test_parse_dpkg_status() {
        let stdout = "install ok installed\t1.2.3-1\ndeinstall ok config-files\t1.0\n";
        assert_eq!(parse_dpkg_status(stdout), vec!["1.2.3-1"]);
    }

    #[test]
    fn test_command_inventory_without_whitelist() {
        let inventory = CommandPackageInventory::new(CommandExecutor::new());
        assert_matches!(
            inventory.installed_versions("openssl"),
            Err(InventoryError::NoPackageManager { .. })
        );
        assert_eq!(inventory.inventory_id(), "command");
    }
}
