//! Locating the Visual Studio 2010 installation directory.

use crate::models::config::InstallerConfig;
use crate::utils::os_detection::is_64bit_os;
use async_trait::async_trait;
use log::{debug, info};
use std::path::PathBuf;

/// Source of the IDE installation directory.
#[async_trait]
pub trait DirectoryLocator: Send + Sync {
    /// `None` when no installation could be found.
    async fn locate(&self) -> Option<PathBuf>;
}

/// Reads `InstallDir` from the machine-wide Visual Studio 10.0 key.
#[derive(Debug, Clone)]
pub struct RegistryLocator {
    key_path: String,
    value_name: String,
}

impl RegistryLocator {
    pub fn new(config: &InstallerConfig) -> Self {
        Self::for_bitness(config, is_64bit_os())
    }

    pub fn for_bitness(config: &InstallerConfig, is_64bit_os: bool) -> Self {
        Self {
            key_path: config.registry_key(is_64bit_os).to_string(),
            value_name: config.registry_value.clone(),
        }
    }

    pub fn key_path(&self) -> &str {
        &self.key_path
    }
}

#[async_trait]
impl DirectoryLocator for RegistryLocator {
    async fn locate(&self) -> Option<PathBuf> {
        debug!(
            "[PHASE: locate] [STEP: registry] Reading HKLM\\{} value {}",
            self.key_path, self.value_name
        );

        let found = read_install_dir(&self.key_path, &self.value_name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        match &found {
            Some(dir) => info!("[PHASE: locate] [STEP: registry] Found {:?}", dir),
            None => info!(
                "[PHASE: locate] [STEP: registry] No {} value under HKLM\\{}",
                self.value_name, self.key_path
            ),
        }
        found
    }
}

#[cfg(windows)]
fn read_install_dir(key_path: &str, value_name: &str) -> Option<String> {
    crate::installation::windows::read_hklm_string(key_path, value_name)
}

#[cfg(not(windows))]
fn read_install_dir(_key_path: &str, _value_name: &str) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_path_selected_by_bitness() {
        let cfg = InstallerConfig::default();
        assert_eq!(
            RegistryLocator::for_bitness(&cfg, true).key_path(),
            r"SOFTWARE\Wow6432Node\Microsoft\VisualStudio\10.0"
        );
        assert_eq!(
            RegistryLocator::for_bitness(&cfg, false).key_path(),
            r"SOFTWARE\Microsoft\VisualStudio\10.0"
        );
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn no_registry_off_windows() {
        let locator = RegistryLocator::new(&InstallerConfig::default());
        assert_eq!(locator.locate().await, None);
    }
}
