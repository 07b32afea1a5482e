// Installer configuration
//
// Defaults are the fixed values the Visual Studio 2010 template package ships with.
// An optional `ItemTemplateInstaller.toml` beside the payload may override any of them.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "ItemTemplateInstaller.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Template archive shipped alongside the installer payload.
    pub archive_name: String,
    /// Path components below the IDE directory that receive the archive.
    pub template_subfolder: Vec<String>,
    pub registry_key_32: String,
    pub registry_key_64: String,
    pub registry_value: String,
    pub registration_exe: String,
    pub registration_flag: String,
    /// File the user is asked to locate when the registry lookup fails.
    pub sentinel_file: String,
    pub log_file_name: String,
    pub state_file_name: String,
    pub dialog_title: String,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            archive_name: "ObservablePropertyItemTemplate.zip".to_string(),
            template_subfolder: ["ItemTemplates", "CSharp", "Code", "1033"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            registry_key_32: r"SOFTWARE\Microsoft\VisualStudio\10.0".to_string(),
            registry_key_64: r"SOFTWARE\Wow6432Node\Microsoft\VisualStudio\10.0".to_string(),
            registry_value: "InstallDir".to_string(),
            registration_exe: "devenv.exe".to_string(),
            registration_flag: "/installvstemplates".to_string(),
            sentinel_file: "msenv.dll".to_string(),
            log_file_name: "ItemTemplateInstaller.log".to_string(),
            state_file_name: "ItemTemplateInstaller.InstallState".to_string(),
            dialog_title: "CustomFileGenerators Item Templates Installation".to_string(),
        }
    }
}

impl InstallerConfig {
    /// Load overrides from `<dir>/ItemTemplateInstaller.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            debug!(
                "[PHASE: initialization] [STEP: config] No config override at {:?}; using defaults",
                path
            );
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!(
            "[PHASE: initialization] [STEP: config] Loaded config overrides from {:?}",
            path
        );
        Ok(cfg)
    }

    /// Location of the archive inside the IDE directory.
    pub fn template_destination(&self, install_dir: &Path) -> PathBuf {
        let mut dst = install_dir.to_path_buf();
        for part in &self.template_subfolder {
            dst.push(part);
        }
        dst.push(&self.archive_name);
        dst
    }

    pub fn template_source(&self, target_dir: &Path) -> PathBuf {
        target_dir.join(&self.archive_name)
    }

    pub fn registry_key(&self, is_64bit_os: bool) -> &str {
        if is_64bit_os {
            &self.registry_key_64
        } else {
            &self.registry_key_32
        }
    }

    /// A picked file qualifies when its name matches the sentinel, ignoring case.
    pub fn is_sentinel_name(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.eq_ignore_ascii_case(&self.sentinel_file))
            .unwrap_or(false)
    }
}
