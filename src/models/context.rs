// Install context
//
// Carries the installer host's parameters and the resolved payload folder into each
// lifecycle operation.

use crate::models::config::InstallerConfig;
use crate::utils::path_resolver::{resolve_target_dir, TARGET_DIR_PARAM};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Keys are stored lowercased; lookups ignore case.
    parameters: BTreeMap<String, String>,
    target_dir: PathBuf,
    log_file: PathBuf,
}

impl InstallContext {
    pub fn new(parameters: BTreeMap<String, String>, config: &InstallerConfig) -> Self {
        let parameters: BTreeMap<String, String> = parameters
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        let target_dir = resolve_target_dir(
            parameters
                .get(&TARGET_DIR_PARAM.to_ascii_lowercase())
                .map(String::as_str),
        );
        let log_file = target_dir.join(&config.log_file_name);
        Self {
            parameters,
            target_dir,
            log_file,
        }
    }

    /// Build a context from `/Key=Value`, `-Key=Value` or `--Key=Value` arguments.
    /// Arguments without `=` are not parameters and are skipped.
    pub fn from_args<I, S>(args: I, config: &InstallerConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(parse_parameters(args), config)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn state_file(&self, config: &InstallerConfig) -> PathBuf {
        self.target_dir.join(&config.state_file_name)
    }
}

pub fn parse_parameters<I, S>(args: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = BTreeMap::new();
    for arg in args {
        let arg = arg.as_ref();
        let stripped = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .or_else(|| arg.strip_prefix('/'));
        let Some(body) = stripped else {
            continue;
        };
        let Some((key, value)) = body.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        out.insert(
            key.to_ascii_lowercase(),
            value.trim().trim_matches('"').to_string(),
        );
    }
    out
}
