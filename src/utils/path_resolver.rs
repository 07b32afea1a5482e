use log::debug;
use std::path::{Path, PathBuf};

/// Host parameter naming the folder that holds the installer payload.
pub const TARGET_DIR_PARAM: &str = "TargetDir";

/// Resolve the folder containing the files to install.
///
/// Prefers the `TargetDir` value handed over by the installer host; otherwise falls back
/// to the folder the running executable lives in.
pub fn resolve_target_dir(target_dir_param: Option<&str>) -> PathBuf {
    if let Some(dir) = target_dir_param.map(str::trim).filter(|d| !d.is_empty()) {
        debug!(
            "[PHASE: initialization] [STEP: target_dir] Using host-supplied TargetDir={}",
            dir
        );
        return PathBuf::from(dir);
    }

    let dir = resolve_deployment_folder();
    debug!(
        "[PHASE: initialization] [STEP: target_dir] TargetDir not supplied; using {:?}",
        dir
    );
    dir
}

/// Resolve deployment folder (absolute path)
pub fn resolve_deployment_folder() -> PathBuf {
    // Prefer the folder where the EXE is running from
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return dir.to_path_buf();
        }
    }

    // Fallback: current working directory
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Parent directory of a picked file, if it has one.
pub fn containing_dir(file: &Path) -> Option<PathBuf> {
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_parameter_wins() {
        assert_eq!(
            resolve_target_dir(Some("/payload/dir")),
            PathBuf::from("/payload/dir")
        );
    }

    #[test]
    fn blank_parameter_falls_back_to_exe_folder() {
        let expected = resolve_deployment_folder();
        assert_eq!(resolve_target_dir(Some("  ")), expected);
        assert_eq!(resolve_target_dir(None), expected);
    }

    #[test]
    fn containing_dir_of_bare_name_is_none() {
        assert_eq!(containing_dir(Path::new("msenv.dll")), None);
        assert_eq!(
            containing_dir(Path::new("/vs/IDE/msenv.dll")),
            Some(PathBuf::from("/vs/IDE"))
        );
    }
}
