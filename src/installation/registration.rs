//! Template registration with the IDE (`devenv.exe /installvstemplates`).
//!
//! The command's output is not captured and its exit code does not decide anything.
//! Failing to start it at all is logged and otherwise ignored.

use crate::models::config::InstallerConfig;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the registration command for the IDE in `install_dir` and wait for it.
    async fn run_registration(&self, install_dir: &Path);
}

#[derive(Debug, Clone)]
pub struct DevenvRunner {
    exe_name: String,
    flag: String,
}

impl DevenvRunner {
    pub fn new(config: &InstallerConfig) -> Self {
        Self {
            exe_name: config.registration_exe.clone(),
            flag: config.registration_flag.clone(),
        }
    }

    /// The IDE folder normally holds the executable; otherwise let `PATH` find it.
    pub fn resolve_program(&self, install_dir: &Path) -> PathBuf {
        let candidate = install_dir.join(&self.exe_name);
        if candidate.is_file() {
            candidate
        } else {
            PathBuf::from(&self.exe_name)
        }
    }
}

#[async_trait]
impl CommandRunner for DevenvRunner {
    async fn run_registration(&self, install_dir: &Path) {
        let started = Instant::now();
        let program = self.resolve_program(install_dir);
        debug!(
            "[PHASE: register] [STEP: cmd] run_registration entered (program={:?}, flag={})",
            program, self.flag
        );

        let mut cmd = Command::new(&program);
        cmd.arg(&self.flag)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "[PHASE: register] [STEP: cmd] Failed to start {:?}; skipping registration: {}",
                    program, e
                );
                return;
            }
        };

        match child.wait().await {
            Ok(status) => info!(
                "[PHASE: register] [STEP: cmd] {:?} exited (exit_code={:?}, duration_ms={})",
                program,
                status.code(),
                started.elapsed().as_millis()
            ),
            Err(e) => warn!(
                "[PHASE: register] [STEP: cmd] Waiting for {:?} failed: {}",
                program, e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(exe: &str, flag: &str) -> DevenvRunner {
        let cfg = InstallerConfig {
            registration_exe: exe.to_string(),
            registration_flag: flag.to_string(),
            ..InstallerConfig::default()
        };
        DevenvRunner::new(&cfg)
    }

    #[test]
    fn program_prefers_ide_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let r = runner("devenv.exe", "/installvstemplates");

        assert_eq!(r.resolve_program(dir.path()), PathBuf::from("devenv.exe"));

        std::fs::write(dir.path().join("devenv.exe"), b"").expect("write");
        assert_eq!(
            r.resolve_program(dir.path()),
            dir.path().join("devenv.exe")
        );
    }

    #[tokio::test]
    async fn missing_executable_is_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let r = runner("definitely-not-a-real-devenv-binary", "/installvstemplates");
        // Must return without panicking.
        r.run_registration(dir.path()).await;
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn waits_for_command_to_exit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let marker = dir.path().join("ran");
        let script = dir.path().join("register.sh");
        std::fs::write(
            &script,
            format!("sleep 0.2\necho registered > \"{}\"\n", marker.display()),
        )
        .expect("write script");

        // `sh <script>` stands in for `devenv.exe /installvstemplates`.
        let r = runner("sh", &script.to_string_lossy());
        r.run_registration(dir.path()).await;

        let written = std::fs::read_to_string(&marker).expect("command should have finished");
        assert_eq!(written.trim(), "registered");
    }
}
