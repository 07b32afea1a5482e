// Installation logic
//
// Install, rollback and uninstall of the item template archive. The OS-facing pieces
// (registry, devenv, dialogs) sit behind the `DirectoryLocator`, `CommandRunner` and
// `UserPrompt` traits; everything here is platform independent.
//
// Failure policy: an IDE that cannot be found degrades to a "install manually" notice.
// Only copy/delete failures are returned to the caller.

pub mod files;
pub mod locator;
pub mod registration;

#[cfg(windows)]
pub mod windows;

use crate::models::config::InstallerConfig;
use crate::models::context::InstallContext;
use crate::models::state::InstallState;
use crate::ui::{Notice, UserPrompt};
use crate::utils::path_resolver::containing_dir;

use anyhow::Result;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use locator::{DirectoryLocator, RegistryLocator};
pub use registration::{CommandRunner, DevenvRunner};

/// Where the IDE directory came from during install.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallSource {
    Registry,
    ManualSelection,
}

/// Where the IDE directory came from during rollback/uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalSource {
    Registry,
    SavedState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { dir: PathBuf, source: InstallSource },
    ManualInstallRequired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Install never completed; nothing to reverse.
    NotInstalled,
    /// Neither the registry nor the saved state named a directory.
    DirectoryUnresolved,
    Removed { dir: PathBuf, source: RemovalSource },
}

pub struct InstallAction {
    config: InstallerConfig,
    locator: Box<dyn DirectoryLocator>,
    runner: Box<dyn CommandRunner>,
    prompt: Box<dyn UserPrompt>,
}

impl InstallAction {
    pub fn new(
        config: InstallerConfig,
        locator: Box<dyn DirectoryLocator>,
        runner: Box<dyn CommandRunner>,
        prompt: Box<dyn UserPrompt>,
    ) -> Self {
        Self {
            config,
            locator,
            runner,
            prompt,
        }
    }

    /// Registry lookup plus devenv registration, with the given prompt.
    pub fn with_system_defaults(config: InstallerConfig, prompt: Box<dyn UserPrompt>) -> Self {
        let locator = Box::new(RegistryLocator::new(&config));
        let runner = Box::new(DevenvRunner::new(&config));
        Self::new(config, locator, runner, prompt)
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    pub async fn install(
        &self,
        ctx: &InstallContext,
        state: &mut InstallState,
    ) -> Result<InstallOutcome> {
        let started = Instant::now();
        info!(
            "[PHASE: install] install entered (target_dir={:?})",
            ctx.target_dir()
        );
        info!("[PHASE: install] [STEP: locate] Locating Visual Studio 2010 install location...");

        let resolved = match self.locator.locate().await {
            Some(dir) => {
                info!(
                    "[PHASE: install] [STEP: locate] Visual Studio 2010 location is at {:?}",
                    dir
                );
                Some((dir, InstallSource::Registry))
            }
            None => {
                info!("[PHASE: install] [STEP: locate] Automatic locating failed...");
                self.prompt.notify(Notice::LocateManually).await;
                self.locate_manually().await.map(|dir| {
                    state.record_install_dir(&dir);
                    (dir, InstallSource::ManualSelection)
                })
            }
        };

        let outcome = match resolved {
            Some((dir, source)) => {
                info!("[PHASE: install] [STEP: copy] Copying templates...");
                files::copy_template(
                    &self.config.template_source(ctx.target_dir()),
                    &self.config.template_destination(&dir),
                )
                .await?;

                info!("[PHASE: install] [STEP: register] Registering templates with Visual Studio 2010...");
                self.runner.run_registration(&dir).await;
                info!("[PHASE: install] [STEP: register] Registration complete...");

                InstallOutcome::Installed { dir, source }
            }
            None => {
                warn!("[PHASE: install] Visual Studio 2010 installation directory not found.  Templates must be installed manually.");
                self.prompt.notify(Notice::ManualInstallRequired).await;
                InstallOutcome::ManualInstallRequired
            }
        };

        // Recorded even when nothing was copied, so uninstall always attempts cleanup.
        state.mark_install_succeeded();

        info!(
            "[PHASE: install] install exit (outcome={:?}, duration_ms={})",
            outcome,
            started.elapsed().as_millis()
        );
        Ok(outcome)
    }

    pub async fn rollback(
        &self,
        ctx: &InstallContext,
        state: &InstallState,
    ) -> Result<RemovalOutcome> {
        info!(
            "[PHASE: rollback] rollback entered (target_dir={:?})",
            ctx.target_dir()
        );
        self.reverse(state).await
    }

    pub async fn uninstall(
        &self,
        ctx: &InstallContext,
        state: &InstallState,
    ) -> Result<RemovalOutcome> {
        info!(
            "[PHASE: uninstall] uninstall entered (target_dir={:?})",
            ctx.target_dir()
        );
        self.reverse(state).await
    }

    /// Keep showing the picker until a real sentinel file is chosen or the user cancels.
    async fn locate_manually(&self) -> Option<PathBuf> {
        loop {
            let picked = self.prompt.pick_sentinel_file().await?;
            match self.accept_pick(&picked) {
                Some(dir) => {
                    info!(
                        "[PHASE: install] [STEP: locate] Using manually selected location {:?}",
                        dir
                    );
                    return Some(dir);
                }
                None => warn!(
                    "[PHASE: install] [STEP: locate] {:?} is not an existing {}; asking again",
                    picked, self.config.sentinel_file
                ),
            }
        }
    }

    /// The recorded directory must be absolute; uninstall may run from another cwd.
    fn accept_pick(&self, picked: &Path) -> Option<PathBuf> {
        let picked = std::path::absolute(picked).ok()?;
        if !picked.is_file() || !self.config.is_sentinel_name(&picked) {
            return None;
        }
        containing_dir(&picked)
    }

    async fn reverse(&self, state: &InstallState) -> Result<RemovalOutcome> {
        if !state.install_succeeded() {
            info!("[PHASE: uninstall] Install did not complete; nothing to reverse");
            return Ok(RemovalOutcome::NotInstalled);
        }

        let resolved = match self.locator.locate().await {
            Some(dir) => Some((dir, RemovalSource::Registry)),
            None => state
                .saved_install_dir()
                .map(|dir| (dir, RemovalSource::SavedState)),
        };

        let Some((dir, source)) = resolved else {
            info!("[PHASE: uninstall] [STEP: locate] Visual Studio 2010 directory not found; nothing to remove");
            return Ok(RemovalOutcome::DirectoryUnresolved);
        };

        info!(
            "[PHASE: uninstall] [STEP: delete] Removing templates from {:?} (source={:?})",
            dir, source
        );
        files::remove_template(&self.config.template_destination(&dir)).await?;
        self.runner.run_registration(&dir).await;

        Ok(RemovalOutcome::Removed { dir, source })
    }
}
