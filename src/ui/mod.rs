// User prompts (modal notices + sentinel file picker)
//
// Install is the only operation that talks to the user. Uninstall and rollback never
// prompt.

mod console;
#[cfg(windows)]
mod native;

pub use console::ConsolePrompt;
#[cfg(windows)]
pub use native::NativePrompt;

use crate::models::config::InstallerConfig;
use async_trait::async_trait;
use std::path::PathBuf;

/// Environment variable selecting the prompt implementation.
pub const UI_ENV_VAR: &str = "ITEM_TEMPLATE_INSTALLER_UI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Registry lookup failed; the user is about to be asked for `msenv.dll`.
    LocateManually,
    /// Nothing was installed; the user must register the templates by hand.
    ManualInstallRequired,
}

impl Notice {
    pub fn text(&self) -> &'static str {
        match self {
            Notice::LocateManually => "The installer was unable to automatically locate your Visual Studio 2010 installation.  Please locate the msenv.dll file manually.",
            Notice::ManualInstallRequired => "The CustomFileGenerator item templates were not installed into Visual Studio 2010.  Perform an internet search on 'InstallVSTemplates' to install them manually.",
        }
    }
}

#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Show an informational notice and wait for acknowledgement.
    async fn notify(&self, notice: Notice);

    /// Ask for the sentinel file. `None` means the user cancelled.
    async fn pick_sentinel_file(&self) -> Option<PathBuf>;
}

/// Unattended installs: notices are only logged and the picker is always cancelled.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPrompt;

#[async_trait]
impl UserPrompt for SilentPrompt {
    async fn notify(&self, notice: Notice) {
        log::info!("[PHASE: ui] [STEP: notice] {}", notice.text());
    }

    async fn pick_sentinel_file(&self) -> Option<PathBuf> {
        log::info!("[PHASE: ui] [STEP: pick] Unattended mode; treating file selection as cancelled");
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Native,
    Console,
    Silent,
}

impl UiMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "native" | "gui" => Some(UiMode::Native),
            "console" | "tui" | "cli" => Some(UiMode::Console),
            "silent" | "none" | "quiet" => Some(UiMode::Silent),
            _ => None,
        }
    }

    pub fn platform_default() -> Self {
        if cfg!(windows) {
            UiMode::Native
        } else {
            UiMode::Console
        }
    }

    /// Command-line choice first, then the environment, then the platform default.
    pub fn select(cli: Option<&str>, env: Option<&str>) -> Self {
        cli.and_then(Self::parse)
            .or_else(|| env.and_then(Self::parse))
            .unwrap_or_else(Self::platform_default)
    }
}

pub fn build_prompt(mode: UiMode, config: &InstallerConfig) -> Box<dyn UserPrompt> {
    match mode {
        #[cfg(windows)]
        UiMode::Native => Box::new(NativePrompt::new(config)),
        #[cfg(not(windows))]
        UiMode::Native => {
            log::warn!("[PHASE: ui] Native dialogs are only available on Windows; using console prompts");
            Box::new(ConsolePrompt::stdin(config))
        }
        UiMode::Console => Box::new(ConsolePrompt::stdin(config)),
        UiMode::Silent => Box::new(SilentPrompt),
    }
}
