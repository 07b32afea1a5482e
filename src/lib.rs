// Visual Studio 2010 item template installer
// Library entry point: installer host glue around the install/rollback/uninstall actions

pub mod installation;
pub mod models;
pub mod ui;
pub mod utils;

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::path::Path;

use installation::{InstallAction, InstallOutcome};
use models::config::InstallerConfig;
use models::context::{parse_parameters, InstallContext};
use models::state::InstallState;
use ui::{build_prompt, UiMode, UI_ENV_VAR};
use utils::path_resolver::{resolve_target_dir, TARGET_DIR_PARAM};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

const USAGE: &str = "Usage: item-template-installer <install|rollback|uninstall> [/TargetDir=<dir>] [--ui=native|console|silent] [--quiet]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Install,
    Rollback,
    Uninstall,
}

impl Lifecycle {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "install" => Some(Lifecycle::Install),
            "rollback" => Some(Lifecycle::Rollback),
            "uninstall" => Some(Lifecycle::Uninstall),
            _ => None,
        }
    }
}

/// Initialize logging: the custom action log in the payload folder, plus stdout unless quiet.
fn init_logging(log_file: &Path, with_stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(move |out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let line = utils::logging::render_record(
                        &timestamp_local.to_string(),
                        record.level(),
                        &message.to_string(),
                    );
                    out.finish(format_args!("{}", line));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch.chain(
        fern::Dispatch::new()
            .format(move |out, message, record| {
                let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                let line = utils::logging::render_record(
                    &timestamp_local.to_string(),
                    record.level(),
                    &message.to_string(),
                );
                out.finish(format_args!("{}", line));
            })
            .chain(fern::log_file(log_file)?),
    );

    dispatch.apply()?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log file: {:?}",
        log_file
    );
    Ok(())
}

/// Run one lifecycle operation against the persisted install state.
///
/// A failed install is rolled back with whatever state it had written, the way an
/// installer framework reacts to a failing custom action.
pub async fn execute(
    lifecycle: Lifecycle,
    action: &InstallAction,
    ctx: &InstallContext,
) -> Result<()> {
    let state_path = ctx.state_file(action.config());

    match lifecycle {
        Lifecycle::Install => {
            let mut state = InstallState::new();
            let result = match action.install(ctx, &mut state).await {
                Ok(outcome) => {
                    if outcome == InstallOutcome::ManualInstallRequired {
                        warn!("[PHASE: install] Templates were not installed automatically");
                    }
                    state
                        .save(&state_path)
                        .await
                        .context("Failed to persist install state")
                }
                Err(e) => Err(e),
            };

            // Without a persisted state a later rollback could not find the archive,
            // so undo here with the in-memory state.
            if let Err(e) = result {
                error!("[PHASE: install] Install failed; rolling back: {:#}", e);
                if let Err(rollback_err) = action.rollback(ctx, &state).await {
                    error!(
                        "[PHASE: rollback] Rollback after failed install also failed: {:#}",
                        rollback_err
                    );
                }
                if let Err(discard_err) = InstallState::discard(&state_path).await {
                    warn!(
                        "[PHASE: rollback] Could not remove state file: {}",
                        discard_err
                    );
                }
                return Err(e);
            }
            Ok(())
        }
        Lifecycle::Rollback | Lifecycle::Uninstall => {
            let state = InstallState::load(&state_path).await?;
            let outcome = if lifecycle == Lifecycle::Rollback {
                action.rollback(ctx, &state).await?
            } else {
                action.uninstall(ctx, &state).await?
            };
            info!("[PHASE: uninstall] Finished (outcome={:?})", outcome);
            InstallState::discard(&state_path).await?;
            Ok(())
        }
    }
}

/// Command-line host. Returns the process exit code.
pub fn run_cli(args: &[String]) -> i32 {
    let Some(lifecycle) = args
        .iter()
        .find(|a| !a.starts_with('-') && !a.starts_with('/'))
        .and_then(|a| Lifecycle::parse(a))
    else {
        eprintln!("{}", USAGE);
        return EXIT_USAGE;
    };
    let quiet = args.iter().any(|a| a == "--quiet" || a == "-q");

    let parameters = parse_parameters(args);
    let target_dir = resolve_target_dir(
        parameters
            .get(&TARGET_DIR_PARAM.to_ascii_lowercase())
            .map(String::as_str),
    );
    let config = match InstallerConfig::load_from_dir(&target_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Item template installer: {:#}", e);
            return EXIT_FAILURE;
        }
    };
    let ctx = InstallContext::new(parameters, &config);

    if let Err(e) = init_logging(ctx.log_file(), !quiet) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let env_ui = std::env::var(UI_ENV_VAR).ok();
    let mode = UiMode::select(ctx.parameter("ui"), env_ui.as_deref());
    info!(
        "[PHASE: initialization] Running {:?} (target_dir={:?}, ui={:?})",
        lifecycle,
        ctx.target_dir(),
        mode
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("[PHASE: initialization] Failed to start runtime: {}", e);
            return EXIT_FAILURE;
        }
    };

    let prompt = build_prompt(mode, &config);
    let action = InstallAction::with_system_defaults(config, prompt);

    match runtime.block_on(execute(lifecycle, &action, &ctx)) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("[PHASE: {:?}] Failed: {:#}", lifecycle, e);
            eprintln!("Item template installer failed: {:#}", e);
            EXIT_FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use installation::{DevenvRunner, RegistryLocator};
    use std::io::Cursor;
    use std::path::PathBuf;
    use ui::{ConsolePrompt, SilentPrompt, UserPrompt};

    struct Layout {
        _root: tempfile::TempDir,
        payload: PathBuf,
        ide: PathBuf,
    }

    fn layout() -> Layout {
        let root = tempfile::tempdir().expect("tempdir");
        let payload = root.path().join("payload");
        let ide = root.path().join("IDE");
        std::fs::create_dir_all(&payload).expect("payload");
        std::fs::create_dir_all(ide.join("ItemTemplates/CSharp/Code/1033")).expect("ide");
        std::fs::write(payload.join("ObservablePropertyItemTemplate.zip"), b"zip").expect("zip");
        std::fs::write(ide.join("msenv.dll"), b"dll").expect("dll");
        Layout {
            _root: root,
            payload,
            ide,
        }
    }

    fn test_config() -> InstallerConfig {
        InstallerConfig {
            registration_exe: "no-such-devenv-for-tests".to_string(),
            ..InstallerConfig::default()
        }
    }

    /// Registry lookup always misses off Windows, so these use the real locator.
    fn action_with_prompt(prompt: Box<dyn UserPrompt>) -> InstallAction {
        let config = test_config();
        let locator = Box::new(RegistryLocator::for_bitness(&config, true));
        let runner = Box::new(DevenvRunner::new(&config));
        InstallAction::new(config, locator, runner, prompt)
    }

    fn ctx_for(payload: &Path) -> InstallContext {
        InstallContext::from_args(
            [format!("/TargetDir={}", payload.display())],
            &test_config(),
        )
    }

    #[test]
    fn lifecycle_names() {
        assert_eq!(Lifecycle::parse("Install"), Some(Lifecycle::Install));
        assert_eq!(Lifecycle::parse("rollback"), Some(Lifecycle::Rollback));
        assert_eq!(Lifecycle::parse("UNINSTALL"), Some(Lifecycle::Uninstall));
        assert_eq!(Lifecycle::parse("commit"), None);
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        assert_eq!(run_cli(&["/TargetDir=/tmp".to_string()]), EXIT_USAGE);
        assert_eq!(run_cli(&["explode".to_string()]), EXIT_USAGE);
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn manual_install_then_uninstall_through_saved_state() {
        let l = layout();
        let ctx = ctx_for(&l.payload);
        let input = Cursor::new(format!("{}\n", l.ide.join("msenv.dll").display()).into_bytes());
        let action = action_with_prompt(Box::new(ConsolePrompt::with_input(&test_config(), input)));
        let state_path = ctx.state_file(action.config());
        let archive = action.config().template_destination(&l.ide);

        execute(Lifecycle::Install, &action, &ctx).await.expect("install");

        assert!(archive.is_file());
        let saved = InstallState::load(&state_path).await.expect("state");
        assert!(saved.install_succeeded());
        assert_eq!(saved.saved_install_dir(), Some(l.ide.clone()));

        let uninstaller = action_with_prompt(Box::new(SilentPrompt));
        execute(Lifecycle::Uninstall, &uninstaller, &ctx)
            .await
            .expect("uninstall");

        assert!(!archive.exists());
        assert!(!state_path.exists());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn unattended_install_still_records_success() {
        let l = layout();
        let ctx = ctx_for(&l.payload);
        let action = action_with_prompt(Box::new(SilentPrompt));
        let state_path = ctx.state_file(action.config());

        execute(Lifecycle::Install, &action, &ctx).await.expect("install");

        let saved = InstallState::load(&state_path).await.expect("state");
        assert!(saved.install_succeeded());
        assert_eq!(saved.saved_install_dir(), None);

        execute(Lifecycle::Rollback, &action, &ctx)
            .await
            .expect("rollback");
        assert!(!state_path.exists());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn failed_install_leaves_no_state_behind() {
        let l = layout();
        std::fs::remove_dir_all(l.ide.join("ItemTemplates")).expect("remove");
        let ctx = ctx_for(&l.payload);
        let input = Cursor::new(format!("{}\n", l.ide.join("msenv.dll").display()).into_bytes());
        let action = action_with_prompt(Box::new(ConsolePrompt::with_input(&test_config(), input)));
        let state_path = ctx.state_file(action.config());

        let result = execute(Lifecycle::Install, &action, &ctx).await;

        assert!(result.is_err());
        assert!(!state_path.exists());
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn unwritable_state_file_rolls_back_the_copy() {
        let l = layout();
        let ctx = ctx_for(&l.payload);
        let input = Cursor::new(format!("{}\n", l.ide.join("msenv.dll").display()).into_bytes());
        let action = action_with_prompt(Box::new(ConsolePrompt::with_input(&test_config(), input)));
        let state_path = ctx.state_file(action.config());
        let archive = action.config().template_destination(&l.ide);
        // A directory where the state file belongs makes the save fail.
        std::fs::create_dir_all(&state_path).expect("blocker");

        let result = execute(Lifecycle::Install, &action, &ctx).await;

        assert!(result.is_err());
        assert!(!archive.exists(), "archive must not outlive a failed install");
    }

    // The only test that installs the global logger.
    #[test]
    fn log_file_is_appended_with_custom_action_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_file = dir.path().join("ItemTemplateInstaller.log");
        std::fs::write(&log_file, "earlier run\n").expect("seed log");

        init_logging(&log_file, false).expect("init logging");
        log::info!("[PHASE: install] [STEP: copy] log file check line");
        log::logger().flush();

        let contents = std::fs::read_to_string(&log_file).expect("read log");
        assert!(contents.starts_with("earlier run\n"), "{}", contents);
        assert!(
            contents.lines().any(|l| l.ends_with(
                "Installer Custom Action: [PHASE: install] [STEP: copy] log file check line"
            ) && l.contains("[INFO]")),
            "{}",
            contents
        );
    }

    #[tokio::test]
    async fn uninstall_without_state_file_is_a_no_op() {
        let l = layout();
        let archive = test_config().template_destination(&l.ide);
        std::fs::write(&archive, b"untouched").expect("archive");
        let ctx = ctx_for(&l.payload);
        let action = action_with_prompt(Box::new(SilentPrompt));

        execute(Lifecycle::Uninstall, &action, &ctx)
            .await
            .expect("uninstall");

        assert!(archive.is_file());
    }
}
