use super::{Notice, UserPrompt};
use crate::models::config::InstallerConfig;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Terminal stand-in for the modal dialogs. An empty line or end of input cancels.
pub struct ConsolePrompt<R> {
    title: String,
    sentinel_file: String,
    input: Mutex<R>,
}

impl ConsolePrompt<BufReader<Stdin>> {
    pub fn stdin(config: &InstallerConfig) -> Self {
        Self::with_input(config, BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsolePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn with_input(config: &InstallerConfig, input: R) -> Self {
        Self {
            title: config.dialog_title.clone(),
            sentinel_file: config.sentinel_file.clone(),
            input: Mutex::new(input),
        }
    }

    async fn read_line(&self) -> Option<String> {
        let mut input = self.input.lock().await;
        let mut line = String::new();
        match input.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim().trim_matches('"').to_string()),
            Err(e) => {
                log::warn!("[PHASE: ui] [STEP: pick] Failed to read console input: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl<R> UserPrompt for ConsolePrompt<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn notify(&self, notice: Notice) {
        eprintln!("{}: {}", self.title, notice.text());
    }

    async fn pick_sentinel_file(&self) -> Option<PathBuf> {
        eprintln!(
            "Please locate the {} file manually (path, empty to cancel):",
            self.sentinel_file
        );
        self.read_line()
            .await
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_one_path_per_pick_then_cancels() {
        let cfg = InstallerConfig::default();
        let prompt = ConsolePrompt::with_input(
            &cfg,
            BufReader::new(&b"C:\\VS\\IDE\\msenv.dll\n\"/vs/msenv.dll\"\n\n"[..]),
        );

        assert_eq!(
            prompt.pick_sentinel_file().await,
            Some(PathBuf::from("C:\\VS\\IDE\\msenv.dll"))
        );
        assert_eq!(
            prompt.pick_sentinel_file().await,
            Some(PathBuf::from("/vs/msenv.dll"))
        );
        assert_eq!(prompt.pick_sentinel_file().await, None);
        // End of input also cancels.
        assert_eq!(prompt.pick_sentinel_file().await, None);
    }
}
