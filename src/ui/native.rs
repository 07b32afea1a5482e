use super::{Notice, UserPrompt};
use crate::models::config::InstallerConfig;
use async_trait::async_trait;
use rfd::{AsyncFileDialog, AsyncMessageDialog, MessageButtons, MessageLevel};
use std::path::PathBuf;

/// Windows message boxes and the common open-file dialog.
pub struct NativePrompt {
    title: String,
    sentinel_file: String,
}

impl NativePrompt {
    pub fn new(config: &InstallerConfig) -> Self {
        Self {
            title: config.dialog_title.clone(),
            sentinel_file: config.sentinel_file.clone(),
        }
    }

    fn sentinel_extension(&self) -> &str {
        self.sentinel_file
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or("*")
    }
}

#[async_trait]
impl UserPrompt for NativePrompt {
    async fn notify(&self, notice: Notice) {
        let _ = AsyncMessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title(self.title.as_str())
            .set_description(notice.text())
            .set_buttons(MessageButtons::Ok)
            .show()
            .await;
    }

    async fn pick_sentinel_file(&self) -> Option<PathBuf> {
        AsyncFileDialog::new()
            .set_title(format!("Please locate the {} file manually.", self.sentinel_file))
            .add_filter(self.sentinel_file.as_str(), &[self.sentinel_extension()])
            .pick_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}
