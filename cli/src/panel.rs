//! The terminal output panel.

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, Stdout};

use dm_build_sdk::Sink;

/// Sink that relays build output to stdout as it arrives.
pub struct PanelSink {
    stdout: Stdout,
}

impl PanelSink {
    pub fn new() -> Self {
        Self {
            stdout: tokio::io::stdout(),
        }
    }
}

impl Default for PanelSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for PanelSink {
    async fn append(&mut self, text: &str) {
        if self.stdout.write_all(text.as_bytes()).await.is_err() {
            return;
        }
        // Chunks rarely end on line boundaries, so flush every append.
        let _ = self.stdout.flush().await;
    }
}
