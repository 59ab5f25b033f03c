//! Output sinks.
//!
//! A [`Sink`] receives decoded output chunks in emission order. The engine
//! only ever appends; rendering, truncation and styling are the sink's
//! business.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::{BuildEvent, BuildOutcome};

/// Append-only consumer of decoded build output.
#[async_trait]
pub trait Sink: Send {
    /// Append one chunk after everything appended before it.
    async fn append(&mut self, text: &str);
}

/// In-memory sink that records every chunk. Handy for tests and for callers
/// that post-process a whole run.
#[derive(Clone, Default)]
pub struct BufferSink {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks in append order.
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// All chunks joined into one string.
    pub fn text(&self) -> String {
        self.chunks.lock().map(|c| c.concat()).unwrap_or_default()
    }
}

#[async_trait]
impl Sink for BufferSink {
    async fn append(&mut self, text: &str) {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push(text.to_string());
        }
    }
}

/// Drain a session's event channel into a sink.
///
/// Resolves with the run's outcome once the channel closes, or `None` when
/// the stream ended without a completion marker (decode failure).
pub(crate) fn spawn_sink_writer(
    mut events: mpsc::Receiver<BuildEvent>,
    mut sink: Box<dyn Sink>,
) -> JoinHandle<Option<BuildOutcome>> {
    tokio::spawn(async move {
        let mut outcome = None;
        while let Some(event) = events.recv().await {
            match event {
                BuildEvent::Output { text } => sink.append(&text).await,
                BuildEvent::Done {
                    killed,
                    elapsed_secs,
                } => {
                    debug!(killed, elapsed_secs, "build run completed");
                    outcome = Some(BuildOutcome {
                        killed,
                        elapsed_secs,
                    });
                }
            }
        }
        outcome
    })
}
