//! One live build process and its cancellation state.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use encoding_rs::Encoding;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use super::decoder::StreamDecoder;
use super::process::{ProcessHandle, spawn_child};
use super::reader::spawn_reader;
use crate::types::{BuildEvent, Result};

/// A spawned child process together with the flag the reader consults when
/// the output stream ends.
#[derive(Debug)]
pub struct ProcessSession {
    id: Uuid,
    handle: ProcessHandle,
    killed: Arc<AtomicBool>,
}

impl ProcessSession {
    /// Start the process and its reader task.
    ///
    /// The timestamp is taken before the spawn so the reported duration
    /// covers process startup. Must be called from within a Tokio runtime.
    pub fn launch(
        argv: &[String],
        cwd: &Path,
        encoding: &'static Encoding,
    ) -> Result<(Self, mpsc::Receiver<BuildEvent>)> {
        let started_at = Instant::now();
        let (handle, output) = spawn_child(argv, cwd)?;
        let killed = Arc::new(AtomicBool::new(false));
        let events = spawn_reader(
            output,
            StreamDecoder::new(encoding),
            Arc::clone(&killed),
            started_at,
        );
        let id = Uuid::new_v4();
        info!(session = %id, pid = ?handle.id(), "build process started");
        Ok((Self { id, handle, killed }, events))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mark the session cancelled and take down the process tree.
    ///
    /// Only the first call acts; the flag never flips back, so the reader
    /// reports a cancelled run even when the kill races a natural exit.
    pub fn kill(&mut self) -> Result<()> {
        if self.killed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(session = %self.id, "terminating build process tree");
        self.handle.terminate_tree()
    }

    /// Whether the operating system still reports the child as running.
    pub fn is_running(&mut self) -> bool {
        matches!(self.handle.try_wait(), Ok(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_streams_output_and_footer() {
        let (_session, mut events) = ProcessSession::launch(
            &argv(&["echo", "ready"]),
            Path::new("."),
            UTF_8,
        )
        .unwrap();

        let mut text = String::new();
        let mut done = None;
        while let Some(event) = events.recv().await {
            match event {
                BuildEvent::Output { text: chunk } => text.push_str(&chunk),
                BuildEvent::Done { killed, .. } => done = Some(killed),
            }
        }
        assert!(text.starts_with("ready\n"));
        assert!(text.contains("[Finished in "));
        assert_eq!(done, Some(false));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_kill_yields_cancelled_footer() {
        let (mut session, mut events) = ProcessSession::launch(
            &argv(&["sleep", "30"]),
            Path::new("."),
            UTF_8,
        )
        .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        session.kill().unwrap();
        session.kill().unwrap();

        let mut text = String::new();
        let mut done = None;
        while let Some(event) = events.recv().await {
            match event {
                BuildEvent::Output { text: chunk } => text.push_str(&chunk),
                BuildEvent::Done { killed, .. } => done = Some(killed),
            }
        }
        assert_eq!(text, "\n[Cancelled]");
        assert_eq!(done, Some(true));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_is_running_reflects_process_state() {
        let (mut session, mut events) = ProcessSession::launch(
            &argv(&["sleep", "30"]),
            Path::new("."),
            UTF_8,
        )
        .unwrap();
        assert!(session.is_running());

        session.kill().unwrap();
        while events.recv().await.is_some() {}
        // The reader saw the stream close, so the process is gone or a
        // zombie about to be reaped.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!session.is_running());
    }
}
