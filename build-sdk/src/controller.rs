//! The build controller.
//!
//! [`BuildController`] owns at most one in-flight build process. Starting a
//! new run while one is active cancels the old run first, so output from two
//! runs never interleaves in a sink.

use std::path::Path;
use std::pin::Pin;

use encoding_rs::Encoding;
use futures::Stream;
use tokio::task::JoinHandle;

use crate::internal::ProcessSession;
use crate::sink::{Sink, spawn_sink_writer};
use crate::types::{BuildEvent, BuildOutcome, Error, Result};

/// Runs build commands one at a time and streams their output.
///
/// ```no_run
/// use dm_build_sdk::{BufferSink, BuildController};
///
/// # async fn run() -> dm_build_sdk::Result<()> {
/// let sink = BufferSink::new();
/// let mut controller = BuildController::new();
/// controller.start(
///     vec!["echo".into(), "hello".into()],
///     ".",
///     Box::new(sink.clone()),
/// )?;
/// let outcome = controller.wait().await;
/// println!("{}{:?}", sink.text(), outcome);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BuildController {
    encoding: &'static Encoding,
    session: Option<ProcessSession>,
    writer: Option<JoinHandle<Option<BuildOutcome>>>,
}

impl BuildController {
    /// A controller that decodes process output as UTF-8.
    pub fn new() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
            session: None,
            writer: None,
        }
    }

    /// A controller for a named output encoding, e.g. `"windows-1252"`.
    pub fn with_encoding_label(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| Error::Settings(format!("unknown encoding label: {label}")))?;
        Ok(Self {
            encoding,
            session: None,
            writer: None,
        })
    }

    /// Start a run whose output is appended to `sink`.
    ///
    /// Cancels the active run first, if any. The sink keeps receiving chunks
    /// from a background task; await [`Self::wait`] to observe completion.
    pub fn start(
        &mut self,
        argv: Vec<String>,
        cwd: impl AsRef<Path>,
        sink: Box<dyn Sink>,
    ) -> Result<()> {
        if self.session.is_some() {
            self.kill()?;
        }
        let (session, events) = ProcessSession::launch(&argv, cwd.as_ref(), self.encoding)?;
        self.writer = Some(spawn_sink_writer(events, sink));
        self.session = Some(session);
        Ok(())
    }

    /// Start a run and take its events as a stream instead of a sink.
    ///
    /// The stream yields output chunks in order and ends after the
    /// completion marker, or right after a decode diagnostic.
    pub fn start_with_events(
        &mut self,
        argv: Vec<String>,
        cwd: impl AsRef<Path>,
    ) -> Result<Pin<Box<dyn Stream<Item = BuildEvent> + Send>>> {
        if self.session.is_some() {
            self.kill()?;
        }
        let (session, mut events) = ProcessSession::launch(&argv, cwd.as_ref(), self.encoding)?;
        self.session = Some(session);
        self.writer = None;
        Ok(Box::pin(async_stream::stream! {
            while let Some(event) = events.recv().await {
                yield event;
            }
        }))
    }

    /// Cancel the active run and release its session.
    ///
    /// Safe to call at any time; without an active session it does nothing.
    /// The cancelled run still delivers its closing chunk to its sink.
    pub fn kill(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            session.kill()?;
        }
        Ok(())
    }

    /// True from a successful start until [`Self::kill`] or the next start.
    ///
    /// Not a liveness probe: a run that exited on its own still counts as
    /// active until the caller releases it.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Take the handle that resolves when the current sink run completes.
    ///
    /// Returns `None` after the handle was already taken, or for runs
    /// started with [`Self::start_with_events`].
    pub fn writer_handle(&mut self) -> Option<JoinHandle<Option<BuildOutcome>>> {
        self.writer.take()
    }

    /// Wait for the current sink run to finish delivering output.
    ///
    /// `None` when there is nothing to wait for or the run ended without a
    /// completion marker.
    pub async fn wait(&mut self) -> Option<BuildOutcome> {
        match self.writer_handle() {
            Some(handle) => handle.await.unwrap_or(None),
            None => None,
        }
    }
}

impl Default for BuildController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BuildController {
    fn drop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.is_running() {
                eprintln!(
                    "Warning: BuildController dropped while session {} is still running",
                    session.id()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_controller_is_idle() {
        let controller = BuildController::new();
        assert!(!controller.is_active());
    }

    #[test]
    fn test_known_encoding_label_is_accepted() {
        assert!(BuildController::with_encoding_label("windows-1252").is_ok());
        assert!(BuildController::with_encoding_label("utf-8").is_ok());
    }

    #[test]
    fn test_unknown_encoding_label_is_rejected() {
        let err = BuildController::with_encoding_label("klingon-8").unwrap_err();
        assert!(err.to_string().contains("klingon-8"));
    }

    #[tokio::test]
    async fn test_kill_without_session_is_a_noop() {
        let mut controller = BuildController::new();
        assert!(controller.kill().is_ok());
        assert_eq!(controller.wait().await, None);
    }
}
