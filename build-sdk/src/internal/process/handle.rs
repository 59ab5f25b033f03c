//! Process handle for the spawned build command.

use tokio::process::Child;

use crate::types::{Error, Result};

/// Handle for managing a spawned build process.
///
/// Owns the `Child` and exposes lifecycle control without leaking it.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    pub fn new(child: Child) -> Self {
        Self { child }
    }

    /// OS process id, if the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Check if the process has exited without blocking.
    pub fn try_wait(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|e| Error::Kill(format!("failed to check process status: {}", e)))
    }

    /// Terminate the process and all of its descendants.
    ///
    /// The immediate handle may be a wrapper around the real target, so
    /// terminating it alone is not enough: on Windows `taskkill /T` takes the
    /// whole tree; on Unix the child is its own process-group leader and the
    /// group gets SIGTERM, falling back to a direct kill if the group signal
    /// fails.
    pub fn terminate_tree(&mut self) -> Result<()> {
        let Some(pid) = self.child.id() else {
            // Already reaped; nothing left to signal.
            return Ok(());
        };
        self.terminate_tree_impl(pid)
    }

    #[cfg(unix)]
    fn terminate_tree_impl(&mut self, pid: u32) -> Result<()> {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            tracing::warn!("process group signal failed ({}), killing pid {} directly", e, pid);
            self.child
                .start_kill()
                .map_err(|err| Error::Kill(format!("failed to kill process {}: {}", pid, err)))?;
        }
        Ok(())
    }

    #[cfg(windows)]
    fn terminate_tree_impl(&mut self, pid: u32) -> Result<()> {
        use std::os::windows::process::CommandExt;

        std::process::Command::new("taskkill")
            .args(["/T", "/F", "/PID", &pid.to_string()])
            .creation_flags(super::CREATE_NO_WINDOW)
            .spawn()
            .map(|_| ())
            .map_err(|e| Error::Kill(format!("taskkill failed for pid {}: {}", pid, e)))
    }
}
