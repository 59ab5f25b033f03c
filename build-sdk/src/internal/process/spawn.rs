//! Spawning the build command with piped output.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use super::{ChildOutput, CombinedStream, ProcessHandle};
use crate::types::{Error, Result};

/// Spawn `argv` in `cwd` and return the lifecycle handle plus the combined
/// stdout/stderr stream.
///
/// The argument vector is passed through unmodified; callers resolve
/// executable paths. stdin is closed so the child never blocks waiting for
/// input.
pub fn spawn_child(argv: &[String], cwd: &Path) -> Result<(ProcessHandle, ChildOutput)> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::Spawn("empty command line".to_string()))?;
    debug!("starting build command: {:?}", argv);

    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command.current_dir(cwd);

    // Own process group, so cancellation can signal the whole tree.
    #[cfg(unix)]
    command.process_group(0);

    // Hide the console window on Windows.
    #[cfg(windows)]
    command.creation_flags(super::CREATE_NO_WINDOW);

    let mut child = command
        .spawn()
        .map_err(|e| Error::Spawn(format!("failed to start {}: {}", program, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Spawn("stdout not available".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::Spawn("stderr not available".to_string()))?;

    Ok((ProcessHandle::new(child), CombinedStream::new(stdout, stderr)))
}
