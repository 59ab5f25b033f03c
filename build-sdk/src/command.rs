//! Turning settings and a project directory into a runnable command line.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use which::which;

use crate::locate::find_build_file;
use crate::settings::SettingsResolver;
use crate::types::{Error, Result};

/// What to do with the project: compile it, or hand the compiled binary to
/// one of the two hosts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// Compile the project's source file.
    #[default]
    None,
    /// Run the compiled binary in the windowed client.
    Seeker,
    /// Run the compiled binary in the headless server.
    Daemon,
}

/// A ready-to-spawn command line, plus the notice to show before output
/// starts when the command launches a host.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCommand {
    pub argv: Vec<String>,
    pub notice: Option<String>,
}

/// Resolve executables and project files into a [`PreparedCommand`].
pub fn prepare_command(
    settings: &SettingsResolver,
    project_dir: &Path,
    launch: LaunchMode,
) -> Result<PreparedCommand> {
    match launch {
        LaunchMode::None => compile_command(settings, project_dir),
        LaunchMode::Seeker => launch_command(
            settings,
            project_dir,
            "seeker_executable",
            "[Running project in DreamSeeker...]",
        ),
        LaunchMode::Daemon => launch_command(
            settings,
            project_dir,
            "daemon_executable",
            "[Running project in DreamDaemon...]",
        ),
    }
}

fn compile_command(settings: &SettingsResolver, project_dir: &Path) -> Result<PreparedCommand> {
    let compiler = resolve_executable(settings, "compiler_executable")?;
    let source = locate(project_dir, ".dme")?;
    Ok(PreparedCommand {
        argv: vec![compiler, source],
        notice: None,
    })
}

fn launch_command(
    settings: &SettingsResolver,
    project_dir: &Path,
    executable_key: &str,
    notice: &str,
) -> Result<PreparedCommand> {
    let executable = resolve_executable(settings, executable_key)?;
    let binary = locate(project_dir, ".dmb")?;
    Ok(PreparedCommand {
        // Hosts are always started trusted so the project gets full
        // filesystem and shell access.
        argv: vec![executable, binary, "-trusted".to_string()],
        notice: Some(notice.to_string()),
    })
}

fn locate(project_dir: &Path, suffix: &str) -> Result<String> {
    find_build_file(project_dir, suffix)
        .map(|path| path.to_string_lossy().into_owned())
        .ok_or_else(|| Error::BuildFileNotFound {
            suffix: suffix.to_string(),
            dir: project_dir.display().to_string(),
        })
}

/// Resolve an executable setting into something spawnable.
///
/// With an installation path configured the two strings are joined verbatim,
/// trusting the configured trailing separator. Without one the executable
/// must be reachable on `PATH`.
fn resolve_executable(settings: &SettingsResolver, key: &str) -> Result<String> {
    let name = settings.require(key)?;
    match settings.get("installation_path") {
        Some(install) => Ok(format!("{install}{name}")),
        None => {
            let found = which(&name).map_err(|_| Error::ExecutableNotFound(name.clone()))?;
            debug!(executable = %name, path = %found.display(), "resolved executable on PATH");
            Ok(found.to_string_lossy().into_owned())
        }
    }
}
