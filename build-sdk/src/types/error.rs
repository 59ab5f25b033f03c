//! Error types for the build engine.

use thiserror::Error;

/// Errors surfaced by the build engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Executable could not be resolved before spawning.
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    /// The child process could not be started.
    #[error("failed to start process: {0}")]
    Spawn(String),

    /// Output bytes were invalid in the configured encoding.
    ///
    /// The display form doubles as the diagnostic chunk written to the sink.
    #[error("Error decoding output using {encoding} - {detail}")]
    Decode { encoding: String, detail: String },

    /// No file with the wanted suffix exists under the project directory.
    #[error("no *{suffix} file found under {dir}")]
    BuildFileNotFound { suffix: String, dir: String },

    /// Missing or malformed configuration.
    #[error("settings error: {0}")]
    Settings(String),

    /// The process tree could not be terminated.
    #[error("failed to terminate process: {0}")]
    Kill(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
