//! Event types delivered on a session's output channel.

use serde::{Deserialize, Serialize};

/// One entry on a session's ordered event channel.
///
/// `Output` carries decoded, normalized text, including the bracketed
/// termination footer. `Done` follows the footer exactly once when the
/// stream ends. A decode failure closes the channel after a diagnostic
/// `Output` without a `Done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildEvent {
    Output { text: String },
    Done { killed: bool, elapsed_secs: f64 },
}

/// Final state of a session whose stream ended normally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub killed: bool,
    pub elapsed_secs: f64,
}
