//! Type definitions for the build engine.

pub mod error;
pub mod events;

// Re-export commonly used types
pub use error::{Error, Result};
pub use events::{BuildEvent, BuildOutcome};
