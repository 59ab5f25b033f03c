//! Process plumbing behind the controller: spawning, decoding, the reader
//! loop and session state. Exposed for integration tests and advanced
//! embedding; most callers only need [`crate::controller`].

pub mod decoder;
pub mod process;
pub mod reader;
pub mod report;
pub mod session;

pub use session::ProcessSession;
