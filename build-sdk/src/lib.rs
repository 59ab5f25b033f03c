//! Build and launch engine for DreamMaker projects.
//!
//! This crate compiles a project's `.dme` environment with the BYOND
//! compiler, or hands the compiled `.dmb` binary to DreamSeeker or
//! DreamDaemon, and streams the child's decoded output into an append-only
//! [`Sink`] as it happens. One controller runs one process at a time;
//! starting a new run cancels the previous one, and cancellation takes the
//! whole process tree down.
//!
//! # Quick start
//!
//! ```no_run
//! use dm_build_sdk::{
//!     BufferSink, BuildController, LaunchMode, SettingsResolver, prepare_command,
//! };
//!
//! #[tokio::main]
//! async fn main() -> dm_build_sdk::Result<()> {
//!     let settings = SettingsResolver::load(None)?;
//!     let prepared = prepare_command(&settings, ".".as_ref(), LaunchMode::None)?;
//!
//!     let sink = BufferSink::new();
//!     let mut controller = BuildController::new();
//!     controller.start(prepared.argv, ".", Box::new(sink.clone()))?;
//!
//!     if let Some(outcome) = controller.wait().await {
//!         println!("killed: {}, took {:.1}s", outcome.killed, outcome.elapsed_secs);
//!     }
//!     print!("{}", sink.text());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`controller`] - the run-one-process-at-a-time facade
//! - [`command`] - settings plus a project directory into a command line
//! - [`settings`] - two-tier `dm_`-prefixed settings
//! - [`locate`] - finding `.dme`/`.dmb` files under a project tree
//! - [`sink`] - append-only output consumers
//! - [`types`] - events, outcomes and the crate error type

pub mod command;
pub mod controller;
pub mod internal;
pub mod locate;
pub mod settings;
pub mod sink;
pub mod types;

pub use command::{LaunchMode, PreparedCommand, prepare_command};
pub use controller::BuildController;
pub use locate::find_build_file;
pub use settings::{SettingsResolver, default_settings};
pub use sink::{BufferSink, Sink};
pub use types::{BuildEvent, BuildOutcome, Error, Result};
