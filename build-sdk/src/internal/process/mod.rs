//! Child process plumbing: spawning, lifecycle handle, combined output.

mod combined;
mod handle;
mod spawn;

pub use combined::{ChildOutput, CombinedStream};
pub use handle::ProcessHandle;
pub use spawn::spawn_child;

#[cfg(windows)]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;
