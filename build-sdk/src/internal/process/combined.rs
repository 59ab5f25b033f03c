//! Combined stdout/stderr stream for a child process.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::process::{ChildStderr, ChildStdout};

/// The merged output of a spawned build command.
pub type ChildOutput = CombinedStream<ChildStdout, ChildStderr>;

/// Merges two byte streams into one `AsyncRead`.
///
/// stdout is polled first; a side that reports end-of-stream is dropped and
/// never polled again. The combined stream ends once both sides have ended,
/// so a single reader loop serves everything the child writes.
pub struct CombinedStream<O, E> {
    stdout: Option<O>,
    stderr: Option<E>,
}

impl<O, E> CombinedStream<O, E> {
    pub fn new(stdout: O, stderr: E) -> Self {
        Self {
            stdout: Some(stdout),
            stderr: Some(stderr),
        }
    }
}

impl<O, E> AsyncRead for CombinedStream<O, E>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(stdout) = this.stdout.as_mut() {
            let filled = buf.filled().len();
            match Pin::new(stdout).poll_read(cx, buf) {
                Poll::Ready(Ok(())) if buf.filled().len() > filled => return Poll::Ready(Ok(())),
                Poll::Ready(Ok(())) => this.stdout = None,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => {}
            }
        }

        if let Some(stderr) = this.stderr.as_mut() {
            let filled = buf.filled().len();
            match Pin::new(stderr).poll_read(cx, buf) {
                Poll::Ready(Ok(())) if buf.filled().len() > filled => return Poll::Ready(Ok(())),
                Poll::Ready(Ok(())) => this.stderr = None,
                Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
                Poll::Pending => {}
            }
        }

        if this.stdout.is_none() && this.stderr.is_none() {
            // Both sides closed: end of the combined stream.
            return Poll::Ready(Ok(()));
        }
        Poll::Pending
    }
}
