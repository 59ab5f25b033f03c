//! The output reader loop.
//!
//! Pulls raw bytes from the child's combined output stream, feeds them to the
//! decoder and pushes ordered [`BuildEvent`]s onto a channel. The loop runs
//! as a background task until end-of-stream or a decode failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::decoder::StreamDecoder;
use super::report;
use crate::types::BuildEvent;

/// Fixed read size. A read that fills the buffer exactly is assumed to have
/// more data behind it and is batched without decoding, so a multi-byte
/// sequence crossing the boundary never decodes prematurely.
pub const READ_CHUNK_SIZE: usize = 8192;

/// Spawn the reader task for a session's output stream.
///
/// Returns the receiving end of the session's ordered event channel. The
/// channel closes when the loop exits; after a normal end of stream the last
/// two events are the footer chunk and a `Done` marker, while a decode
/// failure ends the channel after a diagnostic chunk with no footer.
pub fn spawn_reader<R>(
    stream: R,
    decoder: StreamDecoder,
    killed: Arc<AtomicBool>,
    started_at: Instant,
) -> mpsc::Receiver<BuildEvent>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(100);
    tokio::spawn(run(stream, decoder, tx, killed, started_at));
    rx
}

async fn run<R>(
    mut stream: R,
    mut decoder: StreamDecoder,
    tx: mpsc::Sender<BuildEvent>,
    killed: Arc<AtomicBool>,
    started_at: Instant,
) where
    R: AsyncRead + Unpin,
{
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; READ_CHUNK_SIZE];

    loop {
        // A failed read on a torn-down pipe ends the stream like EOF.
        let n = match stream.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                debug!("output read failed: {}", e);
                0
            }
        };
        pending.extend_from_slice(&buf[..n]);

        if n == READ_CHUNK_SIZE {
            // Exactly-full read: more data may be immediately available and
            // the tail may sit inside a multi-byte sequence.
            continue;
        }

        let at_eof = n == 0;
        match decoder.feed(&pending, at_eof) {
            Ok(text) => {
                if !text.is_empty()
                    && tx.send(BuildEvent::Output { text }).await.is_err()
                {
                    return;
                }
            }
            Err(e) => {
                // Decode failure: a diagnostic chunk, then stop. No footer.
                let _ = tx.send(BuildEvent::Output { text: e.to_string() }).await;
                return;
            }
        }
        pending.clear();

        if at_eof {
            let was_killed = killed.load(Ordering::SeqCst);
            let elapsed = started_at.elapsed();
            debug!(killed = was_killed, "output stream ended");
            let footer = report::footer(was_killed, elapsed);
            if tx.send(BuildEvent::Output { text: footer }).await.is_err() {
                return;
            }
            let _ = tx
                .send(BuildEvent::Done {
                    killed: was_killed,
                    elapsed_secs: elapsed.as_secs_f64(),
                })
                .await;
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::collections::VecDeque;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Delivers one scripted chunk per read call, then end-of-stream.
    struct ScriptedReader {
        chunks: VecDeque<Vec<u8>>,
    }

    impl ScriptedReader {
        fn new<I>(chunks: I) -> Self
        where
            I: IntoIterator<Item = Vec<u8>>,
        {
            Self {
                chunks: chunks.into_iter().collect(),
            }
        }
    }

    impl AsyncRead for ScriptedReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if let Some(chunk) = self.get_mut().chunks.pop_front() {
                buf.put_slice(&chunk);
            }
            Poll::Ready(Ok(()))
        }
    }

    async fn collect<I>(chunks: I, killed: bool) -> Vec<BuildEvent>
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut rx = spawn_reader(
            ScriptedReader::new(chunks),
            StreamDecoder::new(UTF_8),
            Arc::new(AtomicBool::new(killed)),
            Instant::now(),
        );
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    fn output_text(events: &[BuildEvent]) -> String {
        events
            .iter()
            .filter_map(|event| match event {
                BuildEvent::Output { text } => Some(text.as_str()),
                BuildEvent::Done { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_stream_emits_footer_only() {
        let events = collect(Vec::<Vec<u8>>::new(), false).await;
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            BuildEvent::Output {
                text: "\n[Finished in 0.0s]".to_string()
            }
        );
        assert!(matches!(events[1], BuildEvent::Done { killed: false, .. }));
    }

    #[tokio::test]
    async fn test_short_reads_emit_in_order() {
        let events = collect(vec![b"first ".to_vec(), b"second\n".to_vec()], false).await;
        assert_eq!(
            output_text(&events),
            "first second\n\n[Finished in 0.0s]"
        );
    }

    #[tokio::test]
    async fn test_exact_size_read_batches_without_decoding() {
        let full = vec![b'a'; READ_CHUNK_SIZE];
        let events = collect(vec![full, b"b".to_vec()], false).await;

        // One emission for the whole batch, then the footer and done marker.
        match &events[0] {
            BuildEvent::Output { text } => assert_eq!(text.len(), READ_CHUNK_SIZE + 1),
            other => panic!("expected an output chunk, got {:?}", other),
        }
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn test_multibyte_sequence_across_read_boundary() {
        let events = collect(vec![vec![0xE2, 0x82], vec![0xAC]], false).await;
        assert_eq!(
            output_text(&events),
            "\u{20AC}\n[Finished in 0.0s]"
        );
    }

    #[tokio::test]
    async fn test_crlf_normalization_across_reads() {
        let events = collect(
            vec![b"line1\r".to_vec(), b"\nline2\r\n".to_vec()],
            false,
        )
        .await;
        assert_eq!(
            output_text(&events),
            "line1\nline2\n\n[Finished in 0.0s]"
        );
    }

    #[tokio::test]
    async fn test_killed_flag_selects_cancelled_footer() {
        let events = collect(vec![b"partial".to_vec()], true).await;
        assert_eq!(
            output_text(&events),
            "partial\n[Cancelled]"
        );
        assert!(matches!(
            events.last(),
            Some(BuildEvent::Done { killed: true, .. })
        ));
    }

    #[tokio::test]
    async fn test_decode_failure_reports_diagnostic_and_no_footer() {
        let events = collect(vec![vec![0xFF, 0xFE]], false).await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            BuildEvent::Output { text } => {
                assert!(text.starts_with("Error decoding output using UTF-8"));
            }
            other => panic!("expected a diagnostic chunk, got {:?}", other),
        }
        assert!(!events.iter().any(|e| matches!(e, BuildEvent::Done { .. })));
    }
}
