//! Incremental output decoding and line-ending normalization.

use encoding_rs::{Decoder, DecoderResult, Encoding};

use crate::types::{Error, Result};

/// Streaming decoder for the child's output bytes.
///
/// Decodes without replacement in the configured encoding and normalizes
/// `\r\n` and lone `\r` to `\n`. Incomplete state is carried between calls
/// so that a multi-byte sequence, or a `\r\n` pair, split across two reads
/// decodes exactly as it would have in one piece:
///
/// - the underlying decoder retains an incomplete trailing byte sequence
///   until the next feed;
/// - a trailing `\r` is held back (it may be half of a split `\r\n`) and
///   flushes as `\n` at end of stream.
///
/// An invalid byte sequence is an error; so is an incomplete sequence still
/// pending when the stream ends.
pub struct StreamDecoder {
    encoding: &'static Encoding,
    decoder: Decoder,
    pending_cr: bool,
}

impl StreamDecoder {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            decoder: encoding.new_decoder_without_bom_handling(),
            pending_cr: false,
        }
    }

    /// Name of the configured encoding, for diagnostics.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Decode and normalize the next batch of bytes.
    ///
    /// Pass `last = true` exactly once, when the stream has ended; it flushes
    /// held state and makes a dangling incomplete sequence an error. The
    /// returned string may be empty when everything fed is still pending.
    pub fn feed(&mut self, input: &[u8], last: bool) -> Result<String> {
        let decoded = self.decode(input, last)?;
        Ok(self.normalize(decoded, last))
    }

    fn decode(&mut self, input: &[u8], last: bool) -> Result<String> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length_without_replacement(input.len())
            .unwrap_or(input.len() * 3 + 4);
        let mut decoded = String::with_capacity(capacity);
        let mut consumed = 0;

        loop {
            let (result, read) = self.decoder.decode_to_string_without_replacement(
                &input[consumed..],
                &mut decoded,
                last,
            );
            consumed += read;
            match result {
                DecoderResult::InputEmpty => return Ok(decoded),
                DecoderResult::OutputFull => decoded.reserve(capacity.max(16)),
                DecoderResult::Malformed(sequence_length, _) => {
                    return Err(Error::Decode {
                        encoding: self.encoding_name().to_string(),
                        detail: format!(
                            "invalid byte sequence of length {} near offset {}",
                            sequence_length, consumed
                        ),
                    });
                }
            }
        }
    }

    fn normalize(&mut self, decoded: String, last: bool) -> String {
        let mut text = if self.pending_cr {
            let mut held = String::with_capacity(decoded.len() + 1);
            held.push('\r');
            held.push_str(&decoded);
            held
        } else {
            decoded
        };
        self.pending_cr = false;

        if !last && text.ends_with('\r') {
            text.pop();
            self.pending_cr = true;
        }

        text.replace("\r\n", "\n").replace('\r', "\n")
    }
}
