//! Incremental UTF-8 stream decoding
//!
//! Network chunks can split a multi-byte UTF-8 sequence at any byte
//! boundary, so decoding each chunk independently corrupts characters at
//! chunk edges. `StreamDecoder` carries an incomplete trailing sequence
//! (at most 3 bytes) across calls and only gives up on it at `finish`,
//! matching the behavior of a streaming text decoder: complete sequences
//! decode exactly, invalid sequences decode to U+FFFD.

/// Incremental UTF-8 decoder for a chunked byte stream
#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes of an incomplete trailing sequence from the previous chunk
    carry: Vec<u8>,
}

impl StreamDecoder {
    /// Create a decoder with no pending state
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning the text that became complete with it
    ///
    /// An incomplete multi-byte sequence at the end of the chunk is held
    /// back and prepended to the next call. Invalid byte sequences decode
    /// to one U+FFFD each.
    pub fn push(&mut self, input: &[u8]) -> String {
        let joined: Vec<u8>;
        let mut rest: &[u8] = if self.carry.is_empty() {
            input
        } else {
            let mut buf = std::mem::take(&mut self.carry);
            buf.extend_from_slice(input);
            joined = buf;
            &joined
        };

        let mut out = String::new();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let valid_len = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid_len]));
                    match err.error_len() {
                        // Invalid sequence in the middle: replace and resume after it
                        Some(skip) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid_len + skip..];
                        }
                        // Incomplete sequence at the end: hold it for the next chunk
                        None => {
                            self.carry = rest[valid_len..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Finalize the stream, flushing any dangling partial sequence as U+FFFD
    pub fn finish(self) -> String {
        if self.carry.is_empty() {
            String::new()
        } else {
            "\u{FFFD}".to_string()
        }
    }
}
