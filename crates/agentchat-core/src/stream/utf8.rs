/// Incremental UTF-8 decoder for byte chunks.
///
/// Bytes of a multi-byte character cut by a chunk boundary are held back
/// until the rest of the character arrives. Invalid sequences decode to
/// U+FFFD instead of failing the stream.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::with_capacity(self.pending.len());
        let mut input: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, after) = input.split_at(err.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &after[len..];
                        }
                        // Truncated sequence at the end of the chunk
                        None => {
                            input = after;
                            break;
                        }
                    }
                }
            }
        }

        let rest = input.to_vec();
        self.pending = rest;
        out
    }

    /// Flush held-back bytes at end of stream
    pub fn finish(&mut self) -> String {
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
