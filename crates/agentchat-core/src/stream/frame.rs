//! Frame extraction for the `data: ...\n\n` event protocol

/// Separator between two frames on the wire
pub const FRAME_DELIMITER: &str = "\n\n";

/// Split `buffer` into the complete frames it contains and the unconsumed suffix.
///
/// A frame only counts as complete once its whole delimiter is present, so a
/// delimiter straddling two chunks is picked up on the next call.
pub fn split_frames(buffer: &str) -> (Vec<&str>, &str) {
    let mut frames = Vec::new();
    let mut rest = buffer;

    while let Some(pos) = rest.find(FRAME_DELIMITER) {
        frames.push(&rest[..pos]);
        rest = &rest[pos + FRAME_DELIMITER.len()..];
    }

    (frames, rest)
}

/// Append-only text buffer that hands out complete frames as they arrive.
///
/// After every [`FrameSplitter::push`] the buffer holds at most one partial frame.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buffer: String,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append decoded text and drain every frame that is now complete
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let (frames, consumed) = {
            let (frames, rest) = split_frames(&self.buffer);
            let frames: Vec<String> = frames.into_iter().map(str::to_owned).collect();
            (frames, self.buffer.len() - rest.len())
        };

        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
        frames
    }

    /// Text of the trailing frame that has not been delimited yet
    pub fn pending(&self) -> &str {
        &self.buffer
    }
}
