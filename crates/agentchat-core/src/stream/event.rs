//! Typed events decoded from protocol frames

use serde::Deserialize;

use crate::state::ChatMessage;

/// Marker every data-carrying frame starts with
pub const DATA_PREFIX: &str = "data: ";

const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// One decoded event of the agent stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Backend assigned or confirmed the conversation id
    Session { session_id: String },
    /// Incremental piece of the assistant's reply
    Delta { content: String },
    /// Authoritative conversation history, sent once at the end
    Complete { history: Vec<ChatMessage> },
    /// Backend failed mid-stream
    Error { content: String },
}

/// Outcome of decoding a single frame
#[derive(Debug)]
pub enum Decoded {
    Event(StreamEvent),
    /// No `data: ` prefix, unknown `type`, or a required field missing
    Ignored,
    /// The payload after the prefix was not valid JSON for an event
    Malformed(serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    kind: Option<String>,
    session_id: Option<String>,
    content: Option<String>,
    history: Option<Vec<ChatMessage>>,
}

impl RawEvent {
    fn into_event(self) -> Option<StreamEvent> {
        let non_empty = |s: Option<String>| s.filter(|s| !s.is_empty());

        match self.kind.as_deref()? {
            "session" => non_empty(self.session_id).map(|session_id| StreamEvent::Session { session_id }),
            "delta" => non_empty(self.content).map(|content| StreamEvent::Delta { content }),
            "complete" => self.history.map(|history| StreamEvent::Complete { history }),
            "error" => Some(StreamEvent::Error {
                content: non_empty(self.content).unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            }),
            _ => None,
        }
    }
}

/// Decode one raw frame (without its trailing delimiter)
pub fn decode_frame(frame: &str) -> Decoded {
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        return Decoded::Ignored;
    };

    match serde_json::from_str::<RawEvent>(payload.trim()) {
        Ok(raw) => raw.into_event().map_or(Decoded::Ignored, Decoded::Event),
        Err(err) => Decoded::Malformed(err),
    }
}
