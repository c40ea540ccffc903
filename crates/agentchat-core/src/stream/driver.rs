//! Read loop turning a chunked response body into one [`ChatResponse`]

use crate::error::{ChatError, Result};
use crate::session::Session;
use crate::state::{ChatResponse, StreamDelta};
use crate::transport::{AgentRequest, ChunkSource, Transport};

use super::aggregator::Aggregator;
use super::event::{decode_frame, Decoded, StreamEvent};
use super::frame::FrameSplitter;
use super::utf8::Utf8Decoder;

/// Reported as the session id when the backend never sent one
pub const UNKNOWN_SESSION: &str = "unknown";

/// Observable lifecycle of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Initiating,
    Streaming,
    Completed,
    Failed,
}

enum Phase {
    Initiating,
    Streaming,
    Completed,
    Failed(ChatError),
}

/// Counters for what the driver saw and what it dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub chunks: usize,
    pub frames: usize,
    pub events: usize,
    pub ignored_frames: usize,
    pub malformed_frames: usize,
    pub discarded_partial_bytes: usize,
}

/// Drives one query from request to resolution.
///
/// `run` consumes the driver, so a call resolves or rejects exactly once.
pub struct StreamDriver<'s> {
    query: String,
    session: &'s mut Session,
    session_id: Option<String>,
    phase: Phase,
    decoder: Utf8Decoder,
    splitter: FrameSplitter,
    aggregator: Aggregator,
    stats: StreamStats,
}

impl<'s> StreamDriver<'s> {
    pub fn new(query: impl Into<String>, session: &'s mut Session) -> Self {
        let session_id = session.get().map(str::to_owned);
        Self {
            query: query.into(),
            session,
            session_id,
            phase: Phase::Initiating,
            decoder: Utf8Decoder::new(),
            splitter: FrameSplitter::new(),
            aggregator: Aggregator::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn state(&self) -> DriverState {
        match self.phase {
            Phase::Initiating => DriverState::Initiating,
            Phase::Streaming => DriverState::Streaming,
            Phase::Completed => DriverState::Completed,
            Phase::Failed(_) => DriverState::Failed,
        }
    }

    /// Body sent for this query, correlated with the current session if any
    pub fn request(&self) -> AgentRequest {
        AgentRequest {
            query: self.query.clone(),
            session_id: self.session_id.clone(),
        }
    }

    pub async fn run<T, F>(mut self, transport: &T, mut on_delta: F) -> Result<ChatResponse>
    where
        T: Transport + ?Sized,
        F: FnMut(StreamDelta),
    {
        let request = self.request();
        let mut source = transport.open(&request).await?;
        self.phase = Phase::Streaming;

        self.pump(source.as_mut(), &mut on_delta).await;
        self.into_outcome()
    }

    async fn pump<F>(&mut self, source: &mut dyn ChunkSource, on_delta: &mut F)
    where
        F: FnMut(StreamDelta),
    {
        while matches!(self.phase, Phase::Streaming) {
            match source.next_chunk().await {
                Ok(Some(chunk)) => {
                    self.stats.chunks += 1;
                    let text = self.decoder.decode(&chunk);
                    self.ingest(&text, on_delta);
                }
                Ok(None) => self.end_of_stream(on_delta),
                Err(err) => self.fail(err),
            }
        }
    }

    fn ingest<F>(&mut self, text: &str, on_delta: &mut F)
    where
        F: FnMut(StreamDelta),
    {
        for frame in self.splitter.push(text) {
            // An error event ends the call; later frames in the same chunk are dropped
            if !matches!(self.phase, Phase::Streaming) {
                break;
            }
            self.stats.frames += 1;
            self.handle_frame(&frame, on_delta);
        }
    }

    fn handle_frame<F>(&mut self, frame: &str, on_delta: &mut F)
    where
        F: FnMut(StreamDelta),
    {
        let event = match decode_frame(frame) {
            Decoded::Event(event) => event,
            Decoded::Ignored => {
                self.stats.ignored_frames += 1;
                return;
            }
            Decoded::Malformed(err) => {
                self.stats.malformed_frames += 1;
                tracing::warn!(error = %err, frame_len = frame.len(), "dropping malformed frame");
                return;
            }
        };
        self.stats.events += 1;

        match event {
            StreamEvent::Session { session_id } => {
                tracing::debug!(%session_id, "session assigned");
                self.session.set(session_id.clone());
                self.session_id = Some(session_id);
            }
            StreamEvent::Delta { content } => {
                self.aggregator.append_delta(&content);
                on_delta(StreamDelta::assistant(content));
            }
            StreamEvent::Complete { history } => {
                tracing::debug!(messages = history.len(), "history received");
                self.aggregator.set_history(history);
            }
            StreamEvent::Error { content } => {
                self.fail(ChatError::backend(content));
            }
        }
    }

    fn end_of_stream<F>(&mut self, on_delta: &mut F)
    where
        F: FnMut(StreamDelta),
    {
        let tail = self.decoder.finish();
        if !tail.is_empty() {
            self.ingest(&tail, on_delta);
        }
        if !matches!(self.phase, Phase::Streaming) {
            return;
        }

        let dangling = self.splitter.pending().len();
        if dangling > 0 {
            self.stats.discarded_partial_bytes = dangling;
            tracing::debug!(bytes = dangling, "discarding unterminated frame at end of stream");
        }
        self.phase = Phase::Completed;
    }

    fn fail(&mut self, err: ChatError) {
        tracing::warn!(error = %err, "agent stream failed");
        self.phase = Phase::Failed(err);
    }

    fn into_outcome(self) -> Result<ChatResponse> {
        match self.phase {
            Phase::Completed => {
                let (response, history) = self.aggregator.into_result();
                tracing::info!(
                    chunks = self.stats.chunks,
                    events = self.stats.events,
                    malformed = self.stats.malformed_frames,
                    ignored = self.stats.ignored_frames,
                    "agent stream completed"
                );
                Ok(ChatResponse {
                    session_id: self.session_id.unwrap_or_else(|| UNKNOWN_SESSION.to_string()),
                    query: self.query,
                    response,
                    history,
                    stats: self.stats,
                })
            }
            Phase::Failed(err) => Err(err),
            Phase::Initiating | Phase::Streaming => Err(ChatError::transport("stream ended before resolution")),
        }
    }
}
