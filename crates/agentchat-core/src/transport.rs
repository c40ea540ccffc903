//! Transport boundary between the stream driver and the network

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::error::{ChatError, Result};

/// JSON body posted to the agent endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRequest {
    pub query: String,
    /// Serialized as `null` when the conversation has not started yet
    pub session_id: Option<String>,
}

/// Pull-based source of raw body chunks
#[async_trait]
pub trait ChunkSource: Send {
    /// `Ok(None)` signals a clean end of stream
    async fn next_chunk(&mut self) -> Result<Option<Bytes>>;
}

/// Issues the request and hands back the response body as a chunk source
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, request: &AgentRequest) -> Result<Box<dyn ChunkSource>>;
}

/// reqwest-backed transport posting to a single endpoint
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn open(&self, request: &AgentRequest) -> Result<Box<dyn ChunkSource>> {
        tracing::debug!(endpoint = %self.endpoint, has_session = request.session_id.is_some(), "opening agent stream");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return Err(ChatError::MissingBody);
        }

        Ok(Box::new(HttpChunkSource {
            stream: Box::pin(response.bytes_stream()),
        }))
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

struct HttpChunkSource {
    stream: ByteStream,
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        self.stream
            .next()
            .await
            .transpose()
            .map_err(|e| ChatError::transport(format!("Stream error: {}", e)))
    }
}

/// In-memory transports for driving the stream without a network
#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Replays a fixed list of chunk results, counting how many were pulled
    pub struct ScriptedSource {
        chunks: VecDeque<Result<Bytes>>,
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ChunkSource for ScriptedSource {
        async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.chunks.pop_front().transpose()
        }
    }

    /// Transport that serves the same script on every call and records requests
    pub struct ScriptedTransport {
        script: Mutex<Vec<Vec<Result<Bytes>>>>,
        pub requests: Mutex<Vec<AgentRequest>>,
        pub reads: Arc<AtomicUsize>,
    }

    impl ScriptedTransport {
        /// One call worth of chunks
        pub fn new(chunks: Vec<Result<Bytes>>) -> Self {
            Self::calls(vec![chunks])
        }

        /// One script per successive call
        pub fn calls(mut calls: Vec<Vec<Result<Bytes>>>) -> Self {
            calls.reverse();
            Self {
                script: Mutex::new(calls),
                requests: Mutex::new(Vec::new()),
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn from_text(chunks: &[&str]) -> Self {
            Self::new(text_chunks(chunks))
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    pub fn text_chunks(chunks: &[&str]) -> Vec<Result<Bytes>> {
        chunks
            .iter()
            .map(|c| Ok(Bytes::copy_from_slice(c.as_bytes())))
            .collect()
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn open(&self, request: &AgentRequest) -> Result<Box<dyn ChunkSource>> {
            self.requests.lock().unwrap().push(request.clone());
            let chunks = self.script.lock().unwrap().pop().unwrap_or_default();
            Ok(Box::new(ScriptedSource {
                chunks: chunks.into(),
                reads: self.reads.clone(),
            }))
        }
    }
}
