use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::state::{ChatResponse, StreamDelta};
use crate::stream::StreamDriver;
use crate::transport::{HttpTransport, Transport};

/// Client for a streaming agent backend
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn Transport>,
}

impl ChatClient {
    /// Client posting to a full endpoint URL, e.g. `http://localhost:8000/agent`
    pub fn new(endpoint: &str) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(endpoint)))
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.endpoint())
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `query` and stream the reply.
    ///
    /// `on_delta` fires for every piece of assistant text as it arrives, always
    /// before this future resolves. The session is read to correlate the
    /// request and updated when the backend assigns an id.
    pub async fn submit_query<F>(
        &self,
        session: &mut Session,
        query: &str,
        on_delta: F,
    ) -> Result<ChatResponse>
    where
        F: FnMut(StreamDelta),
    {
        StreamDriver::new(query, session)
            .run(self.transport.as_ref(), on_delta)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::ScriptedTransport;

    #[tokio::test]
    async fn submit_query_goes_through_transport() {
        let transport = Arc::new(ScriptedTransport::from_text(&[
            "data: {\"type\":\"session\",\"session_id\":\"s9\"}\n\ndata: {\"type\":\"delta\",\"content\":\"ok\"}\n\n",
        ]));
        let client = ChatClient::with_transport(transport.clone());
        let mut session = Session::new();
        let mut seen = Vec::new();

        let response = client
            .submit_query(&mut session, "ping", |d| seen.push(d.delta))
            .await
            .unwrap();

        assert_eq!(response.response, "ok");
        assert_eq!(seen, vec!["ok".to_string()]);
        assert_eq!(session.get(), Some("s9"));
        assert_eq!(transport.requests.lock().unwrap()[0].query, "ping");
    }
}
