pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod stream;
pub mod transport;

// Re-export main types for convenience
pub use client::ChatClient;
pub use config::Config;
pub use error::{ChatError, Result};
pub use session::Session;
pub use state::{ChatMessage, ChatResponse, ChatRole, StreamDelta};
pub use stream::{StreamEvent, StreamStats};
pub use transport::{AgentRequest, ChunkSource, HttpTransport, Transport};
