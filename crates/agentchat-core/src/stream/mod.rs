//! Streaming ingestion: bytes → text → frames → events → one response

pub mod aggregator;
pub mod driver;
pub mod event;
pub mod frame;
pub mod utf8;

pub use aggregator::Aggregator;
pub use driver::{DriverState, StreamDriver, StreamStats, UNKNOWN_SESSION};
pub use event::{decode_frame, Decoded, StreamEvent, DATA_PREFIX};
pub use frame::{split_frames, FrameSplitter, FRAME_DELIMITER};
pub use utf8::Utf8Decoder;
