//! # lame-session-core
//!
//! Engine-agnostic session layer for stateful MP3 encoders.
//!
//! Wraps a native encoder behind opaque session handles, validates
//! configuration up front, enforces the output-buffer contract and turns
//! raw engine return codes into typed errors. Backends implement
//! [`EngineFactory`] and plug into the generic [`SessionRegistry`].
//!
//! ## Architecture
//!
//! ```text
//! lame-session-core (this crate)
//! ├── traits/       ← CodecEngine, EngineFactory
//! ├── models/       ← EncoderConfiguration, EncoderError, SessionHandle, SessionState
//! ├── contract/     ← output capacity rules, engine return codes
//! ├── session/      ← SessionRegistry, Encoder, SingleSession, StreamEncoder
//! ├── processing/   ← PCM layout helpers, WAV input parsing
//! └── storage/      ← Mp3FileWriter, metadata sidecar
//! ```

pub mod contract;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_support;

// Re-export key types at crate root for convenience.
pub use contract::buffer::{
    check_capacity, check_encode_capacity, check_flush_capacity, output_buffer_for,
    required_output_capacity, session_buffer_for, session_output_capacity, FLUSH_OUTPUT_CAPACITY,
    MAX_CALL_CAPACITY,
};
pub use contract::return_code::EngineFailure;
pub use models::config::{
    ChannelMode, ConfigurationBuilder, EncoderConfiguration, EncoderSettings, Id3Metadata, Quality,
};
pub use models::error::{EncoderError, PcmChannel};
pub use models::handle::SessionHandle;
pub use models::state::SessionState;
pub use models::stats::SessionStats;
pub use models::stream_metadata::{EncodeSummary, StreamMetadata};
pub use processing::wav_format::WavInfo;
pub use session::encoder::Encoder;
pub use session::pipeline::{InputLayout, StreamEncoder, DEFAULT_FRAME_SAMPLES, MAX_FRAME_SAMPLES};
pub use session::registry::SessionRegistry;
pub use session::single::SingleSession;
pub use storage::stream_writer::Mp3FileWriter;
pub use traits::codec_engine::{CodecEngine, EngineFactory};
