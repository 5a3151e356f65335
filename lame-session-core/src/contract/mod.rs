//! Buffer contract between callers and the codec engine.
//!
//! Sizes output buffers for variable-length encoder output and turns the
//! engine's integer return codes into [`EncoderError`](crate::EncoderError)s.

pub mod buffer;
pub mod return_code;
