//! Process-wide single-session entry points.
//!
//! One implicit session lives in process state next to the default
//! registry. `init` starts it, `encode`/`flush` drive it and `close` ends
//! it. A second `init` before `close` fails with
//! [`EncoderError::SessionAlreadyActive`]. Concurrent callers are
//! serialized on the implicit session.

use std::sync::{Arc, OnceLock};

use lame_session_core::models::config::{EncoderConfiguration, Id3Metadata};
use lame_session_core::models::error::EncoderError;
use lame_session_core::models::handle::SessionHandle;
use lame_session_core::models::stats::SessionStats;
use lame_session_core::SingleSession;

use crate::engine::LameEngineFactory;
use crate::default_registry;

static SESSION: OnceLock<SingleSession<LameEngineFactory>> = OnceLock::new();

fn session() -> &'static SingleSession<LameEngineFactory> {
    SESSION.get_or_init(|| SingleSession::new(Arc::clone(default_registry())))
}

/// Quality 7, no ID3 tags.
pub fn init(
    input_sample_rate_hz: u32,
    output_channels: u32,
    output_sample_rate_hz: u32,
    output_bitrate_kbps: u32,
) -> Result<SessionHandle, EncoderError> {
    session().init(
        input_sample_rate_hz,
        output_channels,
        output_sample_rate_hz,
        output_bitrate_kbps,
    )
}

/// Explicit quality, no ID3 tags.
pub fn init_with_quality(
    input_sample_rate_hz: u32,
    output_channels: u32,
    output_sample_rate_hz: u32,
    output_bitrate_kbps: u32,
    quality: u8,
) -> Result<SessionHandle, EncoderError> {
    session().init_with_quality(
        input_sample_rate_hz,
        output_channels,
        output_sample_rate_hz,
        output_bitrate_kbps,
        quality,
    )
}

pub fn init_with_tags(
    input_sample_rate_hz: u32,
    output_channels: u32,
    output_sample_rate_hz: u32,
    output_bitrate_kbps: u32,
    quality: u8,
    id3: Id3Metadata,
) -> Result<SessionHandle, EncoderError> {
    session().init_with_tags(
        input_sample_rate_hz,
        output_channels,
        output_sample_rate_hz,
        output_bitrate_kbps,
        quality,
        id3,
    )
}

pub fn init_with_config(config: EncoderConfiguration) -> Result<SessionHandle, EncoderError> {
    session().init_with_config(config)
}

pub fn encode(
    left: &[i16],
    right: Option<&[i16]>,
    sample_count: usize,
    output: &mut [u8],
) -> Result<usize, EncoderError> {
    session().encode(left, right, sample_count, output)
}

pub fn encode_interleaved(
    pcm: &[i16],
    sample_count: usize,
    output: &mut [u8],
) -> Result<usize, EncoderError> {
    session().encode_interleaved(pcm, sample_count, output)
}

pub fn flush(output: &mut [u8]) -> Result<usize, EncoderError> {
    session().flush(output)
}

pub fn close() -> Result<SessionStats, EncoderError> {
    session().close()
}

pub fn is_active() -> bool {
    session().is_active()
}

/// Toggle engine boundary diagnostics for the whole process.
pub fn log(enabled: bool) {
    session().log(enabled);
}
