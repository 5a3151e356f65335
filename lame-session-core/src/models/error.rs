use std::fmt;

use thiserror::Error;

use crate::contract::return_code::EngineFailure;
use crate::models::handle::SessionHandle;

/// Which PCM input a length precondition was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcmChannel {
    Left,
    Right,
    Interleaved,
}

impl fmt::Display for PcmChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Interleaved => f.write_str("interleaved"),
        }
    }
}

/// Errors surfaced by encoder sessions, the registry and the legacy facade.
///
/// Raw engine return codes never escape past the buffer contract layer;
/// they arrive here as `BufferTooSmall`, `AllocationFailure`,
/// `NotInitialized` or `AnalysisFailure`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("engine creation failed: {0}")]
    EngineCreation(String),

    #[error("invalid session handle {0}")]
    InvalidHandle(SessionHandle),

    #[error("session is closed")]
    SessionClosed,

    #[error("session was flushed and accepts no further input")]
    SessionFlushed,

    #[error("session failed earlier ({0}) and cannot be reused")]
    SessionFailed(EngineFailure),

    #[error("output buffer too small: {provided} bytes provided, {required} required")]
    BufferTooSmall { required: usize, provided: usize },

    #[error("engine allocation failure")]
    AllocationFailure,

    #[error("engine parameters were not initialized before use")]
    NotInitialized,

    #[error("psychoacoustic analysis failure")]
    AnalysisFailure,

    #[error("unexpected engine return code {0}")]
    UnexpectedEngineCode(i32),

    #[error("{channel} input holds {provided} samples, {required} required")]
    InputTooShort {
        channel: PcmChannel,
        required: usize,
        provided: usize,
    },

    #[error("{samples} samples per channel exceed what one engine call accepts; split the input")]
    InputTooLong { samples: usize },

    #[error("stereo session requires a right channel")]
    MissingRightChannel,

    #[error("a session is already active; close it before initializing again")]
    SessionAlreadyActive,

    #[error("no session is active")]
    NoActiveSession,

    #[error("storage error: {0}")]
    Storage(String),
}

impl EncoderError {
    /// Only an undersized output buffer may be retried, after the caller
    /// enlarges it and resubmits the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BufferTooSmall { .. })
    }

    /// Engine state may be inconsistent; the session must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AllocationFailure | Self::AnalysisFailure)
    }

    /// The engine-level integer this error was translated from, if any.
    pub fn raw_code(&self) -> Option<i32> {
        match self {
            Self::BufferTooSmall { .. } => Some(EngineFailure::BufferTooSmall.raw()),
            Self::AllocationFailure => Some(EngineFailure::AllocationFailure.raw()),
            Self::NotInitialized => Some(EngineFailure::NotInitialized.raw()),
            Self::AnalysisFailure => Some(EngineFailure::AnalysisFailure.raw()),
            Self::UnexpectedEngineCode(code) => Some(*code),
            _ => None,
        }
    }
}
