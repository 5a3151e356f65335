use std::fmt;

use crate::models::error::EncoderError;

/// Negative return codes of the engine boundary.
///
/// The integer values are part of the engine's calling contract and must
/// stay bit-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineFailure {
    BufferTooSmall,
    AllocationFailure,
    NotInitialized,
    AnalysisFailure,
}

impl EngineFailure {
    pub const fn raw(self) -> i32 {
        match self {
            Self::BufferTooSmall => -1,
            Self::AllocationFailure => -2,
            Self::NotInitialized => -3,
            Self::AnalysisFailure => -4,
        }
    }

    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::BufferTooSmall),
            -2 => Some(Self::AllocationFailure),
            -3 => Some(Self::NotInitialized),
            -4 => Some(Self::AnalysisFailure),
            _ => None,
        }
    }

    /// The session's engine state can no longer be trusted.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::AllocationFailure | Self::AnalysisFailure)
    }
}

impl fmt::Display for EngineFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BufferTooSmall => "output buffer too small",
            Self::AllocationFailure => "allocation failure",
            Self::NotInitialized => "parameters not initialized",
            Self::AnalysisFailure => "psychoacoustic analysis failure",
        };
        write!(f, "{} ({})", name, self.raw())
    }
}

/// Translate a raw engine return code.
///
/// Non-negative codes are byte counts and must fit in the `provided`
/// buffer. `required` is reported back when the engine says the buffer
/// was too small.
pub fn translate(code: i32, required: usize, provided: usize) -> Result<usize, EncoderError> {
    if code >= 0 {
        let written = code as usize;
        if written > provided {
            log::error!(
                "engine reported {} bytes written into a {} byte buffer",
                written,
                provided
            );
            return Err(EncoderError::UnexpectedEngineCode(code));
        }
        return Ok(written);
    }

    match EngineFailure::from_raw(code) {
        Some(EngineFailure::BufferTooSmall) => Err(EncoderError::BufferTooSmall {
            required: grown_capacity(required, provided),
            provided,
        }),
        Some(EngineFailure::AllocationFailure) => Err(EncoderError::AllocationFailure),
        Some(EngineFailure::NotInitialized) => Err(EncoderError::NotInitialized),
        Some(EngineFailure::AnalysisFailure) => Err(EncoderError::AnalysisFailure),
        None => Err(EncoderError::UnexpectedEngineCode(code)),
    }
}

/// Capacity to ask for after the engine rejected `provided` bytes. Never
/// equal to `provided`, so enlarging and retrying makes progress.
fn grown_capacity(required: usize, provided: usize) -> usize {
    if required > provided {
        required
    } else {
        provided.saturating_mul(2).max(provided.saturating_add(1))
    }
}

/// Clamp a buffer length to what fits in the engine's `int` size argument.
pub fn engine_capacity(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX)
}
