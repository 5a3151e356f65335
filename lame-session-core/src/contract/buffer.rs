use crate::models::config::EncoderConfiguration;
use crate::models::error::EncoderError;

/// Worst-case bytes the engine may hold back for one frame, and the
/// minimum capacity of a flush buffer.
pub const FLUSH_OUTPUT_CAPACITY: usize = 7200;

/// Minimum output capacity for encoding `samples` samples per channel:
/// `7200 + ceil(1.25 * samples)`.
pub fn required_output_capacity(samples: usize) -> usize {
    samples
        .checked_mul(5)
        .and_then(|quarters| quarters.div_ceil(4).checked_add(FLUSH_OUTPUT_CAPACITY))
        .unwrap_or(usize::MAX)
}

/// Largest output capacity one engine call can be given. The engine takes
/// buffer sizes as a C `int`.
pub const MAX_CALL_CAPACITY: usize = i32::MAX as usize;

/// Lowest bitrate the engine encodes at, whatever is requested.
const MIN_ENGINE_KBPS: u32 = 8;

/// Output capacity for `samples` input samples per channel on a session
/// configured as `config`.
///
/// The engine emits output at the output sample rate, so the samples are
/// counted after resampling. When the configured bitrate spends more than
/// one byte per output sample, the byte count at that bitrate is used
/// instead. For a stream at 44.1 kHz and 128 kbps in and out this equals
/// [`required_output_capacity`].
pub fn session_output_capacity(config: &EncoderConfiguration, samples: usize) -> usize {
    let samples = samples as u128;
    let in_rate = u128::from(config.input_sample_rate_hz());
    let out_rate = u128::from(config.output_sample_rate_hz());
    let kbps = u128::from(config.output_bitrate_kbps().max(MIN_ENGINE_KBPS));

    let resampled = samples.saturating_mul(out_rate).div_ceil(in_rate).max(samples);
    let at_bitrate = resampled.saturating_mul(kbps * 125).div_ceil(out_rate);
    usize::try_from(resampled.max(at_bitrate))
        .map(required_output_capacity)
        .unwrap_or(usize::MAX)
}

/// Zeroed buffer of exactly the capacity [`session_output_capacity`] asks for.
pub fn session_buffer_for(config: &EncoderConfiguration, samples: usize) -> Vec<u8> {
    vec![0; session_output_capacity(config, samples)]
}

/// Zeroed buffer of exactly the required capacity for `samples`.
pub fn output_buffer_for(samples: usize) -> Vec<u8> {
    vec![0; required_output_capacity(samples)]
}

pub fn check_encode_capacity(samples: usize, provided: usize) -> Result<(), EncoderError> {
    check_capacity(required_output_capacity(samples), provided)
}

pub fn check_capacity(required: usize, provided: usize) -> Result<(), EncoderError> {
    if provided < required {
        return Err(EncoderError::BufferTooSmall { required, provided });
    }
    Ok(())
}

pub fn check_flush_capacity(provided: usize) -> Result<(), EncoderError> {
    if provided < FLUSH_OUTPUT_CAPACITY {
        return Err(EncoderError::BufferTooSmall {
            required: FLUSH_OUTPUT_CAPACITY,
            provided,
        });
    }
    Ok(())
}
