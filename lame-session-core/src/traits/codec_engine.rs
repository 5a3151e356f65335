use crate::models::config::EncoderConfiguration;
use crate::models::error::EncoderError;

/// One native encoder instance.
///
/// Implemented by:
/// - `LameEngine` (lame-session-mp3lame)
///
/// Calls are synchronous and blocking. Return values follow the engine's
/// integer contract: `>= 0` is the number of bytes written to `output`,
/// `-1` output buffer too small, `-2` allocation failure, `-3` parameters
/// not initialized, `-4` psychoacoustic failure. The session layer
/// translates these; implementations must not.
///
/// Instances are not reentrant. The registry serializes every call on one
/// instance behind its own mutex. Dropping the instance destroys the
/// native state.
pub trait CodecEngine: Send {
    /// Encode planar PCM. `left` holds exactly the samples to encode;
    /// `right` has the same length when present. Mono instances receive
    /// `None`.
    fn encode(&mut self, left: &[i16], right: Option<&[i16]>, output: &mut [u8]) -> i32;

    /// Encode channel-interleaved PCM holding `samples_per_channel` frames.
    fn encode_interleaved(
        &mut self,
        pcm: &[i16],
        samples_per_channel: usize,
        output: &mut [u8],
    ) -> i32;

    /// Drain internally buffered samples.
    fn flush(&mut self, output: &mut [u8]) -> i32;
}

/// Creates engine instances and owns the process-wide engine settings.
pub trait EngineFactory: Send + Sync {
    type Engine: CodecEngine;

    /// Allocate and initialise one instance for `config`. All parameters,
    /// ID3 tags included, are applied before the instance is returned.
    fn create(&self, config: &EncoderConfiguration) -> Result<Self::Engine, EncoderError>;

    /// Toggle diagnostic output of the engine boundary. Process-wide,
    /// independent of any instance.
    fn set_logging(&self, enabled: bool);
}
