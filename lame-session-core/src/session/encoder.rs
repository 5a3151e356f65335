use std::sync::Arc;

use crate::contract::buffer;
use crate::contract::return_code::{self, EngineFailure};
use crate::models::config::{ChannelMode, ConfigurationBuilder, EncoderConfiguration};
use crate::models::error::{EncoderError, PcmChannel};
use crate::models::handle::SessionHandle;
use crate::models::state::SessionState;
use crate::models::stats::SessionStats;
use crate::session::registry::SessionRegistry;
use crate::traits::codec_engine::{CodecEngine, EngineFactory};

/// One configured encoding stream bound to exactly one engine instance.
///
/// Every call is checked against the buffer contract before it reaches
/// the engine, and every engine return code is translated into a typed
/// result. Methods take `&mut self`, so one `Encoder` is driven by one
/// caller at a time; the registry additionally serializes access to the
/// engine instance itself.
///
/// Dropping an open encoder releases its handle.
pub struct Encoder<F: EngineFactory> {
    registry: Arc<SessionRegistry<F>>,
    handle: SessionHandle,
    config: EncoderConfiguration,
    state: SessionState,
    stats: SessionStats,
}

impl<F: EngineFactory> Encoder<F> {
    pub fn open(
        registry: Arc<SessionRegistry<F>>,
        config: EncoderConfiguration,
    ) -> Result<Self, EncoderError> {
        let handle = registry.create(&config)?;
        Ok(Self {
            registry,
            handle,
            config,
            state: SessionState::Active,
            stats: SessionStats::default(),
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle
    }

    pub fn config(&self) -> &EncoderConfiguration {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Output capacity for `sample_count` samples per channel on this
    /// session: `7200 + ceil(1.25 * n)`, with `n` counted at the output
    /// sample rate when the session upsamples.
    pub fn output_capacity(&self, sample_count: usize) -> usize {
        buffer::session_output_capacity(&self.config, sample_count)
    }

    /// Zeroed buffer of exactly [`output_capacity`](Self::output_capacity) bytes.
    pub fn output_buffer(&self, sample_count: usize) -> Vec<u8> {
        buffer::session_buffer_for(&self.config, sample_count)
    }

    /// Encode `sample_count` samples per channel from planar buffers.
    ///
    /// `output` must hold at least [`output_capacity`](Self::output_capacity)
    /// bytes, which is `7200 + ceil(1.25 * sample_count)` when the session
    /// does not resample.
    /// Mono sessions ignore `right` and accept `None`; when a right channel
    /// is passed anyway it must still hold `sample_count` samples. Stereo
    /// sessions require it.
    ///
    /// Returns the bytes written, which may be 0 while the engine buffers
    /// input for the next frame.
    pub fn encode(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
        sample_count: usize,
        output: &mut [u8],
    ) -> Result<usize, EncoderError> {
        self.ensure_accepts_input()?;
        let required = self.call_capacity(sample_count)?;
        check_len(PcmChannel::Left, left.len(), sample_count)?;
        if let Some(right) = right {
            check_len(PcmChannel::Right, right.len(), sample_count)?;
        }
        let right = match self.config.output_channels() {
            ChannelMode::Mono => None,
            ChannelMode::Stereo => {
                Some(&right.ok_or(EncoderError::MissingRightChannel)?[..sample_count])
            }
        };
        buffer::check_capacity(required, output.len())?;

        let left = &left[..sample_count];
        let code = self
            .registry
            .with_engine(self.handle, |engine| engine.encode(left, right, output))?;
        let written = self.translate(code, required, output.len())?;
        self.stats.record_encode(sample_count, written);
        Ok(written)
    }

    /// Encode `sample_count` frames of channel-interleaved PCM.
    ///
    /// `pcm` holds `sample_count * channels` samples; `output` follows the
    /// same capacity contract as [`encode`](Self::encode).
    pub fn encode_interleaved(
        &mut self,
        pcm: &[i16],
        sample_count: usize,
        output: &mut [u8],
    ) -> Result<usize, EncoderError> {
        self.ensure_accepts_input()?;
        let required = self.call_capacity(sample_count)?;
        let input_len = sample_count.saturating_mul(self.config.channel_count());
        check_len(PcmChannel::Interleaved, pcm.len(), input_len)?;
        buffer::check_capacity(required, output.len())?;

        let pcm = &pcm[..input_len];
        let code = self.registry.with_engine(self.handle, |engine| {
            engine.encode_interleaved(pcm, sample_count, output)
        })?;
        let written = self.translate(code, required, output.len())?;
        self.stats.record_encode(sample_count, written);
        Ok(written)
    }

    /// Drain buffered engine state into `output` (at least 7200 bytes).
    ///
    /// Only the first flush reaches the engine; later calls return 0.
    pub fn flush(&mut self, output: &mut [u8]) -> Result<usize, EncoderError> {
        match self.state {
            SessionState::Active => {}
            SessionState::Flushed => return Ok(0),
            SessionState::Failed(kind) => return Err(EncoderError::SessionFailed(kind)),
            SessionState::Closed => return Err(EncoderError::SessionClosed),
        }
        buffer::check_flush_capacity(output.len())?;

        let code = self
            .registry
            .with_engine(self.handle, |engine| engine.flush(output))?;
        let written = self.translate(code, buffer::FLUSH_OUTPUT_CAPACITY, output.len())?;
        self.stats.record_flush(written);
        self.state = SessionState::Flushed;
        log::debug!("session {} flushed {} bytes", self.handle, written);
        Ok(written)
    }

    /// Destroy the engine instance and invalidate the handle.
    pub fn close(&mut self) -> Result<SessionStats, EncoderError> {
        if self.state.is_closed() {
            return Err(EncoderError::SessionClosed);
        }
        if self.state.is_failed() {
            log::warn!("closing session {} in state {:?}", self.handle, self.state);
        }
        self.state = SessionState::Closed;
        self.registry.release(self.handle)?;
        log::info!(
            "session {} closed after {} calls, {} samples, {} bytes",
            self.handle,
            self.stats.encode_calls,
            self.stats.samples_encoded,
            self.stats.bytes_emitted
        );
        Ok(self.stats)
    }

    fn ensure_accepts_input(&self) -> Result<(), EncoderError> {
        if !self.state.is_terminal() {
            return Ok(());
        }
        Err(match self.state {
            SessionState::Flushed => EncoderError::SessionFlushed,
            SessionState::Failed(kind) => EncoderError::SessionFailed(kind),
            _ => EncoderError::SessionClosed,
        })
    }

    fn call_capacity(&self, sample_count: usize) -> Result<usize, EncoderError> {
        let required = self.output_capacity(sample_count);
        if required > buffer::MAX_CALL_CAPACITY {
            return Err(EncoderError::InputTooLong {
                samples: sample_count,
            });
        }
        Ok(required)
    }

    fn translate(
        &mut self,
        code: i32,
        required: usize,
        provided: usize,
    ) -> Result<usize, EncoderError> {
        let result = return_code::translate(code, required, provided);
        if let Some(kind) = EngineFailure::from_raw(code).filter(|kind| kind.is_fatal()) {
            log::warn!("session {} failed: {}", self.handle, kind);
            self.state = SessionState::Failed(kind);
        }
        result
    }
}

impl<F: EngineFactory> Drop for Encoder<F> {
    fn drop(&mut self) {
        if !self.state.is_closed() {
            if let Err(e) = self.registry.release(self.handle) {
                log::warn!("releasing session {} on drop failed: {}", self.handle, e);
            }
        }
    }
}

impl ConfigurationBuilder {
    /// Build the configuration and open a session on `registry`.
    pub fn create<F: EngineFactory>(
        self,
        registry: &Arc<SessionRegistry<F>>,
    ) -> Result<Encoder<F>, EncoderError> {
        registry.open_session(self.build()?)
    }
}

fn check_len(channel: PcmChannel, provided: usize, required: usize) -> Result<(), EncoderError> {
    if provided < required {
        return Err(EncoderError::InputTooShort {
            channel,
            required,
            provided,
        });
    }
    Ok(())
}
