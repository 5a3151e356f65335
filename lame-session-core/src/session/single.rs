use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::{ConfigurationBuilder, EncoderConfiguration, Id3Metadata};
use crate::models::error::EncoderError;
use crate::models::handle::SessionHandle;
use crate::models::stats::SessionStats;
use crate::session::encoder::Encoder;
use crate::session::registry::SessionRegistry;
use crate::traits::codec_engine::EngineFactory;

/// Facade owning at most one implicit session.
///
/// Serves callers that need a single stream and no handles. The session
/// lives behind a mutex, so concurrent callers are serialized. A second
/// `init` before `close` is rejected with
/// [`EncoderError::SessionAlreadyActive`].
pub struct SingleSession<F: EngineFactory> {
    registry: Arc<SessionRegistry<F>>,
    current: Mutex<Option<Encoder<F>>>,
}

impl<F: EngineFactory> SingleSession<F> {
    pub fn new(registry: Arc<SessionRegistry<F>>) -> Self {
        Self {
            registry,
            current: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry<F>> {
        &self.registry
    }

    /// Quality 7, no ID3 tags.
    pub fn init(
        &self,
        input_sample_rate_hz: u32,
        output_channels: u32,
        output_sample_rate_hz: u32,
        output_bitrate_kbps: u32,
    ) -> Result<SessionHandle, EncoderError> {
        self.init_with_config(
            ConfigurationBuilder::new(
                input_sample_rate_hz,
                output_channels,
                output_sample_rate_hz,
                output_bitrate_kbps,
            )
            .build()?,
        )
    }

    /// Explicit quality, no ID3 tags.
    pub fn init_with_quality(
        &self,
        input_sample_rate_hz: u32,
        output_channels: u32,
        output_sample_rate_hz: u32,
        output_bitrate_kbps: u32,
        quality: u8,
    ) -> Result<SessionHandle, EncoderError> {
        self.init_with_tags(
            input_sample_rate_hz,
            output_channels,
            output_sample_rate_hz,
            output_bitrate_kbps,
            quality,
            Id3Metadata::default(),
        )
    }

    /// Every parameter given explicitly.
    pub fn init_with_tags(
        &self,
        input_sample_rate_hz: u32,
        output_channels: u32,
        output_sample_rate_hz: u32,
        output_bitrate_kbps: u32,
        quality: u8,
        id3: Id3Metadata,
    ) -> Result<SessionHandle, EncoderError> {
        self.init_with_config(
            ConfigurationBuilder::new(
                input_sample_rate_hz,
                output_channels,
                output_sample_rate_hz,
                output_bitrate_kbps,
            )
            .quality(quality)
            .id3(id3)
            .build()?,
        )
    }

    pub fn init_with_config(
        &self,
        config: EncoderConfiguration,
    ) -> Result<SessionHandle, EncoderError> {
        let mut current = self.current.lock();
        if current.is_some() {
            return Err(EncoderError::SessionAlreadyActive);
        }
        let encoder = Encoder::open(Arc::clone(&self.registry), config)?;
        let handle = encoder.handle();
        *current = Some(encoder);
        Ok(handle)
    }

    pub fn encode(
        &self,
        left: &[i16],
        right: Option<&[i16]>,
        sample_count: usize,
        output: &mut [u8],
    ) -> Result<usize, EncoderError> {
        self.with_session(|encoder| encoder.encode(left, right, sample_count, output))
    }

    pub fn encode_interleaved(
        &self,
        pcm: &[i16],
        sample_count: usize,
        output: &mut [u8],
    ) -> Result<usize, EncoderError> {
        self.with_session(|encoder| encoder.encode_interleaved(pcm, sample_count, output))
    }

    pub fn flush(&self, output: &mut [u8]) -> Result<usize, EncoderError> {
        self.with_session(|encoder| encoder.flush(output))
    }

    /// Close the implicit session. A later `init` may start a new one.
    pub fn close(&self) -> Result<SessionStats, EncoderError> {
        let mut encoder = self
            .current
            .lock()
            .take()
            .ok_or(EncoderError::NoActiveSession)?;
        encoder.close()
    }

    pub fn is_active(&self) -> bool {
        self.current.lock().is_some()
    }

    pub fn handle(&self) -> Option<SessionHandle> {
        self.current.lock().as_ref().map(Encoder::handle)
    }

    /// Toggle engine boundary diagnostics. Independent of the session.
    pub fn log(&self, enabled: bool) {
        self.registry.set_logging(enabled);
    }

    /// Run `f` on the implicit session while holding the facade lock.
    pub fn with_session<R>(
        &self,
        f: impl FnOnce(&mut Encoder<F>) -> Result<R, EncoderError>,
    ) -> Result<R, EncoderError> {
        let mut current = self.current.lock();
        let encoder = current.as_mut().ok_or(EncoderError::NoActiveSession)?;
        f(encoder)
    }
}
