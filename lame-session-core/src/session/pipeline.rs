use std::io::Write;

use crate::contract::buffer;
use crate::models::error::EncoderError;
use crate::models::stream_metadata::EncodeSummary;
use crate::processing::pcm;
use crate::session::encoder::Encoder;
use crate::traits::codec_engine::EngineFactory;

/// One MPEG-1 Layer III frame worth of samples per channel.
pub const DEFAULT_FRAME_SAMPLES: usize = 1152;

/// Upper bound on samples per channel per engine call, about 24 s at
/// 44.1 kHz.
pub const MAX_FRAME_SAMPLES: usize = 1 << 20;

/// Which encoder entry point the pipeline feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputLayout {
    #[default]
    Interleaved,
    /// De-interleave each chunk and use the planar entry point.
    Planar,
}

/// Drives an [`Encoder`] over a whole interleaved PCM buffer, chunk by
/// chunk, writing every emitted byte to a sink and flushing once at the end.
pub struct StreamEncoder<'a, F: EngineFactory> {
    encoder: &'a mut Encoder<F>,
    frame_samples: usize,
    layout: InputLayout,
}

impl<'a, F: EngineFactory> StreamEncoder<'a, F> {
    pub fn new(encoder: &'a mut Encoder<F>) -> Self {
        Self {
            encoder,
            frame_samples: DEFAULT_FRAME_SAMPLES,
            layout: InputLayout::default(),
        }
    }

    /// Samples per channel handed to the engine per call, clamped to
    /// `1..=MAX_FRAME_SAMPLES`.
    pub fn frame_samples(mut self, frame_samples: usize) -> Self {
        self.frame_samples = frame_samples.clamp(1, MAX_FRAME_SAMPLES);
        self
    }

    pub fn layout(mut self, layout: InputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Encode `interleaved` (whole frames only; a trailing partial frame is
    /// dropped), flush, and write everything to `sink`.
    pub fn encode_all<W: Write>(
        self,
        interleaved: &[i16],
        sink: &mut W,
    ) -> Result<EncodeSummary, EncoderError> {
        let channels = self.encoder.config().channel_count();
        let frame_samples = self.call_frame_samples()?;
        let mut out = buffer::session_buffer_for(self.encoder.config(), frame_samples);
        let mut bytes_written = 0u64;
        let mut frames = 0u64;

        for chunk in interleaved.chunks(frame_samples * channels) {
            let samples = chunk.len() / channels;
            if samples == 0 {
                break;
            }
            let written = match self.layout {
                InputLayout::Interleaved => {
                    self.encoder.encode_interleaved(chunk, samples, &mut out)?
                }
                InputLayout::Planar => {
                    let (left, right) = pcm::deinterleave(chunk, channels);
                    self.encoder.encode(&left, right.as_deref(), samples, &mut out)?
                }
            };
            write_chunk(sink, &out[..written])?;
            bytes_written += written as u64;
            frames += 1;
        }

        let flushed = self.encoder.flush(&mut out)?;
        write_chunk(sink, &out[..flushed])?;
        bytes_written += flushed as u64;
        sink.flush()
            .map_err(|e| EncoderError::Storage(format!("failed to flush output: {}", e)))?;

        log::debug!(
            "session {} encoded {} chunks into {} bytes",
            self.encoder.handle(),
            frames,
            bytes_written
        );

        Ok(EncodeSummary {
            bytes_written,
            frames,
            flushed_bytes: flushed,
            stats: self.encoder.stats(),
        })
    }
}

impl<F: EngineFactory> StreamEncoder<'_, F> {
    /// Largest frame size, up to the requested one, whose output buffer one
    /// engine call can address.
    fn call_frame_samples(&self) -> Result<usize, EncoderError> {
        let config = self.encoder.config();
        let mut frame_samples = self.frame_samples;
        while buffer::session_output_capacity(config, frame_samples) > buffer::MAX_CALL_CAPACITY {
            if frame_samples == 1 {
                return Err(EncoderError::InputTooLong { samples: 1 });
            }
            frame_samples /= 2;
        }
        Ok(frame_samples)
    }
}

fn write_chunk<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<(), EncoderError> {
    if bytes.is_empty() {
        return Ok(());
    }
    sink.write_all(bytes)
        .map_err(|e| EncoderError::Storage(format!("write failed: {}", e)))
}
