//! Deterministic in-process engine used by the core test suites.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::EncoderConfiguration;
use crate::models::error::EncoderError;
use crate::traits::codec_engine::{CodecEngine, EngineFactory};

/// Samples per channel that make up one emitted frame.
pub const FAKE_FRAME_SAMPLES: usize = 1152;
/// Bytes emitted per completed frame.
pub const FAKE_FRAME_BYTES: usize = 417;

/// Shared observation and scripting point between a factory and its engines.
#[derive(Default)]
pub struct FakeControl {
    pub created: AtomicUsize,
    pub destroyed: AtomicUsize,
    pub engine_calls: AtomicUsize,
    pub logging: AtomicBool,
    pub fail_create: AtomicBool,
    scripted: Mutex<VecDeque<i32>>,
    configs: Mutex<Vec<EncoderConfiguration>>,
}

impl FakeControl {
    /// The next engine call on any instance returns `code` instead of encoding.
    pub fn script(&self, code: i32) {
        self.scripted.lock().push_back(code);
    }

    pub fn configs(&self) -> Vec<EncoderConfiguration> {
        self.configs.lock().clone()
    }

    pub fn live(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.destroyed.load(Ordering::SeqCst)
    }

    fn next_scripted(&self) -> Option<i32> {
        self.scripted.lock().pop_front()
    }
}

#[derive(Clone, Default)]
pub struct FakeEngineFactory {
    pub control: Arc<FakeControl>,
}

impl FakeEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EngineFactory for FakeEngineFactory {
    type Engine = FakeEngine;

    fn create(&self, config: &EncoderConfiguration) -> Result<FakeEngine, EncoderError> {
        if self.control.fail_create.load(Ordering::SeqCst) {
            return Err(EncoderError::EngineCreation("scripted failure".into()));
        }
        self.control.created.fetch_add(1, Ordering::SeqCst);
        self.control.configs.lock().push(config.clone());
        Ok(FakeEngine {
            control: Arc::clone(&self.control),
            channels: config.channel_count(),
            seed: config.output_bitrate_kbps() as u8 ^ config.quality().value(),
            pending: Vec::new(),
        })
    }

    fn set_logging(&self, enabled: bool) {
        self.control.logging.store(enabled, Ordering::SeqCst);
    }
}

/// Buffers frames of input and emits [`FAKE_FRAME_BYTES`] bytes per
/// completed frame. Output bytes depend only on configuration and input.
pub struct FakeEngine {
    control: Arc<FakeControl>,
    channels: usize,
    seed: u8,
    pending: Vec<i16>,
}

impl FakeEngine {
    fn consume(&mut self, frames: impl Iterator<Item = [i16; 2]>, output: &mut [u8]) -> i32 {
        for [left, right] in frames {
            self.pending.push(left);
            if self.channels == 2 {
                self.pending.push(right);
            }
        }
        let frame_len = FAKE_FRAME_SAMPLES * self.channels;
        let ready = self.pending.len() / frame_len;
        self.emit(ready * frame_len, output)
    }

    fn emit(&mut self, sample_len: usize, output: &mut [u8]) -> i32 {
        let frames = sample_len.div_ceil(FAKE_FRAME_SAMPLES * self.channels);
        let bytes = frames * FAKE_FRAME_BYTES;
        if bytes > output.len() {
            return -1;
        }
        let checksum = self.pending[..sample_len]
            .iter()
            .fold(self.seed, |acc, s| acc.wrapping_add(*s as u8));
        for (i, byte) in output[..bytes].iter_mut().enumerate() {
            *byte = checksum.wrapping_add(i as u8);
        }
        self.pending.drain(..sample_len);
        bytes as i32
    }
}

impl CodecEngine for FakeEngine {
    fn encode(&mut self, left: &[i16], right: Option<&[i16]>, output: &mut [u8]) -> i32 {
        self.control.engine_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.control.next_scripted() {
            return code;
        }
        let frames = left.iter().enumerate().map(|(i, l)| {
            let r = right.map_or(0, |r| r[i]);
            [*l, r]
        });
        self.consume(frames, output)
    }

    fn encode_interleaved(
        &mut self,
        pcm: &[i16],
        samples_per_channel: usize,
        output: &mut [u8],
    ) -> i32 {
        self.control.engine_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.control.next_scripted() {
            return code;
        }
        let channels = self.channels;
        let frames = pcm
            .chunks_exact(channels)
            .take(samples_per_channel)
            .map(|frame| [frame[0], frame.get(1).copied().unwrap_or(0)]);
        self.consume(frames, output)
    }

    fn flush(&mut self, output: &mut [u8]) -> i32 {
        self.control.engine_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(code) = self.control.next_scripted() {
            return code;
        }
        let remaining = self.pending.len();
        self.emit(remaining, output)
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.control.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn stereo_config() -> EncoderConfiguration {
    EncoderConfiguration::builder(44_100, 2, 44_100, 128)
        .quality(5)
        .build()
        .unwrap()
}

pub fn mono_config() -> EncoderConfiguration {
    EncoderConfiguration::builder(16_000, 1, 16_000, 32)
        .build()
        .unwrap()
}
