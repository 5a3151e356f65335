//! libmp3lame engine instances.

use std::ffi::{c_int, c_void, CString};
use std::ptr::NonNull;

use mp3lame_sys as ffi;

use lame_session_core::models::config::{ChannelMode, EncoderConfiguration};
use lame_session_core::models::error::EncoderError;
use lame_session_core::traits::codec_engine::{CodecEngine, EngineFactory};
use lame_session_core::contract::return_code::engine_capacity;
use lame_session_core::EngineFailure;

use crate::logging::{self, boundary};

/// One `lame_global_flags` instance, configured and initialised.
///
/// The pointer is owned exclusively and closed on drop.
pub struct LameEngine {
    gfp: NonNull<c_void>,
    channels: ChannelMode,
}

// SAFETY: the LAME state is only reached through `&mut self`, and the
// session registry keeps each instance behind its own mutex. LAME keeps no
// thread-affine state, so moving an instance between threads is sound.
unsafe impl Send for LameEngine {}

/// Sample count as the engine's `int` argument, or `None` past `c_int::MAX`.
///
/// No output buffer LAME can address holds that many samples, so callers
/// answer `None` with the buffer-too-small code rather than a shorter call.
fn c_samples(len: usize) -> Option<c_int> {
    c_int::try_from(len).ok()
}

fn c_param(name: &str, value: u32) -> Result<c_int, EncoderError> {
    c_int::try_from(value)
        .map_err(|_| EncoderError::EngineCreation(format!("{name} {value} is out of range")))
}

fn check_setter(name: &str, code: c_int) -> Result<(), EncoderError> {
    if code < 0 {
        return Err(EncoderError::EngineCreation(format!("{name} rejected with code {code}")));
    }
    Ok(())
}

impl LameEngine {
    pub fn new(config: &EncoderConfiguration) -> Result<Self, EncoderError> {
        // SAFETY: lame_init has no preconditions; a null return is handled.
        let raw = unsafe { ffi::lame_init() };
        let gfp = NonNull::new(raw.cast::<c_void>())
            .ok_or_else(|| EncoderError::EngineCreation("lame_init returned null".into()))?;

        // From here on Drop closes the instance if configuration fails.
        let engine = Self {
            gfp,
            channels: config.output_channels(),
        };
        engine.configure(config)?;
        Ok(engine)
    }

    fn configure(&self, config: &EncoderConfiguration) -> Result<(), EncoderError> {
        let in_rate = c_param("input sample rate", config.input_sample_rate_hz())?;
        let out_rate = c_param("output sample rate", config.output_sample_rate_hz())?;
        let bitrate = c_param("bitrate", config.output_bitrate_kbps())?;
        let channels = config.channel_count() as c_int;
        let quality = c_int::from(config.quality().value());

        boundary!(
            "lame_init in={} ch={} out={} kbps={} q={}",
            in_rate,
            channels,
            out_rate,
            bitrate,
            quality
        );

        let gfp = self.gfp.as_ptr();
        // SAFETY: gfp is a live instance from lame_init. Tag strings are
        // NUL-terminated and LAME copies them before returning.
        unsafe {
            check_setter("in_samplerate", ffi::lame_set_in_samplerate(gfp.cast(), in_rate))?;
            check_setter("num_channels", ffi::lame_set_num_channels(gfp.cast(), channels))?;
            check_setter("out_samplerate", ffi::lame_set_out_samplerate(gfp.cast(), out_rate))?;
            check_setter("brate", ffi::lame_set_brate(gfp.cast(), bitrate))?;
            check_setter("quality", ffi::lame_set_quality(gfp.cast(), quality))?;

            let id3 = config.id3();
            if !id3.is_empty() {
                ffi::id3tag_init(gfp.cast());
                if let Some(title) = tag(&id3.title)? {
                    ffi::id3tag_set_title(gfp.cast(), title.as_ptr());
                }
                if let Some(artist) = tag(&id3.artist)? {
                    ffi::id3tag_set_artist(gfp.cast(), artist.as_ptr());
                }
                if let Some(album) = tag(&id3.album)? {
                    ffi::id3tag_set_album(gfp.cast(), album.as_ptr());
                }
                if let Some(year) = tag(&id3.year)? {
                    ffi::id3tag_set_year(gfp.cast(), year.as_ptr());
                }
                if let Some(comment) = tag(&id3.comment)? {
                    ffi::id3tag_set_comment(gfp.cast(), comment.as_ptr());
                }
            }

            let code = ffi::lame_init_params(gfp.cast());
            if code < 0 {
                return Err(EncoderError::EngineCreation(format!(
                    "lame_init_params failed with code {code}"
                )));
            }
        }
        Ok(())
    }

    fn encode_planar(&mut self, left: &[i16], right: &[i16], output: &mut [u8]) -> i32 {
        // lame_encode_buffer reads exactly nsamples from each channel.
        let Some(samples) = c_samples(left.len().min(right.len())) else {
            return EngineFailure::BufferTooSmall.raw();
        };
        // SAFETY: both channel slices hold `samples` values, and LAME
        // writes at most `mp3buf_size` bytes into `output`.
        unsafe {
            ffi::lame_encode_buffer(
                self.gfp.as_ptr().cast(),
                left.as_ptr(),
                right.as_ptr(),
                samples,
                output.as_mut_ptr(),
                engine_capacity(output.len()),
            )
        }
    }
}

fn tag(value: &Option<String>) -> Result<Option<CString>, EncoderError> {
    value
        .as_deref()
        .map(|text| {
            CString::new(text)
                .map_err(|e| EncoderError::Configuration(format!("invalid id3 text: {e}")))
        })
        .transpose()
}

impl CodecEngine for LameEngine {
    fn encode(&mut self, left: &[i16], right: Option<&[i16]>, output: &mut [u8]) -> i32 {
        // A zero mp3buf_size means "unbounded" to LAME.
        if output.is_empty() {
            return EngineFailure::BufferTooSmall.raw();
        }
        // Mono instances never read the right channel.
        let right = right.unwrap_or(left);
        let code = self.encode_planar(left, right, output);
        boundary!("lame_encode_buffer samples={} cap={} -> {}", left.len(), output.len(), code);
        code
    }

    fn encode_interleaved(
        &mut self,
        pcm: &[i16],
        samples_per_channel: usize,
        output: &mut [u8],
    ) -> i32 {
        if output.is_empty() {
            return EngineFailure::BufferTooSmall.raw();
        }
        let code = match self.channels {
            // lame_encode_buffer_interleaved always assumes two channels.
            ChannelMode::Mono => {
                let mono = &pcm[..samples_per_channel.min(pcm.len())];
                self.encode_planar(mono, mono, output)
            }
            ChannelMode::Stereo => {
                let Some(frames) = c_samples(samples_per_channel.min(pcm.len() / 2)) else {
                    return EngineFailure::BufferTooSmall.raw();
                };
                // SAFETY: pcm holds 2 * frames samples. LAME takes the
                // buffer as non-const but does not write to it.
                unsafe {
                    ffi::lame_encode_buffer_interleaved(
                        self.gfp.as_ptr().cast(),
                        pcm.as_ptr() as *mut _,
                        frames,
                        output.as_mut_ptr(),
                        engine_capacity(output.len()),
                    )
                }
            }
        };
        boundary!(
            "lame_encode_buffer_interleaved samples={} cap={} -> {}",
            samples_per_channel,
            output.len(),
            code
        );
        code
    }

    fn flush(&mut self, output: &mut [u8]) -> i32 {
        if output.is_empty() {
            return EngineFailure::BufferTooSmall.raw();
        }
        // SAFETY: LAME writes at most `mp3buf_size` bytes into `output`.
        let code = unsafe {
            ffi::lame_encode_flush(
                self.gfp.as_ptr().cast(),
                output.as_mut_ptr(),
                engine_capacity(output.len()),
            )
        };
        boundary!("lame_encode_flush cap={} -> {}", output.len(), code);
        code
    }
}

impl Drop for LameEngine {
    fn drop(&mut self) {
        // SAFETY: gfp came from lame_init and is closed exactly once here.
        let code = unsafe { ffi::lame_close(self.gfp.as_ptr().cast()) };
        boundary!("lame_close -> {}", code);
    }
}

/// Builds [`LameEngine`] instances. Stateless; the logging switch it
/// controls is process-wide.
#[derive(Debug, Clone, Copy, Default)]
pub struct LameEngineFactory;

impl EngineFactory for LameEngineFactory {
    type Engine = LameEngine;

    fn create(&self, config: &EncoderConfiguration) -> Result<LameEngine, EncoderError> {
        LameEngine::new(config)
    }

    fn set_logging(&self, enabled: bool) {
        logging::set_enabled(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lame_session_core::processing::pcm;
    use lame_session_core::{output_buffer_for, Encoder, SessionRegistry, FLUSH_OUTPUT_CAPACITY};

    fn registry() -> Arc<SessionRegistry<LameEngineFactory>> {
        Arc::new(SessionRegistry::new(LameEngineFactory))
    }

    #[test]
    fn sample_counts_past_c_int_are_refused() {
        assert_eq!(c_samples(1152), Some(1152));
        assert_eq!(c_samples(c_int::MAX as usize), Some(c_int::MAX));
        assert_eq!(c_samples(c_int::MAX as usize + 1), None);
    }

    fn stereo_config() -> EncoderConfiguration {
        EncoderConfiguration::builder(44_100, 2, 44_100, 128)
            .quality(5)
            .build()
            .unwrap()
    }

    fn tone(frames: usize) -> (Vec<i16>, Vec<i16>) {
        let left = (0..frames).map(|i| ((i * 97) % 4000) as i16 - 2000).collect();
        let right = (0..frames).map(|i| ((i * 31) % 3000) as i16 - 1500).collect();
        (left, right)
    }

    fn drain(encoder: &mut Encoder<LameEngineFactory>, mut bytes: Vec<u8>) -> Vec<u8> {
        let mut out = vec![0u8; FLUSH_OUTPUT_CAPACITY];
        let n = encoder.flush(&mut out).unwrap();
        bytes.extend_from_slice(&out[..n]);
        bytes
    }

    #[test]
    fn silence_at_minimum_capacity() {
        let registry = registry();
        let mut encoder = Encoder::open(Arc::clone(&registry), stereo_config()).unwrap();
        let zeros = vec![0i16; 1152];
        let mut out = output_buffer_for(1152);
        assert_eq!(out.len(), 8640);

        let written = encoder.encode(&zeros, Some(&zeros), 1152, &mut out).unwrap();
        assert!(written <= out.len());
        encoder.close().unwrap();
        assert_eq!(registry.live_sessions(), 0);
    }

    #[test]
    fn flush_twice_does_not_error() {
        let mut encoder = Encoder::open(registry(), stereo_config()).unwrap();
        let (left, right) = tone(4096);
        let mut out = output_buffer_for(4096);
        encoder.encode(&left, Some(&right), 4096, &mut out).unwrap();

        let mut tail = vec![0u8; FLUSH_OUTPUT_CAPACITY];
        let first = encoder.flush(&mut tail).unwrap();
        assert!(first > 0);
        assert_eq!(encoder.flush(&mut tail).unwrap(), 0);
    }

    #[test]
    fn interleaved_matches_planar() {
        let registry = registry();
        let (left, right) = tone(5000);
        let interleaved = pcm::interleave(&left, &right);

        let mut planar = Encoder::open(Arc::clone(&registry), stereo_config()).unwrap();
        let mut out = output_buffer_for(5000);
        let n = planar.encode(&left, Some(&right), 5000, &mut out).unwrap();
        let planar_bytes = drain(&mut planar, out[..n].to_vec());

        let mut packed = Encoder::open(Arc::clone(&registry), stereo_config()).unwrap();
        let n = packed.encode_interleaved(&interleaved, 5000, &mut out).unwrap();
        let packed_bytes = drain(&mut packed, out[..n].to_vec());

        assert!(!planar_bytes.is_empty());
        assert_eq!(planar_bytes, packed_bytes);
    }

    #[test]
    fn undersized_buffer_then_retry() {
        let mut encoder = Encoder::open(registry(), stereo_config()).unwrap();
        let (left, right) = tone(1152);
        let mut small = vec![0u8; 100];
        let err = encoder.encode(&left, Some(&right), 1152, &mut small).unwrap_err();
        assert_eq!(
            err,
            EncoderError::BufferTooSmall {
                required: 8640,
                provided: 100
            }
        );
        assert!(err.is_retryable());

        let mut out = output_buffer_for(1152);
        assert!(encoder.encode(&left, Some(&right), 1152, &mut out).is_ok());
    }

    #[test]
    fn mono_without_right_channel() {
        let config = EncoderConfiguration::builder(16_000, 1, 16_000, 32).build().unwrap();
        let mut encoder = Encoder::open(registry(), config).unwrap();
        let (samples, _) = tone(3200);
        let mut out = output_buffer_for(3200);
        encoder.encode(&samples, None, 3200, &mut out).unwrap();
        encoder.encode_interleaved(&samples, 3200, &mut out).unwrap();

        let bytes = drain(&mut encoder, Vec::new());
        assert!(!bytes.is_empty());
    }

    #[test]
    fn id3_tags_extend_stream() {
        let registry = registry();
        let (left, right) = tone(4608);
        let mut out = output_buffer_for(4608);

        let mut plain = Encoder::open(Arc::clone(&registry), stereo_config()).unwrap();
        let n = plain.encode(&left, Some(&right), 4608, &mut out).unwrap();
        let plain_bytes = drain(&mut plain, out[..n].to_vec());

        let tagged_config = EncoderConfiguration::builder(44_100, 2, 44_100, 128)
            .quality(5)
            .id3_title("Boundary")
            .id3_artist("Tester")
            .build()
            .unwrap();
        let mut tagged = Encoder::open(Arc::clone(&registry), tagged_config).unwrap();
        let n = tagged.encode(&left, Some(&right), 4608, &mut out).unwrap();
        let tagged_bytes = drain(&mut tagged, out[..n].to_vec());

        assert!(tagged_bytes.len() > plain_bytes.len());
    }

    fn encode_at_contract_capacity(in_rate: u32, out_rate: u32, kbps: u32, frames: usize) {
        let config = EncoderConfiguration::builder(in_rate, 2, out_rate, kbps)
            .build()
            .unwrap();
        let mut encoder = Encoder::open(registry(), config).unwrap();
        let (left, right) = tone(frames);
        let mut out = encoder.output_buffer(frames);

        let written = encoder.encode(&left, Some(&right), frames, &mut out);
        assert!(written.is_ok(), "{in_rate} -> {out_rate} Hz at {kbps} kbps: {written:?}");
        let written = encoder
            .encode_interleaved(&pcm::interleave(&left, &right), frames, &mut out)
            .unwrap();
        assert!(written <= out.len());
    }

    #[test]
    fn upsampled_stream_fits_contract_buffer() {
        encode_at_contract_capacity(8_000, 48_000, 320, 100_000);
        encode_at_contract_capacity(8_000, 44_100, 320, 20_000);
        encode_at_contract_capacity(16_000, 48_000, 320, 1152);
    }

    #[test]
    fn upsampling_session_needs_more_than_base_formula() {
        let config = EncoderConfiguration::builder(8_000, 2, 48_000, 320)
            .build()
            .unwrap();
        let mut encoder = Encoder::open(registry(), config).unwrap();
        let (left, right) = tone(100_000);
        let mut base = output_buffer_for(100_000);

        let err = encoder
            .encode(&left, Some(&right), 100_000, &mut base)
            .unwrap_err();
        let EncoderError::BufferTooSmall { required, provided } = err else {
            panic!("expected BufferTooSmall, got {err:?}");
        };
        assert_eq!(provided, 132_200);
        assert!(required > provided);

        let mut enlarged = vec![0u8; required];
        assert!(encoder.encode(&left, Some(&right), 100_000, &mut enlarged).is_ok());
    }

    #[test]
    fn direct_empty_output_is_too_small() {
        let mut engine = LameEngine::new(&stereo_config()).unwrap();
        let (left, right) = tone(16);
        assert_eq!(engine.encode(&left, Some(&right), &mut []), -1);
        assert_eq!(engine.flush(&mut []), -1);
    }

    #[test]
    fn logging_toggle_is_process_wide() {
        let _guard = logging::TEST_LOCK.lock();
        let factory = LameEngineFactory;
        factory.set_logging(true);
        assert!(logging::is_enabled());
        factory.set_logging(false);
        assert!(!logging::is_enabled());
    }
}
