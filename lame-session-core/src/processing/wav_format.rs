//! WAV input parsing.
//!
//! Accepts RIFF/WAVE files carrying 16-bit little-endian PCM (format code
//! 1) in one or two channels. Chunks other than `fmt ` and `data` are
//! skipped.

use std::fs;
use std::path::Path;

use crate::models::error::EncoderError;
use crate::processing::pcm;

/// Format of a parsed WAV file and where its samples live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub data_offset: usize,
    pub data_len: usize,
}

impl WavInfo {
    /// Frames (samples per channel) in the data chunk.
    pub fn frames(&self) -> usize {
        let frame_bytes = usize::from(self.channels) * usize::from(self.bits_per_sample / 8);
        if frame_bytes == 0 {
            return 0;
        }
        self.data_len / frame_bytes
    }
}

fn format_error(message: impl Into<String>) -> EncoderError {
    EncoderError::Storage(format!("unsupported wav input: {}", message.into()))
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Parse the RIFF chunk list of an in-memory WAV file.
///
/// A data chunk that claims more bytes than the file holds is truncated to
/// what is present.
pub fn parse_wav(bytes: &[u8]) -> Result<WavInfo, EncoderError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(format_error("missing RIFF/WAVE magic"));
    }

    let mut format: Option<(u16, u16, u32, u16)> = None;
    let mut offset = 12;
    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = read_u32(bytes, offset + 4) as usize;
        let body = offset + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(format_error("truncated fmt chunk"));
                }
                format = Some((
                    read_u16(bytes, body),
                    read_u16(bytes, body + 2),
                    read_u32(bytes, body + 4),
                    read_u16(bytes, body + 14),
                ));
            }
            b"data" => {
                let (code, channels, sample_rate, bits_per_sample) =
                    format.ok_or_else(|| format_error("data chunk before fmt chunk"))?;
                if code != 1 {
                    return Err(format_error(format!("format code {code} is not PCM")));
                }
                if bits_per_sample != 16 {
                    return Err(format_error(format!("{bits_per_sample}-bit samples")));
                }
                if !(1..=2).contains(&channels) {
                    return Err(format_error(format!("{channels} channels")));
                }
                if sample_rate == 0 {
                    return Err(format_error("zero sample rate"));
                }
                let data_len = size.min(bytes.len() - body);
                return Ok(WavInfo {
                    sample_rate,
                    channels,
                    bits_per_sample,
                    data_offset: body,
                    data_len,
                });
            }
            _ => {}
        }

        // Chunks are padded to an even size.
        offset = body.saturating_add(size).saturating_add(size & 1);
    }

    Err(format_error("no data chunk"))
}

/// Read a WAV file and return its format and interleaved samples.
pub fn read_wav(path: &Path) -> Result<(WavInfo, Vec<i16>), EncoderError> {
    let bytes = fs::read(path)
        .map_err(|e| EncoderError::Storage(format!("failed to read {}: {}", path.display(), e)))?;
    let info = parse_wav(&bytes)?;
    let data = &bytes[info.data_offset..info.data_offset + info.data_len];
    Ok((info, pcm::samples_from_le_bytes(data)))
}
