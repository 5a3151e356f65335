use std::sync::Arc;

use anyhow::{bail, Context, Result};

use lame_session_core::processing::{pcm, wav_format};
use lame_session_core::storage::metadata;
use lame_session_core::{
    EncoderConfiguration, EncoderSettings, Id3Metadata, InputLayout, Mp3FileWriter, StreamEncoder,
    StreamMetadata, WavInfo,
};
use lame_session_mp3lame::{default_registry, LameEncoder};

use crate::cli::Args;

const DEFAULT_BITRATE_KBPS: u32 = 128;

/// Merge the settings file, the WAV format and command-line flags.
pub fn resolve_settings(args: &Args, wav: &WavInfo) -> Result<EncoderSettings> {
    let mut settings = match &args.config {
        Some(path) => EncoderSettings::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EncoderSettings {
            input_sample_rate_hz: wav.sample_rate,
            output_channels: u32::from(wav.channels),
            output_sample_rate_hz: wav.sample_rate,
            output_bitrate_kbps: DEFAULT_BITRATE_KBPS,
            quality: None,
            id3: Id3Metadata::default(),
        },
    };

    if settings.input_sample_rate_hz != wav.sample_rate {
        log::warn!(
            "settings input rate {} Hz differs from {} Hz in {}; using the file rate",
            settings.input_sample_rate_hz,
            wav.sample_rate,
            args.input.display()
        );
        settings.input_sample_rate_hz = wav.sample_rate;
    }
    if args.mono {
        settings.output_channels = 1;
    }
    if let Some(bitrate) = args.bitrate {
        settings.output_bitrate_kbps = bitrate;
    }
    if let Some(quality) = args.quality {
        settings.quality = Some(quality);
    }
    if let Some(rate) = args.out_rate {
        settings.output_sample_rate_hz = rate;
    }

    let id3 = &mut settings.id3;
    for (field, value) in [
        (&mut id3.title, &args.title),
        (&mut id3.artist, &args.artist),
        (&mut id3.album, &args.album),
        (&mut id3.year, &args.year),
        (&mut id3.comment, &args.comment),
    ] {
        if value.is_some() {
            field.clone_from(value);
        }
    }

    Ok(settings)
}

/// Bring interleaved WAV samples to the channel count of the stream.
pub fn match_channels(samples: Vec<i16>, from: usize, to: usize) -> Result<Vec<i16>> {
    match (from, to) {
        (a, b) if a == b => Ok(samples),
        (2, 1) => Ok(pcm::downmix_to_mono(&samples, 2)),
        (1, 2) => Ok(pcm::interleave(&samples, &samples)),
        _ => bail!("cannot map {from} input channels to {to} output channels"),
    }
}

pub fn run(args: &Args) -> Result<()> {
    let registry = default_registry();
    registry.set_logging(args.engine_log);

    let (wav, samples) = wav_format::read_wav(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    log::info!(
        "input {}: {} Hz, {} ch, {} frames",
        args.input.display(),
        wav.sample_rate,
        wav.channels,
        wav.frames()
    );

    let settings = resolve_settings(args, &wav)?;
    if let Some(path) = &args.save_config {
        settings.save(path).with_context(|| format!("saving {}", path.display()))?;
        log::info!("settings written to {}", path.display());
    }
    let config = EncoderConfiguration::try_from(settings).context("invalid encoder settings")?;
    let samples = match_channels(samples, usize::from(wav.channels), config.channel_count())?;

    let mut encoder = LameEncoder::open(Arc::clone(registry), config.clone())?;
    let mut writer = Mp3FileWriter::create(&args.output)?;

    let layout = if args.planar {
        InputLayout::Planar
    } else {
        InputLayout::Interleaved
    };
    let summary = StreamEncoder::new(&mut encoder)
        .frame_samples(args.frame_samples)
        .layout(layout)
        .encode_all(&samples, &mut writer)?;
    let stats = encoder.close()?;
    let checksum = writer.close()?;

    log::info!(
        "wrote {} bytes to {} ({} engine calls, {} flushed)",
        summary.bytes_written,
        args.output.display(),
        summary.frames,
        summary.flushed_bytes
    );

    if !args.no_metadata {
        let meta = StreamMetadata::new(args.output.clone(), checksum, config, stats);
        let path = metadata::write_metadata(&meta, &args.output)?;
        log::info!("metadata written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use clap::Parser;

    fn wav(sample_rate: u32, channels: u16) -> WavInfo {
        WavInfo {
            sample_rate,
            channels,
            bits_per_sample: 16,
            data_offset: 44,
            data_len: 0,
        }
    }

    fn wav_file(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let block_align = channels * 2;
        let mut bytes = b"RIFF".to_vec();
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt \x10\0\0\0\x01\0");
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        bytes.extend_from_slice(&block_align.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend(samples.iter().flat_map(|s| s.to_le_bytes()));
        bytes
    }

    #[test]
    fn defaults_follow_input_format() {
        let args = Args::parse_from(["lame-session", "in.wav", "out.mp3"]);
        let settings = resolve_settings(&args, &wav(48_000, 2)).unwrap();
        assert_eq!(settings.input_sample_rate_hz, 48_000);
        assert_eq!(settings.output_sample_rate_hz, 48_000);
        assert_eq!(settings.output_channels, 2);
        assert_eq!(settings.output_bitrate_kbps, 128);
        assert_eq!(settings.quality, None);
        assert!(settings.id3.is_empty());
    }

    #[test]
    fn flags_override() {
        let args = Args::parse_from([
            "lame-session",
            "in.wav",
            "out.mp3",
            "--mono",
            "-b",
            "64",
            "-q",
            "2",
            "--out-rate",
            "22050",
            "--title",
            "Flags",
        ]);
        let settings = resolve_settings(&args, &wav(44_100, 2)).unwrap();
        assert_eq!(settings.output_channels, 1);
        assert_eq!(settings.output_bitrate_kbps, 64);
        assert_eq!(settings.quality, Some(2));
        assert_eq!(settings.output_sample_rate_hz, 22_050);
        assert_eq!(settings.id3.title.as_deref(), Some("Flags"));
        assert_eq!(settings.id3.artist, None);
    }

    #[test]
    fn channel_mapping() {
        assert_eq!(match_channels(vec![10, 30], 2, 1).unwrap(), vec![20]);
        assert_eq!(match_channels(vec![5, 6], 1, 2).unwrap(), vec![5, 5, 6, 6]);
        assert_eq!(match_channels(vec![1, 2], 2, 2).unwrap(), vec![1, 2]);
        assert!(match_channels(vec![0; 6], 3, 2).is_err());
    }

    #[test]
    fn end_to_end_writes_stream_and_sidecar() {
        let dir = std::env::temp_dir().join("lame_session_cli_e2e");
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("tone.wav");
        let output = dir.join("tone.mp3");
        let tone: Vec<i16> = (0..44_100 * 2).map(|i| ((i * 41) % 6000) as i16 - 3000).collect();
        std::fs::write(&input, wav_file(44_100, 2, &tone)).unwrap();

        let args = Args::parse_from([
            OsString::from("lame-session"),
            input.clone().into_os_string(),
            output.clone().into_os_string(),
            OsString::from("--artist"),
            OsString::from("Cli"),
        ]);
        run(&args).unwrap();

        let meta = metadata::read_metadata(&output).unwrap();
        assert_eq!(meta.byte_count, std::fs::metadata(&output).unwrap().len());
        let checksum = lame_session_core::storage::stream_writer::sha256_file(&output).unwrap();
        assert_eq!(meta.checksum, checksum);
        assert_eq!(meta.stats.samples_encoded, 44_100);
        assert!((meta.duration_secs - 1.0).abs() < 1e-9);

        std::fs::remove_dir_all(&dir).ok();
    }
}
