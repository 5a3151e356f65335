use std::path::PathBuf;

use clap::Parser;

/// Encode a 16-bit PCM WAV file to MP3.
#[derive(Debug, Parser)]
#[command(name = "lame-session", version, about)]
pub struct Args {
    /// Input WAV file (16-bit PCM, mono or stereo)
    pub input: PathBuf,

    /// Output MP3 file
    pub output: PathBuf,

    /// Encoder settings JSON; flags given on the command line override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the resolved settings as JSON and continue
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,

    /// Output bitrate in kbps [default: 128]
    #[arg(short, long)]
    pub bitrate: Option<u32>,

    /// Encoder quality, 0 (best) to 9 (fastest) [default: 7]
    #[arg(short, long)]
    pub quality: Option<u8>,

    /// Output sample rate in Hz [default: input rate]
    #[arg(long)]
    pub out_rate: Option<u32>,

    /// Downmix to a mono stream
    #[arg(long)]
    pub mono: bool,

    /// Samples per channel handed to the encoder per call
    #[arg(long, default_value_t = lame_session_core::DEFAULT_FRAME_SAMPLES)]
    pub frame_samples: usize,

    /// Feed the planar entry point instead of the interleaved one
    #[arg(long)]
    pub planar: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub artist: Option<String>,

    #[arg(long)]
    pub album: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub comment: Option<String>,

    /// Log every call crossing into libmp3lame (needs RUST_LOG=debug)
    #[arg(long)]
    pub engine_log: bool,

    /// Skip the `.metadata.json` sidecar
    #[arg(long)]
    pub no_metadata: bool,
}
