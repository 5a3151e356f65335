use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::EncoderConfiguration;
use super::stats::SessionStats;

/// Outcome of driving a session over a whole PCM buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSummary {
    pub bytes_written: u64,
    /// Number of engine calls made, flush excluded.
    pub frames: u64,
    pub flushed_bytes: usize,
    pub stats: SessionStats,
}

/// Metadata stored alongside an encoded stream.
///
/// Serializable for JSON export next to the MP3 file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: PathBuf,
    pub checksum: String,
    pub byte_count: u64,
    pub duration_secs: f64,
    pub configuration: EncoderConfiguration,
    pub stats: SessionStats,
}

impl StreamMetadata {
    pub fn new(
        file_path: PathBuf,
        checksum: String,
        configuration: EncoderConfiguration,
        stats: SessionStats,
    ) -> Self {
        let duration_secs =
            stats.samples_encoded as f64 / f64::from(configuration.input_sample_rate_hz());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path,
            checksum,
            byte_count: stats.bytes_emitted,
            duration_secs,
            configuration,
            stats,
        }
    }
}
