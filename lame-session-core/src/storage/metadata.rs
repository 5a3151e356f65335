use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::EncoderError;
use crate::models::stream_metadata::StreamMetadata;

/// Sidecar location for an encoded stream: `{stem}.metadata.json`.
pub fn metadata_path(stream_path: &Path) -> PathBuf {
    stream_path.with_extension("metadata.json")
}

/// Write stream metadata as a JSON sidecar file next to the stream.
pub fn write_metadata(
    metadata: &StreamMetadata,
    stream_path: &Path,
) -> Result<PathBuf, EncoderError> {
    let path = metadata_path(stream_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| EncoderError::Storage(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| EncoderError::Storage(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read stream metadata from its JSON sidecar file.
pub fn read_metadata(stream_path: &Path) -> Result<StreamMetadata, EncoderError> {
    let json = fs::read_to_string(metadata_path(stream_path))
        .map_err(|e| EncoderError::Storage(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| EncoderError::Storage(format!("failed to parse metadata: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::EncoderConfiguration;
    use crate::models::stats::SessionStats;

    #[test]
    fn sidecar_roundtrip() {
        let stream = std::env::temp_dir().join("lame_session_meta_test.mp3");
        let config = EncoderConfiguration::builder(44_100, 2, 44_100, 128)
            .quality(2)
            .id3_title("Roundtrip")
            .build()
            .unwrap();
        let stats = SessionStats {
            encode_calls: 3,
            samples_encoded: 88_200,
            bytes_emitted: 32_000,
            flushes: 1,
        };
        let metadata = StreamMetadata::new(stream.clone(), "ab".repeat(32), config, stats);
        assert!((metadata.duration_secs - 2.0).abs() < 1e-9);

        let written = write_metadata(&metadata, &stream).unwrap();
        assert_eq!(written, std::env::temp_dir().join("lame_session_meta_test.metadata.json"));

        let loaded = read_metadata(&stream).unwrap();
        assert_eq!(loaded, metadata);

        fs::remove_file(&written).ok();
    }

    #[test]
    fn missing_sidecar_is_storage_error() {
        let stream = std::env::temp_dir().join("lame_session_no_such_stream.mp3");
        assert!(matches!(read_metadata(&stream), Err(EncoderError::Storage(_))));
    }
}
