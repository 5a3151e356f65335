use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::EncoderError;

/// Streaming MP3 file writer that hashes everything it writes.
///
/// The SHA-256 digest is accumulated as bytes arrive, so `close` does not
/// re-read the file. Implements [`io::Write`] so it can be handed
/// directly to a stream encoder.
pub struct Mp3FileWriter {
    file_path: PathBuf,
    file: Option<File>,
    hasher: Sha256,
    total_bytes_written: u64,
}

impl Mp3FileWriter {
    /// Create the output file, creating parent directories as needed.
    pub fn create(file_path: impl Into<PathBuf>) -> Result<Self, EncoderError> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    EncoderError::Storage(format!("failed to create directory: {}", e))
                })?;
            }
        }

        let file = File::create(&file_path)
            .map_err(|e| EncoderError::Storage(format!("failed to create file: {}", e)))?;

        Ok(Self {
            file_path,
            file: Some(file),
            hasher: Sha256::new(),
            total_bytes_written: 0,
        })
    }

    /// Append encoded bytes.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), EncoderError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| EncoderError::Storage("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| EncoderError::Storage(format!("write failed: {}", e)))?;
        self.hasher.update(data);
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush and close the file, returning the hex SHA-256 of its contents.
    pub fn close(&mut self) -> Result<String, EncoderError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| EncoderError::Storage("file is not open".into()))?;
        file.flush().map_err(|e| EncoderError::Storage(e.to_string()))?;
        file.sync_all().map_err(|e| EncoderError::Storage(e.to_string()))?;

        let digest = std::mem::take(&mut self.hasher).finalize();
        Ok(hex_encode(&digest))
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl Write for Mp3FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// Compute the SHA-256 hex digest of a file on disk.
pub fn sha256_file(path: &Path) -> Result<String, EncoderError> {
    let data = fs::read(path).map_err(|e| {
        EncoderError::Storage(format!("failed to read file for checksum: {}", e))
    })?;
    Ok(hex_encode(&Sha256::digest(&data)))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
