use serde::{Deserialize, Serialize};

/// Running counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub encode_calls: u64,
    /// Samples consumed per channel.
    pub samples_encoded: u64,
    pub bytes_emitted: u64,
    pub flushes: u64,
}

impl SessionStats {
    pub(crate) fn record_encode(&mut self, samples: usize, bytes: usize) {
        self.encode_calls += 1;
        self.samples_encoded += samples as u64;
        self.bytes_emitted += bytes as u64;
    }

    pub(crate) fn record_flush(&mut self, bytes: usize) {
        self.flushes += 1;
        self.bytes_emitted += bytes as u64;
    }
}
