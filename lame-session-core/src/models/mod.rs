pub mod config;
pub mod error;
pub mod handle;
pub mod state;
pub mod stats;
pub mod stream_metadata;
