//! # lame-session-mp3lame
//!
//! libmp3lame backend for lame-session.
//!
//! Provides:
//! - `LameEngine` / `LameEngineFactory`: engine instances over `mp3lame-sys`
//! - `default_registry()`: process-wide session registry
//! - `legacy`: single implicit session with free-function entry points
//! - `logging`: process-wide engine boundary diagnostics
//!
//! ## Usage
//! ```no_run
//! use lame_session_core::{output_buffer_for, ConfigurationBuilder};
//! use lame_session_mp3lame::default_registry;
//!
//! let mut encoder = ConfigurationBuilder::new(44_100, 2, 44_100, 128)
//!     .quality(5)
//!     .create(default_registry())
//!     .unwrap();
//! let silence = vec![0i16; 1152];
//! let mut out = output_buffer_for(1152);
//! let written = encoder.encode(&silence, Some(&silence), 1152, &mut out).unwrap();
//! ```

use std::sync::{Arc, OnceLock};

use lame_session_core::{Encoder, SessionRegistry};

pub mod engine;
pub mod legacy;
pub mod logging;

pub use engine::{LameEngine, LameEngineFactory};

pub type LameRegistry = SessionRegistry<LameEngineFactory>;
pub type LameEncoder = Encoder<LameEngineFactory>;

static DEFAULT_REGISTRY: OnceLock<Arc<LameRegistry>> = OnceLock::new();

/// Registry shared by the whole process, created on first use.
pub fn default_registry() -> &'static Arc<LameRegistry> {
    DEFAULT_REGISTRY.get_or_init(|| Arc::new(SessionRegistry::new(LameEngineFactory)))
}
