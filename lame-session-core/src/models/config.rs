use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::EncoderError;

/// Number of channels in the encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    Mono,
    Stereo,
}

impl ChannelMode {
    pub fn from_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(Self::Mono),
            2 => Some(Self::Stereo),
            _ => None,
        }
    }

    pub fn count(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// Encoder quality, 0 (best, very slow) through 9 (worst, fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const BEST: Self = Self(0);
    /// Near-best quality, not too slow.
    pub const NEAR_BEST: Self = Self(2);
    /// Good quality, fast.
    pub const GOOD: Self = Self(5);
    /// OK quality, really fast.
    pub const FAST: Self = Self(7);
    pub const WORST: Self = Self(9);
    pub const DEFAULT: Self = Self::FAST;

    pub fn new(value: u8) -> Result<Self, EncoderError> {
        if value > Self::WORST.0 {
            return Err(EncoderError::Configuration(format!(
                "quality must be within 0..=9, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for Quality {
    type Error = EncoderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

/// Optional ID3 tags written into the stream header at session creation.
///
/// Absent fields are omitted from the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id3Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Id3Metadata {
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    /// Tag name and value pairs, in header order.
    pub fn fields(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("title", self.title.as_deref()),
            ("artist", self.artist.as_deref()),
            ("album", self.album.as_deref()),
            ("year", self.year.as_deref()),
            ("comment", self.comment.as_deref()),
        ]
    }

    fn validate(&self) -> Result<(), EncoderError> {
        for (name, value) in self.fields() {
            if value.is_some_and(|v| v.contains('\0')) {
                return Err(EncoderError::Configuration(format!(
                    "id3 {name} must not contain NUL bytes"
                )));
            }
        }
        Ok(())
    }
}

/// Immutable session parameters. Only obtainable through
/// [`ConfigurationBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncoderSettings", into = "EncoderSettings")]
pub struct EncoderConfiguration {
    input_sample_rate_hz: u32,
    output_channels: ChannelMode,
    output_sample_rate_hz: u32,
    output_bitrate_kbps: u32,
    quality: Quality,
    id3: Id3Metadata,
}

impl EncoderConfiguration {
    pub fn builder(
        input_sample_rate_hz: u32,
        output_channels: u32,
        output_sample_rate_hz: u32,
        output_bitrate_kbps: u32,
    ) -> ConfigurationBuilder {
        ConfigurationBuilder::new(
            input_sample_rate_hz,
            output_channels,
            output_sample_rate_hz,
            output_bitrate_kbps,
        )
    }

    pub fn input_sample_rate_hz(&self) -> u32 {
        self.input_sample_rate_hz
    }

    pub fn output_channels(&self) -> ChannelMode {
        self.output_channels
    }

    pub fn channel_count(&self) -> usize {
        self.output_channels.count()
    }

    pub fn output_sample_rate_hz(&self) -> u32 {
        self.output_sample_rate_hz
    }

    pub fn output_bitrate_kbps(&self) -> u32 {
        self.output_bitrate_kbps
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn id3(&self) -> &Id3Metadata {
        &self.id3
    }
}

/// Collects session parameters. Mandatory values are taken up front;
/// quality and ID3 tags are optional and chainable.
///
/// ```
/// use lame_session_core::EncoderConfiguration;
///
/// let config = EncoderConfiguration::builder(44_100, 2, 44_100, 128)
///     .quality(5)
///     .id3_title("Take One")
///     .build()
///     .unwrap();
/// assert_eq!(config.quality().value(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationBuilder {
    input_sample_rate_hz: u32,
    output_channels: u32,
    output_sample_rate_hz: u32,
    output_bitrate_kbps: u32,
    quality: Option<u8>,
    id3: Id3Metadata,
}

impl ConfigurationBuilder {
    pub fn new(
        input_sample_rate_hz: u32,
        output_channels: u32,
        output_sample_rate_hz: u32,
        output_bitrate_kbps: u32,
    ) -> Self {
        Self {
            input_sample_rate_hz,
            output_channels,
            output_sample_rate_hz,
            output_bitrate_kbps,
            quality: None,
            id3: Id3Metadata::default(),
        }
    }

    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn id3_title(mut self, title: impl Into<String>) -> Self {
        self.id3.title = Some(title.into());
        self
    }

    pub fn id3_artist(mut self, artist: impl Into<String>) -> Self {
        self.id3.artist = Some(artist.into());
        self
    }

    pub fn id3_album(mut self, album: impl Into<String>) -> Self {
        self.id3.album = Some(album.into());
        self
    }

    pub fn id3_year(mut self, year: impl Into<String>) -> Self {
        self.id3.year = Some(year.into());
        self
    }

    pub fn id3_comment(mut self, comment: impl Into<String>) -> Self {
        self.id3.comment = Some(comment.into());
        self
    }

    /// Replace all ID3 tags at once.
    pub fn id3(mut self, id3: Id3Metadata) -> Self {
        self.id3 = id3;
        self
    }

    pub fn build(self) -> Result<EncoderConfiguration, EncoderError> {
        if self.input_sample_rate_hz == 0 {
            return Err(EncoderError::Configuration(
                "input sample rate must be positive".into(),
            ));
        }
        if self.output_sample_rate_hz == 0 {
            return Err(EncoderError::Configuration(
                "output sample rate must be positive".into(),
            ));
        }
        if self.output_bitrate_kbps == 0 {
            return Err(EncoderError::Configuration(
                "output bitrate must be positive".into(),
            ));
        }
        let output_channels = ChannelMode::from_count(self.output_channels).ok_or_else(|| {
            EncoderError::Configuration(format!(
                "unsupported channel count: {}",
                self.output_channels
            ))
        })?;
        let quality = match self.quality {
            Some(value) => Quality::new(value)?,
            None => Quality::DEFAULT,
        };
        self.id3.validate()?;

        Ok(EncoderConfiguration {
            input_sample_rate_hz: self.input_sample_rate_hz,
            output_channels,
            output_sample_rate_hz: self.output_sample_rate_hz,
            output_bitrate_kbps: self.output_bitrate_kbps,
            quality,
            id3: self.id3,
        })
    }
}

/// Persisted form of [`EncoderConfiguration`]. Loading runs the builder,
/// so a settings file is validated exactly like code-built configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub input_sample_rate_hz: u32,
    pub output_channels: u32,
    pub output_sample_rate_hz: u32,
    pub output_bitrate_kbps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(default, skip_serializing_if = "Id3Metadata::is_empty")]
    pub id3: Id3Metadata,
}

impl EncoderSettings {
    pub fn into_configuration(self) -> Result<EncoderConfiguration, EncoderError> {
        let mut builder = ConfigurationBuilder::new(
            self.input_sample_rate_hz,
            self.output_channels,
            self.output_sample_rate_hz,
            self.output_bitrate_kbps,
        )
        .id3(self.id3);
        if let Some(quality) = self.quality {
            builder = builder.quality(quality);
        }
        builder.build()
    }

    pub fn from_json(json: &str) -> Result<Self, EncoderError> {
        serde_json::from_str(json)
            .map_err(|e| EncoderError::Configuration(format!("failed to parse settings: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, EncoderError> {
        let json = fs::read_to_string(path)
            .map_err(|e| EncoderError::Storage(format!("failed to read settings: {}", e)))?;
        Self::from_json(&json)
    }

    pub fn save(&self, path: &Path) -> Result<(), EncoderError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| EncoderError::Storage(format!("failed to serialize settings: {}", e)))?;
        fs::write(path, json)
            .map_err(|e| EncoderError::Storage(format!("failed to write settings: {}", e)))
    }
}

impl From<EncoderConfiguration> for EncoderSettings {
    fn from(config: EncoderConfiguration) -> Self {
        Self {
            input_sample_rate_hz: config.input_sample_rate_hz,
            output_channels: config.output_channels.count() as u32,
            output_sample_rate_hz: config.output_sample_rate_hz,
            output_bitrate_kbps: config.output_bitrate_kbps,
            quality: Some(config.quality.value()),
            id3: config.id3,
        }
    }
}

impl TryFrom<EncoderSettings> for EncoderConfiguration {
    type Error = EncoderError;

    fn try_from(settings: EncoderSettings) -> Result<Self, Self::Error> {
        settings.into_configuration()
    }
}
