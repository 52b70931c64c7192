//! Error types for the miner configuration codecs
//!
//! Lenient decoders never surface these: missing fields and malformed vendor
//! payloads recover to per-aspect defaults. Errors only come out of the strict
//! canonical decode and the wire-syntax helpers on [`crate::Vendor`].

use thiserror::Error;

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the configuration model
#[derive(Error, Debug)]
pub enum Error {
    /// A canonical `mode` string that no registered variant claims
    #[error("Unrecognized {aspect} mode: {tag}")]
    UnrecognizedVariantTag {
        /// Aspect name (e.g. "fan_mode")
        aspect: &'static str,
        /// The offending tag
        tag: String,
    },

    /// Payload did not have the expected structure
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Unknown vendor name
    #[error("Unsupported vendor: {0}")]
    UnsupportedVendor(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML render errors
    #[error("TOML render error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Create an unrecognized-tag error
    pub fn unrecognized_tag(aspect: &'static str, tag: impl Into<String>) -> Self {
        Self::UnrecognizedVariantTag {
            aspect,
            tag: tag.into(),
        }
    }

    /// Create a malformed-payload error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedPayload(msg.into())
    }

    /// Create an unsupported-vendor error
    pub fn unsupported_vendor(name: impl Into<String>) -> Self {
        Self::UnsupportedVendor(name.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
