//! Error types for the grid widget

use thiserror::Error;

/// Result type alias for widget operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering, decoding, or exporting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Non-positive surface dimensions or column count reached the geometry engine
    #[error("Invalid grid geometry: width={width}, height={height}, columns={columns}")]
    InvalidGeometryInput {
        width: f64,
        height: f64,
        columns: u32,
    },

    /// The dropped file could not be decoded into an image
    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    /// An operation needed a loaded image but none is active
    #[error("No image is loaded")]
    NoActiveImage,

    /// Failed to encode a surface for export
    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    /// A colour string could not be parsed
    #[error("Invalid colour: {0}")]
    InvalidColor(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::DecodeFailure(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigError(err.to_string())
    }
}
