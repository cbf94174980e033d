//! Error types for cogserv

use std::fmt;
use std::io;

/// Result type for cogserv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while serving a tile or overview
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(io::Error),

    /// Invalid TIFF format
    InvalidFormat(String),

    /// Invalid TIFF magic number
    InvalidMagic(u16),

    /// Missing required tag
    MissingTag(u16),

    /// Unsupported feature
    Unsupported(String),

    /// Out of bounds access
    OutOfBounds(String),

    /// Projection error
    Projection(String),

    /// Degenerate or invalid output geometry
    Geometry(String),

    /// Colorization options unusable for the selected mode
    Colorization(String),

    /// Requested output format is not one of png, jpg, webp
    UnsupportedFormat(String),

    /// The raster source could not be opened or read
    SourceUnavailable {
        locator: String,
        reason: String,
    },

    /// Image codec failure
    Encode(String),
}

impl Error {
    /// Creates a [`Error::SourceUnavailable`] for the given locator
    pub fn source_unavailable(locator: impl Into<String>, reason: impl fmt::Display) -> Self {
        Error::SourceUnavailable {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Geometry(_)
                | Error::Colorization(_)
                | Error::UnsupportedFormat(_)
                | Error::OutOfBounds(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Error::InvalidMagic(value) => write!(f, "Invalid TIFF magic number: {}", value),
            Error::MissingTag(tag) => write!(f, "Missing required tag: {}", tag),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::OutOfBounds(msg) => write!(f, "Out of bounds: {}", msg),
            Error::Projection(msg) => write!(f, "Projection error: {}", msg),
            Error::Geometry(msg) => write!(f, "Geometry error: {}", msg),
            Error::Colorization(msg) => write!(f, "Colorization error: {}", msg),
            Error::UnsupportedFormat(ext) => write!(f, "Unsupported output format: {}", ext),
            Error::SourceUnavailable { locator, reason } => {
                write!(f, "Source unavailable: {} ({})", locator, reason)
            }
            Error::Encode(msg) => write!(f, "Encoding error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}
