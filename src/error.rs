//! Error types shared across the generator and the container codec.

use std::fmt;
use std::io;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MapError>;

/// Everything that can go wrong while generating or (de)serializing a map.
#[derive(Debug)]
pub enum MapError {
    /// The generator was called with a geometrically inconsistent configuration.
    InvalidParameter(String),
    /// A container violated the binary format (bad magic, truncated buffer,
    /// inconsistent offset/length tables, failed decompression).
    MalformedContainer(String),
    /// The container declares a format version other than the supported one.
    UnsupportedVersion(u32),
    /// Underlying storage read/write failure, surfaced as-is.
    Io(io::Error),
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
            MapError::MalformedContainer(msg) => write!(f, "malformed container: {}", msg),
            MapError::UnsupportedVersion(v) => {
                write!(f, "unsupported container version {} (expected 4)", v)
            }
            MapError::Io(err) => write!(f, "i/o error: {}", err),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for MapError {
    fn from(err: io::Error) -> Self {
        MapError::Io(err)
    }
}
