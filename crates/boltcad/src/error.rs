//! Error types for fastener construction.

use thiserror::Error;

/// Errors that can occur while completing dimensions or building shapes.
#[derive(Error, Debug)]
pub enum FastenerError {
    /// Catalog lookup outside the table.
    #[error("size index {index} is out of range (catalog has {len} entries)")]
    InvalidIndex {
        /// Requested index.
        index: usize,
        /// Number of catalog entries.
        len: usize,
    },

    /// No catalog entry satisfies a nearest-size query.
    #[error("no catalog size matches thread diameter {0}")]
    NoMatchingSize(f64),

    /// No catalog entry carries the requested name.
    #[error("unknown size name: {0}")]
    UnknownSize(String),

    /// A resolved dimension cannot produce valid geometry.
    #[error("invalid dimension {field} = {value}")]
    InvalidDimension {
        /// Name of the offending field.
        field: &'static str,
        /// Resolved value.
        value: f64,
    },

    /// A helical sweep with no usable turns.
    #[error("thread with pitch {pitch} yields {rotations} turns")]
    DegenerateThread {
        /// Thread pitch.
        pitch: f64,
        /// Computed turn count.
        rotations: f64,
    },

    /// Invalid print settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Malformed construction tree.
    #[error(transparent)]
    Ir(#[from] boltcad_ir::IrError),

    /// Catalog or settings file could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Catalog or settings file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fastener operations.
pub type Result<T> = std::result::Result<T, FastenerError>;
