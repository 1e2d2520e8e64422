//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// input is not an lvz package
    #[error("input is not an lvz package")]
    InvalidPackage,

    /// file name {0:?} is empty or contains a null byte
    #[error("invalid file name {0:?}")]
    #[diagnostic(help(
        "resource names must not be empty, and names are stored null-terminated so they cannot contain \\0"
    ))]
    InvalidName(String),

    /// section {name:?} is too large ({size} bytes)
    #[error("section {name:?} is too large ({size} bytes)")]
    SectionTooLarge {
        /// Name of the offending section
        name: String,
        /// Length that did not fit in a 32 bit size field
        size: usize,
    },

    /// section content does not start with a known object table tag
    #[error("unknown object table tag {0:?}")]
    UnknownObjectTable([u8; 4]),

    /// section payload is not a valid deflate stream
    #[error("corrupt deflate stream")]
    CorruptStream(#[source] std::io::Error),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
