//! Hide short messages in the red channel of PPM images.
//!
//! The scheme is the one this tool has always used: a random subset of
//! even-red pixels is ORed with one message byte each, and the message is
//! read back by diffing the encoded image against its original. It is
//! lossy for most inputs, see [`extract`] for what survives.
use std::{collections::TryReserveError, path::PathBuf};

pub mod bits;
pub mod embed;
pub mod extract;
pub mod ppm;

pub use bits::{BitSource, CycleBits, RandomBits};
pub use embed::embed;
pub use extract::extract;
pub use ppm::{Format, Image, Pixel};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid PPM format: expected magic number P3 or P6, found {magic:?}")]
    InvalidFormat { magic: String },
    #[error("Invalid PPM header: missing or malformed {field}")]
    InvalidHeader { field: &'static str },
    #[error("Invalid PPM dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },
    #[error("Pixel data missing: expected {expected} pixels, found {found}")]
    TruncatedPixelData { expected: usize, found: usize },
    #[error("Failed to allocate memory for {pixels} pixels")]
    AllocationFailure {
        pixels: usize,
        source: TryReserveError,
    },
    #[error("Images are not of the same size: {original} pixels vs {encoded} pixels")]
    SizeMismatch { original: usize, encoded: usize },
    #[error("File {} could not be opened", .path.display())]
    FileNotFound { path: PathBuf },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
