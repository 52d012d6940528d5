//! Error types for the raster crate.
//!
//! This module provides structured error types for raster construction,
//! scan policy validation, and settings parsing.

use engravekit_core::CommandError;
use thiserror::Error;

/// Errors that can occur while building rasters or scanners.
#[derive(Error, Debug)]
pub enum RasterError {
    /// Width or height is zero or too large to address.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Bits per pixel is zero or exceeds what the sample accumulator can hold.
    #[error("Unsupported bit depth: {bits} bits per pixel (valid: 1..={max})")]
    UnsupportedBitDepth { bits: u32, max: u32 },

    /// A buffer was handed to an image type of a different bit depth.
    #[error("Bit depth mismatch: expected {expected}, found {actual}")]
    BitDepthMismatch { expected: u32, actual: u32 },

    /// A pixel coordinate lies outside the raster.
    #[error("Pixel ({x}, {y}) out of bounds for {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Packed data does not match the raster geometry.
    #[error("Buffer length mismatch: expected {expected} bytes, got {actual}")]
    BufferLength { expected: usize, actual: usize },

    /// A legacy policy bit-flag word contains bits with no meaning.
    #[error("Unknown scan policy flags: {0:#x}")]
    UnknownPolicyFlags(u32),

    /// Overscan is too large to keep coordinates addressable.
    #[error("Overscan of {overscan} pixels exceeds the maximum of {max}")]
    OverscanTooLarge { overscan: u32, max: u32 },

    /// A job part does not fit on the machine bed.
    #[error("Raster extents {width}x{height} px at ({x}, {y}) exceed bed of {bed_width}x{bed_height} px")]
    OutsideBed {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        bed_width: u32,
        bed_height: u32,
    },

    /// The progress callback asked the scan to stop.
    #[error("Raster scan cancelled")]
    Cancelled,

    /// Command stream construction failed.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Settings could not be parsed or validated.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Errors related to raster settings parsing and validation.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A setting value is out of the valid range.
    #[error("Setting '{name}' out of range: {value} (valid: {min}..={max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A setting value is invalid.
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for raster operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;
