//! # EngraveKit
//!
//! Raster-to-toolpath conversion for laser cutters and engravers.
//!
//! ## Architecture
//!
//! EngraveKit is organized as a workspace with multiple crates:
//!
//! 1. **engravekit-core** - Laser properties, toolpath commands, the command
//!    stream handed to device backends, units
//! 2. **engravekit-raster** - Packed pixel buffers, greyscale rasters, scan
//!    policies, property mappers and the toolpath scanner
//! 3. **engravekit** - This facade, re-exporting both crates
//!
//! ## Features
//!
//! - **Packed Rasters**: 1 to 25 bits per pixel, samples may straddle bytes
//! - **Scan Policies**: X or Y axis, any start corner, serpentine or one-way,
//!   blank-line skipping, overscan clamped against the next line
//! - **Lazy Scanning**: commands are produced on demand with memory
//!   independent of the raster size, with progress reporting and cancellation
//! - **Backend Seam**: any device driver implementing `CommandSink`

pub use engravekit_core::units;

pub use engravekit_core::{
    Bounds, Command, CommandError, CommandKind, CommandSink, CommandStream, CommandStreamBuilder,
    LaserProperty, MeasurementSystem, ProgressCallback, PropertyKey,
};

pub use engravekit_raster::{
    BlackWhiteImage, DirectionMode, GreyImage, GreyRaster, GreyscaleImage, LinearPowerMapper,
    PixelBuffer, PropertyMapper, RasterError, RasterJobPart, RasterResult, RasterSettings,
    ScanAxis, ScanPolicy, ScanState, ScanStep, SettingsError, StartCorner, ToolpathScanner,
    ToolpathStats, MAX_BITS_PER_PIXEL,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
///
/// A second call leaves the installed subscriber in place.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    install(
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer),
    )
}

/// Initialize logging with one JSON object per event on stderr
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .json();

    install(
        tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt_layer),
    )
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
}

fn install<S>(subscriber: S) -> anyhow::Result<()>
where
    S: tracing::Subscriber + Send + Sync + 'static,
{
    use tracing_subscriber::util::SubscriberInitExt;

    if let Err(err) = subscriber.try_init() {
        tracing::warn!("Logging already initialized: {}", err);
    }
    Ok(())
}
