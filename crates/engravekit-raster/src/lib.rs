//! # EngraveKit Raster
//!
//! Packed raster storage and the raster-to-toolpath scanner.
//!
//! A raster is prepared as a [`GreyscaleImage`] (usually a
//! [`BlackWhiteImage`] produced by dithering, or a [`GreyImage`]), placed on
//! the machine as a [`RasterJobPart`] and swept by a [`ToolpathScanner`]
//! according to a [`ScanPolicy`]. A [`PropertyMapper`] decides the laser
//! property for every grey value. The result is an
//! [`engravekit_core::CommandStream`].
//!
//! ```
//! use engravekit_core::LaserProperty;
//! use engravekit_raster::{BlackWhiteImage, LinearPowerMapper, RasterJobPart, ScanPolicy};
//!
//! let mut image = BlackWhiteImage::new(8, 2).unwrap();
//! image.set_black(3, 0, true);
//! let part = RasterJobPart::from_image(image, LaserProperty::engraving(), 500.0).unwrap();
//! let mapper = LinearPowerMapper::with_max_power(80.0).unwrap();
//! let stream = part.to_command_stream(ScanPolicy::default(), &mapper).unwrap();
//! assert_eq!(stream.len(), 5);
//! ```

pub mod error;
pub mod greyscale;
pub mod job;
pub mod mapper;
pub mod pixel_buffer;
pub mod policy;
pub mod scanner;
pub mod settings;
pub mod stats;

pub use error::{RasterError, RasterResult, SettingsError, SettingsResult};
pub use greyscale::{BlackWhiteImage, GreyImage, GreyRaster, GreyscaleImage};
pub use job::RasterJobPart;
pub use mapper::{LinearPowerMapper, PropertyMapper};
pub use pixel_buffer::{PixelBuffer, MAX_BITS_PER_PIXEL};
pub use policy::{DirectionMode, ScanAxis, ScanPolicy, StartCorner};
pub use scanner::{ScanState, ScanStep, ToolpathScanner, MAX_OVERSCAN_PX};
pub use settings::RasterSettings;
pub use stats::ToolpathStats;
