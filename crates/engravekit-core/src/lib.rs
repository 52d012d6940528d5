//! # EngraveKit Core
//!
//! Device-agnostic toolpath types shared by every EngraveKit producer and
//! backend: laser properties, the three toolpath commands, and the
//! append-only command stream that is handed to device backends.

pub mod command;
pub mod error;
pub mod property;
pub mod stream;
pub mod types;
pub mod units;

pub use command::{Command, CommandKind};
pub use error::{CommandError, Error, Result};
pub use property::{LaserProperty, PropertyKey};
pub use stream::{Bounds, CommandSink, CommandStream, CommandStreamBuilder};
pub use types::ProgressCallback;
pub use units::MeasurementSystem;
