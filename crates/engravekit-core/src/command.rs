//! Toolpath commands
//!
//! The three instructions every device backend understands. Coordinates are
//! integer positions on the device pixel grid of the stream's DPI.

use crate::property::LaserProperty;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    SetProperty,
    MoveTo,
    LineTo,
}

/// A single motion or property instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Switch the laser parameters used by subsequent moves
    SetProperty(LaserProperty),
    /// Travel to a position with the laser off
    MoveTo { x: i32, y: i32 },
    /// Travel to a position while lasing with the current property
    LineTo { x: i32, y: i32 },
}

impl Command {
    /// Returns the command discriminant
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::SetProperty(_) => CommandKind::SetProperty,
            Self::MoveTo { .. } => CommandKind::MoveTo,
            Self::LineTo { .. } => CommandKind::LineTo,
        }
    }

    /// Target position of a motion command
    pub fn position(&self) -> Option<(i32, i32)> {
        match self {
            Self::MoveTo { x, y } | Self::LineTo { x, y } => Some((*x, *y)),
            Self::SetProperty(_) => None,
        }
    }

    /// Property carried by a `SetProperty` command
    pub fn property(&self) -> Option<&LaserProperty> {
        match self {
            Self::SetProperty(property) => Some(property),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetProperty(property) => write!(f, "SETPROPERTY {}", property),
            Self::MoveTo { x, y } => write!(f, "MOVETO {} {}", x, y),
            Self::LineTo { x, y } => write!(f, "LINETO {} {}", x, y),
        }
    }
}
