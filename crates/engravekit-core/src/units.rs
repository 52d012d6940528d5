//! Unit conversion utilities
//!
//! Handles conversion between physical lengths (mm, inch) and positions on
//! the device pixel grid of a given resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Converts a length given in `system` units to millimeters
pub fn to_mm(value: f64, system: MeasurementSystem) -> f64 {
    match system {
        MeasurementSystem::Metric => value,
        MeasurementSystem::Imperial => value * MM_PER_INCH,
    }
}

/// Converts millimeters to device pixels at `dpi`, rounded to the nearest pixel
pub fn mm_to_px(mm: f64, dpi: f64) -> i64 {
    (mm / MM_PER_INCH * dpi).round() as i64
}

/// Converts device pixels at `dpi` to millimeters
pub fn px_to_mm(px: f64, dpi: f64) -> f64 {
    px * MM_PER_INCH / dpi
}

/// Get the unit label for the given system ("mm" or "in")
pub fn get_unit_label(system: MeasurementSystem) -> &'static str {
    match system {
        MeasurementSystem::Metric => "mm",
        MeasurementSystem::Imperial => "in",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mm() {
        assert_eq!(to_mm(10.5, MeasurementSystem::Metric), 10.5);
        assert!((to_mm(0.5, MeasurementSystem::Imperial) - 12.7).abs() < 1e-9);
    }

    #[test]
    fn test_mm_to_px() {
        // 1 inch at 500 dpi
        assert_eq!(mm_to_px(25.4, 500.0), 500);
        // 2 mm at 500 dpi = 39.37 px
        assert_eq!(mm_to_px(2.0, 500.0), 39);
        assert_eq!(mm_to_px(0.0, 1000.0), 0);
        assert_eq!(mm_to_px(-25.4, 100.0), -100);
    }

    #[test]
    fn test_px_to_mm() {
        assert!((px_to_mm(500.0, 500.0) - 25.4).abs() < 1e-9);
        assert!((px_to_mm(1.0, 254.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_parse_system() {
        assert_eq!("mm".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Metric));
        assert_eq!("Inch".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
        assert!("furlong".parse::<MeasurementSystem>().is_err());
        assert_eq!(MeasurementSystem::default(), MeasurementSystem::Metric);
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(get_unit_label(MeasurementSystem::Metric), "mm");
        assert_eq!(get_unit_label(MeasurementSystem::Imperial), "in");
    }
}
