//! Raster engraving settings
//!
//! [`RasterSettings`] is the user-facing configuration for a raster job. It
//! is stored as TOML or JSON and converted into a [`ScanPolicy`] and a
//! [`LinearPowerMapper`] when a job is prepared.

use crate::error::{SettingsError, SettingsResult};
use crate::mapper::LinearPowerMapper;
use crate::policy::{DirectionMode, ScanAxis, ScanPolicy, StartCorner};
use engravekit_core::units::{self, MeasurementSystem};
use engravekit_core::{LaserProperty, PropertyKey};
use serde::{Deserialize, Serialize};

/// Raster engraving settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Sweep axis
    pub axis: ScanAxis,
    /// Corner the scan starts in
    pub start_corner: StartCorner,
    /// Serpentine or one-way sweeps
    pub direction: DirectionMode,
    /// Skip lines without content
    pub skip_blank_lines: bool,
    /// Overscan length, in `units`
    pub overscan: f64,
    /// Units of `overscan`
    pub units: MeasurementSystem,
    /// Device resolution in dots per inch
    pub dpi: f64,
    /// Power for the lightest engraved grey, percent
    pub min_power: f32,
    /// Power for black, percent
    pub max_power: f32,
    /// Head speed, percent
    pub speed: f32,
    /// Focus offset, mm
    pub focus: f32,
    /// Pulse frequency, Hz
    pub frequency: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            axis: ScanAxis::Horizontal,
            start_corner: StartCorner::TopLeft,
            direction: DirectionMode::Bidirectional,
            skip_blank_lines: true,
            overscan: 0.0,
            units: MeasurementSystem::Metric,
            dpi: 500.0,
            min_power: 0.0,
            max_power: 100.0,
            speed: 100.0,
            focus: 0.0,
            frequency: 5000.0,
        }
    }
}

impl RasterSettings {
    pub const MAX_DPI: f64 = 10_000.0;

    /// Parses settings from TOML and validates them
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from JSON and validates them
    pub fn from_json_str(content: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialises the settings as TOML
    pub fn to_toml_string(&self) -> SettingsResult<String> {
        self.validate()?;
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        if !self.dpi.is_finite() || self.dpi < 1.0 || self.dpi > Self::MAX_DPI {
            return Err(out_of_range("dpi", self.dpi, 1.0, Self::MAX_DPI));
        }

        if !self.overscan.is_finite() || self.overscan < 0.0 {
            return Err(SettingsError::InvalidValue {
                name: "overscan".to_string(),
                reason: "must be a non-negative length".to_string(),
            });
        }

        for (name, key, value) in [
            ("min_power", PropertyKey::Power, self.min_power),
            ("max_power", PropertyKey::Power, self.max_power),
            ("speed", PropertyKey::Speed, self.speed),
            ("focus", PropertyKey::Focus, self.focus),
            ("frequency", PropertyKey::Frequency, self.frequency),
        ] {
            let (min, max) = key.range();
            if !value.is_finite() || value < min || value > max {
                return Err(out_of_range(name, value as f64, min as f64, max as f64));
            }
        }

        if self.min_power > self.max_power {
            return Err(SettingsError::InvalidValue {
                name: "min_power".to_string(),
                reason: format!(
                    "{} exceeds max_power {}",
                    self.min_power, self.max_power
                ),
            });
        }

        if self.max_power == 0.0 {
            tracing::warn!("Raster settings have max_power 0; nothing will be engraved");
        }

        Ok(())
    }

    /// Overscan in millimetres
    pub fn overscan_mm(&self) -> f64 {
        units::to_mm(self.overscan, self.units)
    }

    /// Overscan in whole device pixels
    pub fn overscan_px(&self) -> u32 {
        units::mm_to_px(self.overscan_mm(), self.dpi).clamp(0, u32::MAX as i64) as u32
    }

    /// Scan policy described by these settings
    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            axis: self.axis,
            start_corner: self.start_corner,
            direction: self.direction,
            skip_blank_lines: self.skip_blank_lines,
            overscan_px: self.overscan_px(),
        }
    }

    /// Property the device is set to before the raster starts: laser off,
    /// configured speed, focus and frequency
    pub fn initial_property(&self) -> SettingsResult<LaserProperty> {
        let property = LaserProperty::new()
            .with(PropertyKey::Power, 0.0)
            .and_then(|p| p.with(PropertyKey::Speed, self.speed))
            .and_then(|p| p.with(PropertyKey::Focus, self.focus))
            .and_then(|p| p.with(PropertyKey::Frequency, self.frequency))
            .map_err(|e| SettingsError::InvalidValue {
                name: "property".to_string(),
                reason: e.to_string(),
            })?;
        Ok(property)
    }

    /// Power ramp described by these settings
    pub fn mapper(&self) -> SettingsResult<LinearPowerMapper> {
        let template = self.initial_property()?;
        LinearPowerMapper::new(template, self.min_power, self.max_power).map_err(|e| {
            SettingsError::InvalidValue {
                name: "power".to_string(),
                reason: e.to_string(),
            }
        })
    }
}

fn out_of_range(name: &str, value: f64, min: f64, max: f64) -> SettingsError {
    SettingsError::OutOfRange {
        name: name.to_string(),
        value,
        min,
        max,
    }
}
