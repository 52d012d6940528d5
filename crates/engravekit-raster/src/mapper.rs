//! Grey value to laser property mapping

use engravekit_core::{CommandError, LaserProperty, PropertyKey};
use serde::{Deserialize, Serialize};

/// Maps a grey value (0 black ..= 255 white) to the laser property used to
/// engrave it
///
/// Mappers are pure: the scanner may call them any number of times per run
/// and compares results by value.
pub trait PropertyMapper {
    fn map(&self, grey: u8) -> LaserProperty;
}

impl<F> PropertyMapper for F
where
    F: Fn(u8) -> LaserProperty,
{
    fn map(&self, grey: u8) -> LaserProperty {
        self(grey)
    }
}

/// Linear power ramp: black engraves at `max_power`, white does not fire
///
/// Every grey value other than white maps to
/// `min_power + (max_power - min_power) * (255 - grey) / 255`, rounded to the
/// nearest percent. Keys other than power are copied from the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLinearPowerMapper")]
pub struct LinearPowerMapper {
    template: LaserProperty,
    min_power: f32,
    max_power: f32,
}

#[derive(Deserialize)]
struct RawLinearPowerMapper {
    template: LaserProperty,
    min_power: f32,
    max_power: f32,
}

impl TryFrom<RawLinearPowerMapper> for LinearPowerMapper {
    type Error = CommandError;

    fn try_from(raw: RawLinearPowerMapper) -> Result<Self, Self::Error> {
        Self::new(raw.template, raw.min_power, raw.max_power)
    }
}

impl LinearPowerMapper {
    pub fn new(template: LaserProperty, min_power: f32, max_power: f32) -> Result<Self, CommandError> {
        let (lo, hi) = PropertyKey::Power.range();
        for value in [min_power, max_power] {
            if !value.is_finite() || value < lo || value > hi {
                return Err(CommandError::PropertyOutOfRange {
                    key: PropertyKey::Power,
                    value,
                    min: lo,
                    max: hi,
                });
            }
        }
        if min_power > max_power {
            return Err(CommandError::PropertyOutOfRange {
                key: PropertyKey::Power,
                value: min_power,
                min: lo,
                max: max_power,
            });
        }
        Ok(Self {
            template,
            min_power,
            max_power,
        })
    }

    /// Ramp from 0 to `max_power` over the canonical engraving property
    pub fn with_max_power(max_power: f32) -> Result<Self, CommandError> {
        Self::new(LaserProperty::engraving(), 0.0, max_power)
    }

    pub fn template(&self) -> &LaserProperty {
        &self.template
    }

    pub fn min_power(&self) -> f32 {
        self.min_power
    }

    pub fn max_power(&self) -> f32 {
        self.max_power
    }

    /// Power in percent for `grey`
    pub fn power_for(&self, grey: u8) -> f32 {
        if grey == u8::MAX {
            return 0.0;
        }
        let darkness = (255 - grey) as f32 / 255.0;
        (self.min_power + (self.max_power - self.min_power) * darkness).round()
    }
}

impl PropertyMapper for LinearPowerMapper {
    fn map(&self, grey: u8) -> LaserProperty {
        let mut property = self.template.clone();
        // powers were range-checked on construction, so this never clamps
        property.set_clamped(PropertyKey::Power, self.power_for(grey));
        property
    }
}
