//! Device-agnostic laser properties
//!
//! A [`LaserProperty`] is a small key/value set (power, speed, focus,
//! frequency) attached to a toolpath by a `SETPROPERTY` command. Backends
//! translate it into whatever their wire format understands.

use crate::error::CommandError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Property keys understood by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKey {
    /// Laser power in percent
    Power,
    /// Head speed in percent of the device maximum
    Speed,
    /// Focus offset in millimeters
    Focus,
    /// Pulse frequency in Hz
    Frequency,
}

impl PropertyKey {
    /// All keys, in canonical order
    pub const ALL: [PropertyKey; 4] = [Self::Power, Self::Speed, Self::Focus, Self::Frequency];

    /// Inclusive range accepted for this key
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Power | Self::Speed => (0.0, 100.0),
            Self::Focus => (f32::MIN, f32::MAX),
            Self::Frequency => (10.0, 5000.0),
        }
    }

    /// Key name as used in settings files
    pub fn name(self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Speed => "speed",
            Self::Focus => "focus",
            Self::Frequency => "frequency",
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "power" => Ok(Self::Power),
            "speed" => Ok(Self::Speed),
            "focus" => Ok(Self::Focus),
            "frequency" | "freq" => Ok(Self::Frequency),
            _ => Err(format!("Unknown laser property: {}", s)),
        }
    }
}

/// Key/value set of laser parameters
///
/// Values are validated against [`PropertyKey::range`] on every write,
/// deserialization included.
///
/// Two properties compare equal when they hold the same keys with the same
/// values, which is what the scanner uses to suppress redundant
/// `SETPROPERTY` commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<PropertyKey, f32>",
    into = "BTreeMap<PropertyKey, f32>"
)]
pub struct LaserProperty {
    values: BTreeMap<PropertyKey, f32>,
}

impl LaserProperty {
    /// Creates an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical engraving property: power 0, speed 100, focus 0, frequency 5000
    pub fn engraving() -> Self {
        let mut values = BTreeMap::new();
        values.insert(PropertyKey::Power, 0.0);
        values.insert(PropertyKey::Speed, 100.0);
        values.insert(PropertyKey::Focus, 0.0);
        values.insert(PropertyKey::Frequency, 5000.0);
        Self { values }
    }

    /// Returns the value stored for `key`
    pub fn get(&self, key: PropertyKey) -> Option<f32> {
        self.values.get(&key).copied()
    }

    /// Stores `value` under `key`, returning the previous value
    pub fn set(&mut self, key: PropertyKey, value: f32) -> Result<Option<f32>, CommandError> {
        let (min, max) = key.range();
        if !value.is_finite() || value < min || value > max {
            return Err(CommandError::PropertyOutOfRange {
                key,
                value,
                min,
                max,
            });
        }
        Ok(self.values.insert(key, value))
    }

    /// Stores `value` under `key`, clamped into the key's range. NaN stores
    /// the lower bound.
    pub fn set_clamped(&mut self, key: PropertyKey, value: f32) -> Option<f32> {
        let (min, max) = key.range();
        let value = if value.is_nan() { min } else { value.clamp(min, max) };
        self.values.insert(key, value)
    }

    /// Builder form of [`set`](Self::set)
    pub fn with(mut self, key: PropertyKey, value: f32) -> Result<Self, CommandError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Removes `key` from the set
    pub fn remove(&mut self, key: PropertyKey) -> Option<f32> {
        self.values.remove(&key)
    }

    /// Laser power in percent; a missing power key reads as zero
    pub fn power(&self) -> f32 {
        self.get(PropertyKey::Power).unwrap_or(0.0)
    }

    /// Whether this property leaves a mark on the material
    pub fn marks(&self) -> bool {
        self.power() > 0.0
    }

    /// Iterates over the stored keys and values in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, f32)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TryFrom<BTreeMap<PropertyKey, f32>> for LaserProperty {
    type Error = CommandError;

    fn try_from(values: BTreeMap<PropertyKey, f32>) -> Result<Self, Self::Error> {
        values
            .into_iter()
            .try_fold(Self::new(), |property, (key, value)| property.with(key, value))
    }
}

impl From<LaserProperty> for BTreeMap<PropertyKey, f32> {
    fn from(property: LaserProperty) -> Self {
        property.values
    }
}

impl fmt::Display for LaserProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}
