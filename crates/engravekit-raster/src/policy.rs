//! Scan policy: how a raster is swept
//!
//! The policy decides the scan axis, the corner the head starts in, whether
//! consecutive lines alternate direction, whether blank lines are skipped and
//! how much overscan pads each sweep.

use crate::error::{RasterError, RasterResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis the laser head sweeps along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanAxis {
    /// Sweep along rows (X axis)
    #[default]
    Horizontal,
    /// Sweep along columns (Y axis)
    Vertical,
}

/// Corner of the raster where the scan starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartCorner {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl StartCorner {
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    fn from_sides(bottom: bool, right: bool) -> Self {
        match (bottom, right) {
            (false, false) => Self::TopLeft,
            (false, true) => Self::TopRight,
            (true, false) => Self::BottomLeft,
            (true, true) => Self::BottomRight,
        }
    }
}

/// Whether consecutive lines alternate sweep direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionMode {
    /// Serpentine: every line reverses the previous one
    #[default]
    Bidirectional,
    /// Every line is swept in the same direction
    Unidirectional,
}

/// Complete scan configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanPolicy {
    pub axis: ScanAxis,
    pub start_corner: StartCorner,
    pub direction: DirectionMode,
    pub skip_blank_lines: bool,
    /// Extra travel before and after each run of content, in pixels
    pub overscan_px: u32,
}

impl Default for ScanPolicy {
    /// Serpentine along X from the top left, skipping blank lines
    fn default() -> Self {
        Self {
            axis: ScanAxis::Horizontal,
            start_corner: StartCorner::TopLeft,
            direction: DirectionMode::Bidirectional,
            skip_blank_lines: true,
            overscan_px: 0,
        }
    }
}

impl ScanPolicy {
    /// Legacy flag: sweep along Y instead of X
    pub const Y_AXIS: u32 = 1;
    /// Legacy flag: start at the bottom edge
    pub const BOTTOM: u32 = 2;
    /// Legacy flag: start at the right edge
    pub const RIGHT: u32 = 4;
    /// Legacy flag: sweep every line in the same direction
    pub const UNIDIRECTIONAL: u32 = 8;
    /// Legacy flag: sweep blank lines instead of skipping them
    pub const NO_SKIP: u32 = 16;

    const KNOWN_FLAGS: u32 =
        Self::Y_AXIS | Self::BOTTOM | Self::RIGHT | Self::UNIDIRECTIONAL | Self::NO_SKIP;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, axis: ScanAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_start_corner(mut self, corner: StartCorner) -> Self {
        self.start_corner = corner;
        self
    }

    pub fn with_direction(mut self, direction: DirectionMode) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    pub fn with_overscan(mut self, pixels: u32) -> Self {
        self.overscan_px = pixels;
        self
    }

    pub fn is_bidirectional(&self) -> bool {
        self.direction == DirectionMode::Bidirectional
    }

    /// Decodes the historic OR-ed bit-flag word. Zero means serpentine along
    /// X from the top left, skipping blank lines.
    pub fn from_legacy_flags(flags: u32, overscan_px: u32) -> RasterResult<Self> {
        let unknown = flags & !Self::KNOWN_FLAGS;
        if unknown != 0 {
            return Err(RasterError::UnknownPolicyFlags(unknown));
        }
        Ok(Self {
            axis: if flags & Self::Y_AXIS != 0 {
                ScanAxis::Vertical
            } else {
                ScanAxis::Horizontal
            },
            start_corner: StartCorner::from_sides(
                flags & Self::BOTTOM != 0,
                flags & Self::RIGHT != 0,
            ),
            direction: if flags & Self::UNIDIRECTIONAL != 0 {
                DirectionMode::Unidirectional
            } else {
                DirectionMode::Bidirectional
            },
            skip_blank_lines: flags & Self::NO_SKIP == 0,
            overscan_px,
        })
    }

    /// Encodes the policy as the historic bit-flag word (overscan excluded)
    pub fn to_legacy_flags(&self) -> u32 {
        let mut flags = 0;
        if self.axis == ScanAxis::Vertical {
            flags |= Self::Y_AXIS;
        }
        if self.start_corner.is_bottom() {
            flags |= Self::BOTTOM;
        }
        if self.start_corner.is_right() {
            flags |= Self::RIGHT;
        }
        if self.direction == DirectionMode::Unidirectional {
            flags |= Self::UNIDIRECTIONAL;
        }
        if !self.skip_blank_lines {
            flags |= Self::NO_SKIP;
        }
        flags
    }
}

impl fmt::Display for ScanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} from {:?}, {:?}, {}, overscan {} px",
            self.axis,
            self.start_corner,
            self.direction,
            if self.skip_blank_lines {
                "skipping blank lines"
            } else {
                "sweeping blank lines"
            },
            self.overscan_px
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_serpentine_x() {
        let policy = ScanPolicy::default();
        assert_eq!(policy.axis, ScanAxis::Horizontal);
        assert_eq!(policy.start_corner, StartCorner::TopLeft);
        assert!(policy.is_bidirectional());
        assert!(policy.skip_blank_lines);
        assert_eq!(policy.to_legacy_flags(), 0);
    }

    #[test]
    fn test_legacy_flags() {
        let policy = ScanPolicy::from_legacy_flags(
            ScanPolicy::Y_AXIS | ScanPolicy::RIGHT | ScanPolicy::NO_SKIP,
            12,
        )
        .unwrap();
        assert_eq!(policy.axis, ScanAxis::Vertical);
        assert_eq!(policy.start_corner, StartCorner::TopRight);
        assert_eq!(policy.direction, DirectionMode::Bidirectional);
        assert!(!policy.skip_blank_lines);
        assert_eq!(policy.overscan_px, 12);

        for flags in 0..32 {
            let policy = ScanPolicy::from_legacy_flags(flags, 0).unwrap();
            assert_eq!(policy.to_legacy_flags(), flags);
        }
    }

    #[test]
    fn test_unknown_legacy_flags() {
        assert!(matches!(
            ScanPolicy::from_legacy_flags(0x41, 0),
            Err(RasterError::UnknownPolicyFlags(0x40))
        ));
    }

    #[test]
    fn test_builders_and_display() {
        let policy = ScanPolicy::new()
            .with_axis(ScanAxis::Vertical)
            .with_start_corner(StartCorner::BottomRight)
            .with_direction(DirectionMode::Unidirectional)
            .with_skip_blank_lines(false)
            .with_overscan(3);
        assert_eq!(
            policy.to_string(),
            "Vertical from BottomRight, Unidirectional, sweeping blank lines, overscan 3 px"
        );
    }

    #[test]
    fn test_serde() {
        let policy = ScanPolicy::new().with_start_corner(StartCorner::BottomLeft);
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains(r#""start_corner":"bottom_left""#));
        let back: ScanPolicy = serde_json::from_str(r#"{"axis":"vertical"}"#).unwrap();
        assert_eq!(back.axis, ScanAxis::Vertical);
        assert!(back.skip_blank_lines);
    }
}
