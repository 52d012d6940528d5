//! Toolpath statistics
//!
//! [`ToolpathStats`] is a [`CommandSink`] that measures a command stream
//! instead of driving a device: command counts, property changes and the
//! length of travel and cutting moves.

use engravekit_core::units::px_to_mm;
use engravekit_core::{CommandSink, LaserProperty};
use std::convert::Infallible;

/// Summary of a command stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolpathStats {
    pub property_changes: usize,
    pub moves: usize,
    pub lines: usize,
    /// Laser-off travel, in device pixels
    pub travel_px: f64,
    /// Laser-on travel, in device pixels
    pub cut_px: f64,
    /// Resolution reported when the stream finished
    pub dpi: Option<f64>,
    position: Option<(i32, i32)>,
}

impl ToolpathStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of commands seen
    pub fn commands(&self) -> usize {
        self.property_changes + self.moves + self.lines
    }

    /// Laser-off travel in millimetres, once the stream has finished
    pub fn travel_mm(&self) -> Option<f64> {
        self.dpi.map(|dpi| px_to_mm(self.travel_px, dpi))
    }

    /// Laser-on travel in millimetres, once the stream has finished
    pub fn cut_mm(&self) -> Option<f64> {
        self.dpi.map(|dpi| px_to_mm(self.cut_px, dpi))
    }

    /// Rough job duration for the given travel and cutting speeds in mm/s
    pub fn estimated_seconds(&self, travel_mm_s: f64, cut_mm_s: f64) -> Option<f64> {
        if travel_mm_s <= 0.0 || cut_mm_s <= 0.0 {
            return None;
        }
        Some(self.travel_mm()? / travel_mm_s + self.cut_mm()? / cut_mm_s)
    }

    fn advance(&mut self, x: i32, y: i32) -> f64 {
        let distance = match self.position {
            Some((px, py)) => {
                let dx = (x as f64) - (px as f64);
                let dy = (y as f64) - (py as f64);
                dx.hypot(dy)
            }
            None => 0.0,
        };
        self.position = Some((x, y));
        distance
    }
}

impl CommandSink for ToolpathStats {
    type Error = Infallible;

    fn set_property(&mut self, _property: &LaserProperty) -> Result<(), Infallible> {
        self.property_changes += 1;
        Ok(())
    }

    fn move_to(&mut self, x: i32, y: i32) -> Result<(), Infallible> {
        self.moves += 1;
        self.travel_px += self.advance(x, y);
        Ok(())
    }

    fn line_to(&mut self, x: i32, y: i32) -> Result<(), Infallible> {
        self.lines += 1;
        self.cut_px += self.advance(x, y);
        Ok(())
    }

    fn finish(&mut self, dpi: f64) -> Result<(), Infallible> {
        self.dpi = Some(dpi);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engravekit_core::CommandStream;

    #[test]
    fn test_measures_stream() {
        let mut stream = CommandStream::new(LaserProperty::engraving(), 254.0).unwrap();
        stream.move_to(0, 0);
        stream.move_to(3, 4);
        stream.line_to(13, 4);
        stream.move_to(13, 5);

        let mut stats = ToolpathStats::new();
        stream.deliver(&mut stats).unwrap();
        assert_eq!(stats.commands(), 5);
        assert_eq!(stats.property_changes, 1);
        assert_eq!(stats.moves, 3);
        assert_eq!(stats.lines, 1);
        assert!((stats.travel_px - 6.0).abs() < 1e-9);
        assert!((stats.cut_px - 10.0).abs() < 1e-9);
        assert!((stats.cut_mm().unwrap() - 1.0).abs() < 1e-9);
        assert!((stats.estimated_seconds(6.0, 1.0).unwrap() - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_unfinished_has_no_lengths() {
        let mut stats = ToolpathStats::new();
        stats.line_to(10, 0).unwrap();
        assert_eq!(stats.cut_mm(), None);
        assert_eq!(stats.estimated_seconds(1.0, 1.0), None);
    }
}
