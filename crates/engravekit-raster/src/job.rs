//! Raster job parts
//!
//! A [`RasterJobPart`] ties a raster to its place on the machine: the device
//! resolution, the offset of its top-left corner and the property the device
//! starts with. It is the caller-side wrapper that turns a raster into a
//! [`CommandStream`] ready for a backend.

use crate::error::{RasterError, RasterResult};
use crate::greyscale::GreyRaster;
use crate::mapper::PropertyMapper;
use crate::pixel_buffer::PixelBuffer;
use crate::policy::{ScanAxis, ScanPolicy};
use crate::scanner::{ScanStep, ToolpathScanner};
use engravekit_core::units::{mm_to_px, px_to_mm};
use engravekit_core::{Bounds, CommandError, CommandStream, LaserProperty, ProgressCallback};

/// One raster placed on the machine bed
#[derive(Debug, Clone)]
pub struct RasterJobPart {
    raster: PixelBuffer,
    initial_property: LaserProperty,
    offset: (i32, i32),
    dpi: f64,
    bed: Option<(u32, u32)>,
}

impl RasterJobPart {
    /// Creates a job part at the bed origin
    pub fn new(raster: PixelBuffer, initial_property: LaserProperty, dpi: f64) -> RasterResult<Self> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(CommandError::InvalidResolution { dpi }.into());
        }
        Ok(Self {
            raster,
            initial_property,
            offset: (0, 0),
            dpi,
            bed: None,
        })
    }

    /// Creates a job part from a greyscale raster
    pub fn from_image<const BITS: u8>(
        image: GreyRaster<BITS>,
        initial_property: LaserProperty,
        dpi: f64,
    ) -> RasterResult<Self> {
        Self::new(image.into_buffer(), initial_property, dpi)
    }

    /// Places the raster's top-left corner at `(x, y)` device pixels
    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.offset = (x, y);
        self
    }

    /// Places the part on a bed of the given size in millimetres. Overscan
    /// padding of every scan is then kept on the bed.
    pub fn with_bed(mut self, bed_width_mm: f64, bed_height_mm: f64) -> Self {
        self.bed = Some(self.bed_px(bed_width_mm, bed_height_mm));
        self
    }

    /// Bed size in device pixels, if one was set
    pub fn bed(&self) -> Option<(u32, u32)> {
        self.bed
    }

    fn bed_px(&self, bed_width_mm: f64, bed_height_mm: f64) -> (u32, u32) {
        (
            mm_to_px(bed_width_mm, self.dpi).clamp(0, u32::MAX as i64) as u32,
            mm_to_px(bed_height_mm, self.dpi).clamp(0, u32::MAX as i64) as u32,
        )
    }

    pub fn raster(&self) -> &PixelBuffer {
        &self.raster
    }

    pub fn initial_property(&self) -> &LaserProperty {
        &self.initial_property
    }

    pub fn offset(&self) -> (i32, i32) {
        self.offset
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn min_x(&self) -> i32 {
        self.offset.0
    }

    pub fn max_x(&self) -> i32 {
        self.offset.0.saturating_add_unsigned(self.raster.width())
    }

    pub fn min_y(&self) -> i32 {
        self.offset.1
    }

    pub fn max_y(&self) -> i32 {
        self.offset.1.saturating_add_unsigned(self.raster.height())
    }

    /// Device-space area covered by the raster
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::at(self.min_x(), self.min_y());
        bounds.include(self.max_x(), self.max_y());
        bounds
    }

    /// Physical size in millimetres
    pub fn size_mm(&self) -> (f64, f64) {
        (
            px_to_mm(self.raster.width() as f64, self.dpi),
            px_to_mm(self.raster.height() as f64, self.dpi),
        )
    }

    /// Converts an overscan length to whole device pixels at this part's DPI
    pub fn overscan_px(&self, overscan_mm: f64) -> u32 {
        mm_to_px(overscan_mm, self.dpi).clamp(0, u32::MAX as i64) as u32
    }

    /// Checks that the raster lies on a bed of the given size in millimetres
    pub fn check_bed(&self, bed_width_mm: f64, bed_height_mm: f64) -> RasterResult<()> {
        let (bed_width, bed_height) = self.bed_px(bed_width_mm, bed_height_mm);
        if self.min_x() < 0
            || self.min_y() < 0
            || self.max_x() as i64 > bed_width as i64
            || self.max_y() as i64 > bed_height as i64
        {
            return Err(RasterError::OutsideBed {
                x: self.offset.0,
                y: self.offset.1,
                width: self.raster.width(),
                height: self.raster.height(),
                bed_width,
                bed_height,
            });
        }
        Ok(())
    }

    /// Creates a scanner positioned at this part's offset, with padding kept
    /// on the bed when one is set
    pub fn scanner<'a, M>(
        &'a self,
        policy: ScanPolicy,
        mapper: &'a M,
    ) -> RasterResult<ToolpathScanner<'a, M>>
    where
        M: PropertyMapper + ?Sized,
    {
        let axis = policy.axis;
        let scanner = ToolpathScanner::new(&self.raster, policy, mapper)?
            .with_offset(self.offset.0, self.offset.1)
            .with_initial_property(self.initial_property.clone());
        Ok(match self.bed {
            Some((width, height)) => {
                let limit = match axis {
                    ScanAxis::Horizontal => width,
                    ScanAxis::Vertical => height,
                };
                scanner.with_padding_limits(0, limit.min(i32::MAX as u32) as i32)
            }
            None => scanner,
        })
    }

    /// Scans the raster into a command stream
    pub fn to_command_stream<M>(&self, policy: ScanPolicy, mapper: &M) -> RasterResult<CommandStream>
    where
        M: PropertyMapper + ?Sized,
    {
        let scanner = self.scanner(policy, mapper)?;
        self.collect(scanner)
    }

    /// Scans the raster into a command stream, reporting progress.
    ///
    /// Fails with [`RasterError::Cancelled`] when the callback stops the scan.
    pub fn to_command_stream_with_progress<'a, M>(
        &'a self,
        policy: ScanPolicy,
        mapper: &'a M,
        progress: ProgressCallback<'a>,
    ) -> RasterResult<CommandStream>
    where
        M: PropertyMapper + ?Sized,
    {
        let scanner = self.scanner(policy, mapper)?.with_progress(progress);
        self.collect(scanner)
    }

    fn collect<M>(&self, mut scanner: ToolpathScanner<'_, M>) -> RasterResult<CommandStream>
    where
        M: PropertyMapper + ?Sized,
    {
        let mut stream = CommandStream::new(self.initial_property.clone(), self.dpi)?;
        loop {
            match scanner.step() {
                ScanStep::Command(command) => stream.push(command),
                ScanStep::Exhausted => break,
                ScanStep::Cancelled => return Err(RasterError::Cancelled),
            }
        }
        tracing::info!(
            width = self.raster.width(),
            height = self.raster.height(),
            dpi = self.dpi,
            commands = stream.len(),
            "Raster job part converted"
        );
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greyscale::{BlackWhiteImage, GreyscaleImage};
    use crate::mapper::LinearPowerMapper;
    use engravekit_core::Command;

    fn part() -> RasterJobPart {
        let mut img = BlackWhiteImage::new(4, 2).unwrap();
        img.set_black(1, 0, true);
        img.set_black(2, 0, true);
        RasterJobPart::from_image(img, LaserProperty::engraving(), 254.0).unwrap()
    }

    #[test]
    fn test_rejects_bad_dpi() {
        let buf = PixelBuffer::new(1, 1, 1).unwrap();
        assert!(matches!(
            RasterJobPart::new(buf, LaserProperty::engraving(), 0.0),
            Err(RasterError::Command(CommandError::InvalidResolution { .. }))
        ));
    }

    #[test]
    fn test_extents_follow_offset() {
        let part = part().with_offset(100, 50);
        assert_eq!(part.min_x(), 100);
        assert_eq!(part.max_x(), 104);
        assert_eq!(part.min_y(), 50);
        assert_eq!(part.max_y(), 52);
        assert_eq!(part.bounds().width(), 4);
        let (w, h) = part.size_mm();
        assert!((w - 0.4).abs() < 1e-9);
        assert!((h - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_overscan_conversion() {
        let part = part();
        assert_eq!(part.overscan_px(1.0), 10);
        assert_eq!(part.overscan_px(-1.0), 0);
    }

    #[test]
    fn test_check_bed() {
        let part = part().with_offset(10, 10);
        assert!(part.check_bed(10.0, 10.0).is_ok());
        assert!(matches!(
            part.check_bed(1.3, 10.0),
            Err(RasterError::OutsideBed { bed_width: 13, .. })
        ));
        assert!(part.clone().with_offset(-1, 0).check_bed(10.0, 10.0).is_err());
    }

    #[test]
    fn test_padding_stays_on_bed() {
        let mut img = BlackWhiteImage::new(4, 1).unwrap();
        img.fill_with(|_, _| 0);
        let part = RasterJobPart::from_image(img, LaserProperty::engraving(), 254.0).unwrap();
        let mapper = LinearPowerMapper::with_max_power(60.0).unwrap();
        let policy = ScanPolicy::default().with_overscan(3);

        let loose = part.to_command_stream(policy, &mapper).unwrap();
        let bounds = loose.bounds().unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (-3, 7));

        // 0.5 mm at 254 dpi is a 5 px bed
        let part = part.with_bed(0.5, 1.0);
        assert_eq!(part.bed(), Some((5, 10)));
        assert!(part.check_bed(0.5, 1.0).is_ok());
        let stream = part.to_command_stream(policy, &mapper).unwrap();
        let bounds = stream.bounds().unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (0, 5));
    }

    #[test]
    fn test_vertical_padding_uses_bed_height() {
        let mut img = BlackWhiteImage::new(1, 4).unwrap();
        img.fill_with(|_, _| 0);
        let part = RasterJobPart::from_image(img, LaserProperty::engraving(), 254.0)
            .unwrap()
            .with_offset(0, 2)
            .with_bed(1.0, 0.7);
        let mapper = LinearPowerMapper::with_max_power(60.0).unwrap();
        let policy = ScanPolicy::default()
            .with_axis(ScanAxis::Vertical)
            .with_overscan(3);
        let bounds = part.to_command_stream(policy, &mapper).unwrap().bounds().unwrap();
        assert_eq!((bounds.min_y, bounds.max_y), (0, 7));
    }

    #[test]
    fn test_stream_starts_with_initial_property() {
        let part = part().with_offset(5, 7);
        let mapper = LinearPowerMapper::with_max_power(60.0).unwrap();
        let stream = part.to_command_stream(ScanPolicy::default(), &mapper).unwrap();

        assert_eq!(
            stream.commands()[0],
            Command::SetProperty(LaserProperty::engraving())
        );
        assert_eq!(stream.commands()[1], Command::MoveTo { x: 5, y: 7 });
        assert_eq!(stream.dpi(), 254.0);
        let bounds = stream.bounds().unwrap();
        assert_eq!((bounds.min_x, bounds.max_x), (5, 8));
        assert_eq!(stream.current_property().power(), 60.0);
    }

    #[test]
    fn test_refusing_final_report_keeps_stream() {
        let mut img = BlackWhiteImage::new(2, 2).unwrap();
        img.fill_with(|x, _| if x == 0 { 0 } else { 255 });
        let part = RasterJobPart::from_image(img, LaserProperty::engraving(), 500.0).unwrap();
        let mapper = LinearPowerMapper::with_max_power(100.0).unwrap();
        let stream = part
            .to_command_stream_with_progress(
                ScanPolicy::default(),
                &mapper,
                Box::new(|percent| percent < 100),
            )
            .unwrap();
        assert_eq!(stream.commands().last(), Some(&Command::LineTo { x: 0, y: 1 }));
        assert_eq!(stream.len(), 6);
    }

    #[test]
    fn test_cancelled_stream() {
        let mut img = BlackWhiteImage::new(2, 4).unwrap();
        img.fill_with(|x, _| if x == 0 { 0 } else { 255 });
        let part = RasterJobPart::from_image(img, LaserProperty::engraving(), 500.0).unwrap();
        let mapper = LinearPowerMapper::with_max_power(100.0).unwrap();
        let result = part.to_command_stream_with_progress(
            ScanPolicy::default(),
            &mapper,
            Box::new(|_| false),
        );
        assert!(matches!(result, Err(RasterError::Cancelled)));
    }
}
