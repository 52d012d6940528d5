//! Raster to toolpath conversion
//!
//! [`ToolpathScanner`] walks a [`PixelBuffer`] line by line and produces the
//! `MOVETO` / `LINETO` / `SETPROPERTY` commands that engrave it. Commands are
//! generated lazily: each call to [`ToolpathScanner::step`] advances a small
//! state machine just far enough to yield the next command, so memory use is
//! independent of the raster size.
//!
//! Coordinates along the sweep axis are pixel edges (pixel `i` spans
//! `[i, i + 1)`), coordinates across it are line indices. A run of content
//! `lo..=hi` is therefore engraved from `lo` to `hi + 1` on a forward sweep
//! and from `hi + 1` to `lo` on a reverse one.

use crate::error::{RasterError, RasterResult};
use crate::mapper::PropertyMapper;
use crate::pixel_buffer::PixelBuffer;
use crate::policy::{ScanAxis, ScanPolicy};
use engravekit_core::{Command, LaserProperty, ProgressCallback};
use std::collections::VecDeque;
use std::iter::FusedIterator;

/// Largest overscan a scanner accepts, in pixels
pub const MAX_OVERSCAN_PX: u32 = 1 << 20;

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Nothing emitted yet
    Init,
    /// About to locate the content of the current line
    LineInit,
    /// Sweeping the current line
    Moving,
    /// Current line finished
    LineStep,
    /// No lines remain, or the scan was cancelled
    PassEnded,
}

/// Outcome of [`ToolpathScanner::step`]
#[derive(Debug, Clone, PartialEq)]
pub enum ScanStep {
    Command(Command),
    /// The pass finished normally; no further commands will follow
    Exhausted,
    /// The progress callback stopped the pass
    Cancelled,
}

/// Lazy, single-pass generator of toolpath commands for one raster
pub struct ToolpathScanner<'a, M: PropertyMapper + ?Sized> {
    buffer: &'a PixelBuffer,
    policy: ScanPolicy,
    mapper: &'a M,
    progress: Option<ProgressCallback<'a>>,
    offset: (i64, i64),
    padding_limits: Option<(i64, i64)>,

    state: ScanState,
    pending: VecDeque<Command>,
    line_count: i64,
    line_len: i64,
    line: i64,
    line_step: i64,
    forward: bool,
    pos: i64,
    end: i64,
    head: Option<(i64, i64)>,
    last_property: Option<LaserProperty>,
    lines_done: i64,
    last_report: Option<u8>,
    emitted: usize,
    cancelled: bool,
}

impl<'a, M: PropertyMapper + ?Sized> ToolpathScanner<'a, M> {
    /// Creates a scanner over `buffer`
    pub fn new(buffer: &'a PixelBuffer, policy: ScanPolicy, mapper: &'a M) -> RasterResult<Self> {
        if policy.overscan_px > MAX_OVERSCAN_PX {
            return Err(RasterError::OverscanTooLarge {
                overscan: policy.overscan_px,
                max: MAX_OVERSCAN_PX,
            });
        }

        let (line_count, line_len) = match policy.axis {
            ScanAxis::Horizontal => (buffer.height() as i64, buffer.width() as i64),
            ScanAxis::Vertical => (buffer.width() as i64, buffer.height() as i64),
        };
        let (reverse_lines, reverse_sweep) = match policy.axis {
            ScanAxis::Horizontal => (
                policy.start_corner.is_bottom(),
                policy.start_corner.is_right(),
            ),
            ScanAxis::Vertical => (
                policy.start_corner.is_right(),
                policy.start_corner.is_bottom(),
            ),
        };

        Ok(Self {
            buffer,
            policy,
            mapper,
            progress: None,
            offset: (0, 0),
            padding_limits: None,
            state: ScanState::Init,
            pending: VecDeque::with_capacity(2),
            line_count,
            line_len,
            line: if reverse_lines { line_count - 1 } else { 0 },
            line_step: if reverse_lines { -1 } else { 1 },
            forward: !reverse_sweep,
            pos: 0,
            end: 0,
            head: None,
            last_property: None,
            lines_done: 0,
            last_report: None,
            emitted: 0,
            cancelled: false,
        })
    }

    /// Shifts every emitted coordinate by `(dx, dy)` device pixels
    pub fn with_offset(mut self, dx: i32, dy: i32) -> Self {
        self.offset = (dx as i64, dy as i64);
        self
    }

    /// Keeps overscan padding within `min..=max` device pixels along the sweep
    /// axis. Content is never cut: a line whose content reaches past a limit
    /// simply gets no padding on that side.
    pub fn with_padding_limits(mut self, min: i32, max: i32) -> Self {
        self.padding_limits = Some((min as i64, max as i64));
        self
    }

    /// Declares the property already active on the device, so the scan does
    /// not repeat it
    pub fn with_initial_property(mut self, property: LaserProperty) -> Self {
        self.last_property = Some(property);
        self
    }

    /// Installs a progress callback. It receives the percentage of lines
    /// done after each line and returns `false` to cancel the scan.
    pub fn with_progress(mut self, callback: ProgressCallback<'a>) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn policy(&self) -> &ScanPolicy {
        &self.policy
    }

    /// Number of commands yielded so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Number of lines finished or skipped so far
    pub fn lines_done(&self) -> u32 {
        self.lines_done as u32
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advances the scan to the next command
    pub fn step(&mut self) -> ScanStep {
        loop {
            if let Some(command) = self.pending.pop_front() {
                self.emitted += 1;
                return ScanStep::Command(command);
            }
            match self.state {
                ScanState::Init => self.move_to_start(),
                ScanState::LineInit => self.init_line(),
                ScanState::Moving => self.advance(),
                ScanState::LineStep => self.step_line(),
                ScanState::PassEnded => {
                    return if self.cancelled {
                        ScanStep::Cancelled
                    } else {
                        ScanStep::Exhausted
                    };
                }
            }
        }
    }

    fn move_to_start(&mut self) {
        tracing::debug!(
            width = self.buffer.width(),
            height = self.buffer.height(),
            bits_per_pixel = self.buffer.bits_per_pixel(),
            policy = %self.policy,
            "Starting raster scan"
        );
        let along = if self.forward { 0 } else { self.line_len };
        self.emit_move(along);
        self.state = ScanState::LineInit;
    }

    fn init_line(&mut self) {
        let extent = loop {
            if !self.line_in_range(self.line) {
                self.end_pass();
                return;
            }
            match self.extent(self.line) {
                Some(extent) => break Some(extent),
                None if self.policy.skip_blank_lines => {
                    self.line += self.line_step;
                    self.lines_done += 1;
                }
                None => break None,
            }
        };

        let k = self.policy.overscan_px as i64;
        let (left, right) = match extent {
            Some((lo, hi)) => match self.extent(self.line + self.line_step) {
                Some((next_lo, next_hi)) => (
                    (lo - k).max(lo.min(next_lo - k)),
                    (hi + 1 + k).min((hi + 1).max(next_hi + 1 + k)),
                ),
                None => (lo - k, hi + 1 + k),
            },
            None => (-k, self.line_len + k),
        };
        let (left, right) = self.limit_padding(extent, left, right);

        if self.forward {
            self.pos = left;
            self.end = right;
        } else {
            self.pos = right;
            self.end = left;
        }
        if self.head != Some((self.pos, self.line)) {
            self.emit_move(self.pos);
        }
        self.state = ScanState::Moving;
    }

    fn advance(&mut self) {
        if self.pos == self.end {
            self.state = ScanState::LineStep;
            return;
        }

        let property = self.property_at(self.pos);
        let mut next = self.next_change(self.pos);
        while next != self.end && self.property_at(next) == property {
            next = self.next_change(next);
        }

        let marks = property.marks();
        if self.last_property.as_ref() != Some(&property) {
            self.pending.push_back(Command::SetProperty(property.clone()));
            self.last_property = Some(property);
        }
        if marks {
            self.emit_line(next);
        } else {
            self.emit_move(next);
        }
        self.pos = next;
    }

    /// Applies the padding limits, translated into raster coordinates
    fn limit_padding(&self, extent: Option<(i64, i64)>, left: i64, right: i64) -> (i64, i64) {
        let Some((min, max)) = self.padding_limits else {
            return (left, right);
        };
        let along_offset = match self.policy.axis {
            ScanAxis::Horizontal => self.offset.0,
            ScanAxis::Vertical => self.offset.1,
        };
        let (first, last) = match extent {
            Some((lo, hi)) => (lo, hi + 1),
            None => (0, self.line_len),
        };
        (
            left.max(min - along_offset).min(first),
            right.min(max - along_offset).max(last),
        )
    }

    fn step_line(&mut self) {
        self.line += self.line_step;
        self.lines_done += 1;
        if self.policy.is_bidirectional() {
            self.forward = !self.forward;
        }

        let finished = self.lines_done >= self.line_count;
        let percent = (self.lines_done.min(self.line_count) * 100 / self.line_count) as u8;
        // the last line is already emitted, so its report cannot cancel
        if !self.report(percent) && !finished {
            tracing::info!(
                lines_done = self.lines_done,
                commands = self.emitted,
                "Raster scan cancelled"
            );
            self.cancelled = true;
            self.state = ScanState::PassEnded;
            return;
        }
        self.state = ScanState::LineInit;
    }

    fn end_pass(&mut self) {
        if self.last_report != Some(100) {
            // cancellation is only honoured between lines
            self.report(100);
        }
        tracing::debug!(
            commands = self.emitted,
            lines = self.line_count,
            "Raster scan finished"
        );
        self.state = ScanState::PassEnded;
    }

    fn report(&mut self, percent: u8) -> bool {
        let percent = self.last_report.map_or(percent, |last| percent.max(last));
        self.last_report = Some(percent);
        match self.progress.as_mut() {
            Some(callback) => callback(percent),
            None => true,
        }
    }

    fn line_in_range(&self, line: i64) -> bool {
        line >= 0 && line < self.line_count
    }

    /// First and last non-background pixel of `line`
    fn extent(&self, line: i64) -> Option<(i64, i64)> {
        if !self.line_in_range(line) {
            return None;
        }
        let line = line as u32;
        let (lo, hi) = match self.policy.axis {
            ScanAxis::Horizontal => (self.buffer.leftmost(line)?, self.buffer.rightmost(line)?),
            ScanAxis::Vertical => (self.buffer.topmost(line)?, self.buffer.bottommost(line)?),
        };
        Some((lo as i64, hi as i64))
    }

    /// Raw value of the pixel swept next from edge `pos`; background outside
    /// the raster
    fn sample(&self, pos: i64) -> u32 {
        let index = if self.forward { pos } else { pos - 1 };
        if index < 0 || index >= self.line_len {
            return 0;
        }
        match self.policy.axis {
            ScanAxis::Horizontal => self.buffer.pixel(index as u32, self.line as u32),
            ScanAxis::Vertical => self.buffer.pixel(self.line as u32, index as u32),
        }
    }

    fn property_at(&self, pos: i64) -> LaserProperty {
        self.mapper.map(self.buffer.grey_of(self.sample(pos)))
    }

    /// Next edge in the sweep direction where the pixel value changes,
    /// limited to the end of the padded range
    fn next_change(&self, pos: i64) -> i64 {
        let line = self.line as u32;
        match (self.policy.axis, self.forward) {
            (ScanAxis::Horizontal, true) => self
                .buffer
                .next_change_heading_right(pos, line, self.end)
                .min(self.end),
            (ScanAxis::Horizontal, false) => self
                .buffer
                .next_change_heading_left(pos, line, self.end)
                .max(self.end),
            (ScanAxis::Vertical, true) => self
                .buffer
                .next_change_heading_bottom(line, pos, self.end)
                .min(self.end),
            (ScanAxis::Vertical, false) => self
                .buffer
                .next_change_heading_top(line, pos, self.end)
                .max(self.end),
        }
    }

    fn device(&self, along: i64) -> (i32, i32) {
        let (x, y) = match self.policy.axis {
            ScanAxis::Horizontal => (along, self.line),
            ScanAxis::Vertical => (self.line, along),
        };
        (
            clamp_i32(x + self.offset.0),
            clamp_i32(y + self.offset.1),
        )
    }

    fn emit_move(&mut self, along: i64) {
        let (x, y) = self.device(along);
        self.pending.push_back(Command::MoveTo { x, y });
        self.head = Some((along, self.line));
    }

    fn emit_line(&mut self, along: i64) {
        let (x, y) = self.device(along);
        self.pending.push_back(Command::LineTo { x, y });
        self.head = Some((along, self.line));
    }
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

impl<M: PropertyMapper + ?Sized> Iterator for ToolpathScanner<'_, M> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        match self.step() {
            ScanStep::Command(command) => Some(command),
            ScanStep::Exhausted | ScanStep::Cancelled => None,
        }
    }
}

impl<M: PropertyMapper + ?Sized> FusedIterator for ToolpathScanner<'_, M> {}
