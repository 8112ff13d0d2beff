//! Sequential traversal of a selection
//!
//! A [`Walk`] turns a selection into an offset state machine: one step is an add
//! of `x_skip` within a row, or of `y_skip + shift` at a row boundary. `shift`
//! carries the horizontal phase difference between two consecutive physical
//! rows and flips its sign on every row, which keeps patterns whose phase
//! depends on row parity (both greens) exact without a per-pixel branch.

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::FilterPattern;

#[derive(Debug, Clone)]
pub(crate) struct Walk {
    start: usize,
    x_skip: usize,
    y_skip: isize,
    initial_shift: isize,
    width: usize,
    height: usize,

    offset: usize,
    shift: isize,
    columns_left: usize,
    rows_left: usize,
}

impl Walk {
    pub(crate) fn new(
        pattern: FilterPattern,
        row_pixels: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Self {
        let first_row = pattern.physical_row(y);
        let phase = pattern.x_phase(first_row);
        let next_phase = pattern.x_phase(first_row + pattern.y_period);

        let start = first_row * row_pixels + x * pattern.x_period + phase;
        let y_skip = (row_pixels * pattern.y_period) as isize - ((width - 1) * pattern.x_period) as isize;

        let mut walk = Self {
            start,
            x_skip: pattern.x_period,
            y_skip,
            initial_shift: next_phase as isize - phase as isize,
            width,
            height,
            offset: start,
            shift: 0,
            columns_left: 0,
            rows_left: 0,
        };
        walk.rewind();
        walk
    }

    #[inline]
    pub(crate) fn rewind(&mut self) {
        self.offset = self.start;
        self.shift = self.initial_shift;
        self.columns_left = self.width;
        self.rows_left = self.height;
    }

    #[inline]
    pub(crate) fn has_pixel(&self) -> bool {
        self.rows_left != 0
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Moves to the next pixel. Must not be called once exhausted.
    #[inline]
    pub(crate) fn step(&mut self) {
        self.columns_left -= 1;
        if self.columns_left != 0 {
            self.offset += self.x_skip;
        } else {
            self.columns_left = self.width;
            self.offset = self.offset.wrapping_add_signed(self.y_skip + self.shift);
            self.shift = -self.shift;
            self.rows_left -= 1;
        }
    }

    pub(crate) fn remaining(&self) -> usize {
        if self.rows_left == 0 {
            0
        } else {
            (self.rows_left - 1) * self.width + self.columns_left
        }
    }
}

fn end_of_data() -> AnalysisError {
    AnalysisError::OutOfRange("read past the last pixel of the selection".to_string())
}

/// Read cursor over a [`Selection`](crate::raw_analysis::geometry::Selection).
///
/// Besides the explicit cursor API it is a plain `Iterator<Item = u16>`.
#[derive(Debug, Clone)]
pub struct Pixels<'a> {
    samples: &'a [u16],
    walk: Walk,
}

impl<'a> Pixels<'a> {
    pub(crate) fn new(samples: &'a [u16], walk: Walk) -> Self {
        Self { samples, walk }
    }

    /// False once every pixel has been consumed.
    #[inline]
    pub fn has_pixel(&self) -> bool {
        self.walk.has_pixel()
    }

    /// Value under the cursor, without moving.
    #[inline]
    pub fn current(&self) -> Result<u16> {
        if !self.walk.has_pixel() {
            return Err(end_of_data());
        }
        Ok(self.samples[self.walk.offset()])
    }

    /// Returns the value under the cursor, then moves past it.
    #[inline]
    pub fn next_pixel(&mut self) -> Result<u16> {
        let value = self.current()?;
        self.walk.step();
        Ok(value)
    }

    /// Moves to the next pixel and reports whether one remains.
    #[inline]
    pub fn advance(&mut self) -> bool {
        if self.walk.has_pixel() {
            self.walk.step();
        }
        self.walk.has_pixel()
    }

    /// Physical offset of the current pixel in the image buffer.
    #[inline]
    pub fn offset(&self) -> usize {
        self.walk.offset()
    }

    /// Restarts the traversal from the first pixel.
    pub fn rewind(&mut self) {
        self.walk.rewind();
    }
}

impl Iterator for Pixels<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        if !self.walk.has_pixel() {
            return None;
        }
        let value = self.samples[self.walk.offset()];
        self.walk.step();
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.walk.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Pixels<'_> {}

/// Write cursor over a [`SelectionMut`](crate::raw_analysis::geometry::SelectionMut).
#[derive(Debug)]
pub struct PixelsMut<'a> {
    samples: &'a mut [u16],
    walk: Walk,
}

impl<'a> PixelsMut<'a> {
    pub(crate) fn new(samples: &'a mut [u16], walk: Walk) -> Self {
        Self { samples, walk }
    }

    #[inline]
    pub fn has_pixel(&self) -> bool {
        self.walk.has_pixel()
    }

    #[inline]
    pub fn current(&self) -> Result<u16> {
        if !self.walk.has_pixel() {
            return Err(end_of_data());
        }
        Ok(self.samples[self.walk.offset()])
    }

    /// Overwrites the value under the cursor without moving.
    #[inline]
    pub fn set(&mut self, value: u16) -> Result<()> {
        if !self.walk.has_pixel() {
            return Err(end_of_data());
        }
        self.samples[self.walk.offset()] = value;
        Ok(())
    }

    /// Overwrites the value under the cursor, then moves past it.
    #[inline]
    pub fn put(&mut self, value: u16) -> Result<()> {
        self.set(value)?;
        self.walk.step();
        Ok(())
    }

    #[inline]
    pub fn next_pixel(&mut self) -> Result<u16> {
        let value = self.current()?;
        self.walk.step();
        Ok(value)
    }

    #[inline]
    pub fn advance(&mut self) -> bool {
        if self.walk.has_pixel() {
            self.walk.step();
        }
        self.walk.has_pixel()
    }

    pub fn rewind(&mut self) {
        self.walk.rewind();
    }
}
