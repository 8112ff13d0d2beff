use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::{FilterPattern, Selection};
use crate::raw_analysis::raw::RawImage;

fn bayer_extent(physical: usize) -> usize {
    physical & !1
}

/// One colour filter position of a [`RawImage`] seen as a dense logical grid.
#[derive(Debug, Clone, Copy)]
pub struct Channel<'a> {
    image: &'a RawImage,
    pattern: FilterPattern,
}

impl<'a> Channel<'a> {
    pub fn new(image: &'a RawImage, pattern: FilterPattern) -> Self {
        Self { image, pattern }
    }

    pub fn image(&self) -> &'a RawImage {
        self.image
    }

    pub fn pattern(&self) -> FilterPattern {
        self.pattern
    }

    /// Logical width. Only complete 2x2 Bayer cells are covered, so every
    /// channel of an odd sized frame spans the same photosites.
    pub fn width(&self) -> usize {
        bayer_extent(self.image.width()) / self.pattern.x_period
    }

    pub fn height(&self) -> usize {
        bayer_extent(self.image.height()) / self.pattern.y_period
    }

    pub fn black_level(&self) -> Result<f64> {
        self.image.black_level(self.pattern.code)
    }

    pub fn select(&self, x: usize, y: usize, width: usize, height: usize) -> Result<Selection<'a>> {
        Selection::new(*self, x, y, width, height)
    }

    /// The whole channel.
    pub fn select_all(&self) -> Result<Selection<'a>> {
        self.select(0, 0, self.width(), self.height())
    }

    /// Optical black band on the left edge of the sensor.
    ///
    /// Unless `overlapping_top` is set the band starts below the top mask. With
    /// `safety_crop` a few logical pixels are trimmed from every side, since the
    /// photosites bordering the active area leak some light.
    pub fn left_mask(&self, safety_crop: bool, overlapping_top: bool) -> Result<Selection<'a>> {
        let masked = self.image.masked();
        if masked.left == 0 {
            return Err(AnalysisError::MissingMask);
        }

        let factor_h = if self.pattern.y_period == 1 { 1 } else { 2 };
        let factor_w = if self.pattern.x_period == 1 { 1 } else { 2 };

        let cy = if overlapping_top { 0 } else { masked.top / factor_h };
        let band = self.select(0, cy, masked.left / factor_w, self.height().saturating_sub(cy))?;

        if !safety_crop {
            return Ok(band);
        }

        let mut margin_h = if self.pattern.y_period == 1 { 4 } else { 2 };
        let mut margin_w = if self.pattern.x_period == 1 { 4 } else { 2 };
        margin_h = margin_h.min(band.height() / 4);
        margin_w = margin_w.min(band.width() / 4);

        band.sub_select(
            margin_w,
            margin_h,
            band.width() - margin_w * 2,
            band.height() - margin_h * 2,
        )
    }
}
