//! RAW image data types

use std::collections::BTreeMap;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::{Channel, FilterCode, SelectionMut};

/// Optical black border, in physical pixels from the left and top edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskedArea {
    pub left: usize,
    pub top: usize,
}

/// Single channel sensor dump held in memory.
///
/// Samples are stored row-major, `width` samples per row. Calibration (black
/// levels per filter position, white level) travels with the samples so that
/// every channel view can reach it.
#[derive(Debug, Clone)]
pub struct RawImage {
    samples: Vec<u16>,
    width: usize,
    height: usize,
    masked: MaskedArea,
    black_levels: BTreeMap<FilterCode, f64>,
    white_level: Option<u16>,
    name: String,
}

impl RawImage {
    pub fn new(width: usize, height: usize, samples: Vec<u16>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidArgument(format!(
                "image dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(AnalysisError::InvalidArgument(format!(
                "{} samples do not fill a {}x{} image",
                samples.len(),
                width,
                height
            )));
        }
        Ok(Self {
            samples,
            width,
            height,
            masked: MaskedArea::default(),
            black_levels: BTreeMap::new(),
            white_level: None,
            name: String::new(),
        })
    }

    /// Zero-filled image with the shape (dimensions and masked border) of `other`.
    /// Calibration is not carried over.
    pub fn layout(other: &RawImage) -> Self {
        Self {
            samples: vec![0; other.samples.len()],
            width: other.width,
            height: other.height,
            masked: other.masked,
            black_levels: BTreeMap::new(),
            white_level: None,
            name: String::new(),
        }
    }

    /// Sets the optical black border. A side that does not fit inside the image
    /// is reset to 0.
    pub fn with_masked_area(mut self, left: usize, top: usize) -> Self {
        self.masked = MaskedArea {
            left: if left < self.width { left } else { 0 },
            top: if top < self.height { top } else { 0 },
        };
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn masked(&self) -> MaskedArea {
        self.masked
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.samples
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.samples
    }

    pub fn same_shape_as(&self, other: &RawImage) -> bool {
        self.width == other.width && self.height == other.height && self.masked == other.masked
    }

    pub fn black_level(&self, code: FilterCode) -> Result<f64> {
        self.black_levels
            .get(&code)
            .copied()
            .ok_or(AnalysisError::MissingBlackLevel(code))
    }

    pub fn set_black_level(&mut self, code: FilterCode, level: f64) {
        self.black_levels.insert(code, level);
    }

    pub fn white_level(&self) -> Option<u16> {
        self.white_level
    }

    pub fn set_white_level(&mut self, level: Option<u16>) {
        self.white_level = level;
    }

    pub fn channel(&self, code: FilterCode) -> Channel<'_> {
        Channel::new(self, code.pattern())
    }

    /// Writable crop of a channel, in logical coordinates of that channel.
    pub fn select_mut(
        &mut self,
        code: FilterCode,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<SelectionMut<'_>> {
        SelectionMut::new(self, code.pattern(), x, y, width, height)
    }

    /// Writable view of a whole channel.
    pub fn channel_mut(&mut self, code: FilterCode) -> Result<SelectionMut<'_>> {
        let channel = self.channel(code);
        let (width, height) = (channel.width(), channel.height());
        self.select_mut(code, 0, 0, width, height)
    }
}
