//! Quick-look rendering of a Bayer mosaic
//!
//! Each 2x2 cell becomes one 8-bit RGB pixel. Unclipped cells are shown as grey
//! through a gamma lookup table, clipped cells are painted in the colour of the
//! filter positions that reached the white level.

use tracing::{debug, instrument};

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::BayerCells;
use crate::raw_analysis::raw::RawImage;

/// Interleaved RGB pixels ready for an RGB writer.
#[derive(Debug, Clone)]
pub struct RgbImageData {
    pub width: usize,
    pub height: usize,
    /// Interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u16>,
    /// Significant bits per component (8 or 16)
    pub bits_per_sample: u32,
}

impl RgbImageData {
    /// Component triplet at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u16; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y * self.width + x) * 3;
        Some([self.data[index], self.data[index + 1], self.data[index + 2]])
    }
}

/// Display encoding from sensor values to 8-bit grey.
#[derive(Debug, Clone)]
pub struct GammaTable {
    lut: Vec<u8>,
}

impl GammaTable {
    pub const DEFAULT_GAMMA: f64 = 2.2;

    /// `lut[v] = round(255 * (v / white)^(1 / gamma))` for `v` in `0..=white`.
    pub fn new(white_level: u16, gamma: f64) -> Result<Self> {
        if white_level == 0 {
            return Err(AnalysisError::InvalidArgument(
                "gamma table needs a positive white level".to_string(),
            ));
        }
        if !(gamma.is_finite() && gamma > 0.0) {
            return Err(AnalysisError::InvalidArgument(format!("invalid gamma {}", gamma)));
        }

        let white = f64::from(white_level);
        let exponent = 1.0 / gamma;
        let lut = (0..=white_level)
            .map(|value| (255.0 * (f64::from(value) / white).powf(exponent)).round() as u8)
            .collect();
        Ok(Self { lut })
    }

    pub fn white_level(&self) -> u16 {
        (self.lut.len() - 1) as u16
    }

    /// Values above the white level saturate.
    #[inline]
    pub fn get(&self, value: u16) -> u8 {
        self.lut.get(usize::from(value)).copied().unwrap_or(u8::MAX)
    }
}

/// Renders the clipping map of `image`: one RGB pixel per 2x2 cell.
#[instrument(skip(image, gamma), fields(width = image.width(), height = image.height()))]
pub fn highlight_clipping(image: &RawImage, white_level: u16, gamma: &GammaTable) -> Result<RgbImageData> {
    let cells = BayerCells::new(image)?;
    let width = image.width() / 2;
    let height = image.height() / 2;
    let mut data = Vec::with_capacity(width * height * 3);
    let mut clipped_cells = 0usize;

    for cell in cells {
        let [r, g1, g2, b] = cell.values.map(|value| value >= white_level);
        if r || g1 || g2 || b {
            clipped_cells += 1;
            let paint = |clipped: bool| if clipped { u16::from(u8::MAX) } else { 0 };
            data.extend([paint(r), paint(g1 || g2), paint(b)]);
        } else {
            let sum: u32 = cell.values.iter().map(|&value| u32::from(value)).sum();
            let mean = ((sum + 2) / 4) as u16;
            let grey = u16::from(gamma.get(mean));
            data.extend([grey, grey, grey]);
        }
    }

    debug!("{} of {} cells clipped", clipped_cells, width * height);

    Ok(RgbImageData {
        width,
        height,
        data,
        bits_per_sample: 8,
    })
}
