//! Camera RAW decoding through the rawloader library.
//!
//! Supports whatever rawloader can decode (ARW, CR2, NEF, RAF, DNG, ...). Besides
//! the samples, the sensor metadata seeds the calibration: black levels per
//! filter position, the white level and the optical black border taken from the
//! crop margins.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::FilterCode;
use crate::raw_analysis::raw::reader::RawImageReader;
use crate::raw_analysis::raw::types::RawImage;

/// RAW image reader that uses the rawloader library for decoding.
///
/// Black levels are mapped positionally onto an RGGB cell: R, G1, G2, B.
pub struct RawLoaderReader;

impl RawImageReader for RawLoaderReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding camera RAW, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(AnalysisError::UnsupportedFormat(format!(
                "{} components per pixel, only single channel mosaics are supported",
                decoded.cpp
            )));
        }

        let width = decoded.width;
        let height = decoded.height;

        debug!("Decoded {} {}: {}x{}", decoded.clean_make, decoded.clean_model, width, height);

        // Float data (normalized 0.0-1.0) is scaled to the u16 range
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => {
                values.iter().map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32) as u16).collect()
            }
        };

        let [top, _right, _bottom, left] = decoded.crops;
        let mut image = RawImage::new(width, height, samples)?
            .with_masked_area(left, top)
            .with_name(format!("{} {}", decoded.clean_make, decoded.clean_model));

        let [r, g1, g2, b] = decoded.blacklevels.map(f64::from);
        for (code, level) in FilterCode::BAYER.into_iter().zip([r, g1, g2, b]) {
            image.set_black_level(code, level);
        }
        image.set_black_level(FilterCode::G, (g1 + g2) / 2.0);
        image.set_black_level(FilterCode::All, (r + g1 + g2 + b) / 4.0);

        let white_level = decoded.whitelevels.iter().max().copied().filter(|&level| level > 0);
        image.set_white_level(white_level);

        debug!("Sensor black levels {:?}, white level {:?}", decoded.blacklevels, white_level);

        Ok(image)
    }
}
