use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::FilterCode;
use crate::raw_analysis::raw::RawImage;
use crate::raw_analysis::stats::analyze;

/// Applies explicit black points: one value for every filter, or four in
/// R, G1, G2, B order (G and the full image get the matching averages).
pub fn set_black_levels(image: &mut RawImage, black_points: &[f64]) -> Result<()> {
    match *black_points {
        [level] => {
            for code in FilterCode::ALL_CODES {
                image.set_black_level(code, level);
            }
        }
        [r, g1, g2, b] => {
            image.set_black_level(FilterCode::R, r);
            image.set_black_level(FilterCode::G1, g1);
            image.set_black_level(FilterCode::G2, g2);
            image.set_black_level(FilterCode::B, b);
            image.set_black_level(FilterCode::G, (g1 + g2) / 2.0);
            image.set_black_level(FilterCode::All, (r + g1 + g2 + b) / 4.0);
        }
        _ => {
            return Err(AnalysisError::InvalidArgument(format!(
                "expected 1 or 4 black points, got {}",
                black_points.len()
            )));
        }
    }
    Ok(())
}

/// Measures every filter's black level as the mean of its masked pixels.
pub fn calibrate_black_levels(image: &mut RawImage) -> Result<()> {
    let mut levels = Vec::with_capacity(FilterCode::ALL_CODES.len());
    for code in FilterCode::ALL_CODES {
        let mask = image.channel(code).left_mask(true, false)?;
        let stats = analyze(&mask)?;
        debug!("Masked pixels {}: mean {:.3}, stdev {:.3}", code, stats.mean, stats.stdev);
        levels.push((code, stats.mean));
    }
    for (code, level) in levels {
        image.set_black_level(code, level);
    }
    Ok(())
}

pub fn set_white_level(image: &mut RawImage, white_point: Option<u16>) {
    image.set_white_level(white_point);
}
