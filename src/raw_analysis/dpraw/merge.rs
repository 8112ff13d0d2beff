use tracing::{debug, info, instrument};

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::dpraw::types::{DprawAction, DprawConfig, DprawMode};
use crate::raw_analysis::geometry::{BayerCells, FilterCode};
use crate::raw_analysis::raw::RawImage;

fn bayer_black_levels(image: &RawImage) -> Result<[f64; 4]> {
    let [r, g1, g2, b] = FilterCode::BAYER;
    Ok([
        image.black_level(r)?,
        image.black_level(g1)?,
        image.black_level(g2)?,
        image.black_level(b)?,
    ])
}

/// Adds half a DN, rounds, and saturates to the sample range.
#[inline]
fn to_sample(value: f64) -> u16 {
    (0.5 + value).round().clamp(0.0, f64::from(u16::MAX)) as u16
}

/// Per-pixel arithmetic for unclipped sites.
#[derive(Debug, Clone, Copy)]
enum Reconstruction {
    /// A = (A+B) - B, referenced to the secondary frame's black level
    Subtract,
    /// (A+B) shifted by `scale`, referenced to the secondary frame's black level
    Shift { scale: f64 },
}

impl Reconstruction {
    #[inline]
    fn apply(self, combined: u16, secondary: u16, black_combined: f64, black_secondary: f64) -> u16 {
        let combined = f64::from(combined) - black_combined;
        match self {
            Reconstruction::Subtract => {
                to_sample(combined - (f64::from(secondary) - black_secondary) + black_secondary)
            }
            Reconstruction::Shift { scale } => to_sample(combined * scale + black_secondary),
        }
    }
}

/// Merges a dual pixel pair into a new image of the same shape.
///
/// Both images need calibrated black levels for R, G1, G2 and B. The result
/// carries no calibration. Samples outside complete 2x2 cells (odd trailing
/// row or column) are left at 0.
#[instrument(skip(combined, secondary), fields(width = combined.width(), height = combined.height()))]
pub fn dpraw_process(combined: &RawImage, secondary: &RawImage, config: &DprawConfig) -> Result<RawImage> {
    if !combined.same_shape_as(secondary) {
        return Err(AnalysisError::ShapeMismatch(format!(
            "image and subimage size don't match: {}x{} vs {}x{}",
            combined.width(),
            combined.height(),
            secondary.width(),
            secondary.height()
        )));
    }

    let black_combined = bayer_black_levels(combined)?;
    let black_secondary = bayer_black_levels(secondary)?;

    let reconstruction = match config.action {
        DprawAction::GetA => Reconstruction::Subtract,
        DprawAction::Blend => {
            let ev_shift = config.ev_shift.ok_or_else(|| {
                AnalysisError::InvalidArgument("blending requires an EV shift".to_string())
            })?;
            Reconstruction::Shift {
                scale: 2f64.powf(ev_shift),
            }
        }
    };

    debug!(
        "Black levels combined {:?}, secondary {:?}, white level {}",
        black_combined, black_secondary, config.white_level
    );

    let white = config.white_level;
    let mut output = RawImage::layout(combined);
    let cells = BayerCells::new(combined)?.zip(BayerCells::new(secondary)?);
    let samples = output.samples_mut();
    let mut clipped = 0u64;

    for (c, s) in cells {
        match config.mode {
            DprawMode::Plain => {
                for k in 0..4 {
                    samples[c.offsets[k]] = if c.values[k] >= white {
                        clipped += 1;
                        s.values[k]
                    } else {
                        reconstruction.apply(c.values[k], s.values[k], black_combined[k], black_secondary[k])
                    };
                }
            }
            DprawMode::Bayer => {
                if c.values.iter().all(|&value| value < white) {
                    for k in 0..4 {
                        samples[c.offsets[k]] =
                            reconstruction.apply(c.values[k], s.values[k], black_combined[k], black_secondary[k]);
                    }
                } else {
                    clipped += 4;
                    for k in 0..4 {
                        samples[c.offsets[k]] = match config.action {
                            DprawAction::GetA => white,
                            DprawAction::Blend => s.values[k],
                        };
                    }
                }
            }
        }
    }

    info!(
        action = ?config.action,
        mode = ?config.mode,
        clipped_pixels = clipped,
        "Dual pixel merge complete"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_analysis::stats::set_black_levels;

    /// 2x2 image with the given R, G1, G2, B samples and black points.
    fn cell(values: [u16; 4], black: f64) -> RawImage {
        let mut image = RawImage::new(2, 2, values.to_vec()).unwrap();
        set_black_levels(&mut image, &[black]).unwrap();
        image
    }

    fn config(action: DprawAction, mode: DprawMode, ev_shift: Option<f64>) -> DprawConfig {
        DprawConfig::builder()
            .white_level(100)
            .action(action)
            .mode(mode)
            .ev_shift(ev_shift)
            .build()
    }

    #[test]
    fn test_get_a_plain_arithmetic() {
        let combined = cell([50, 50, 50, 50], 10.0);
        let secondary = cell([40, 40, 40, 40], 5.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Plain, None)).unwrap();
        // round(0.5 + (50 - 10) - (40 - 5) + 5) = round(10.5)
        assert_eq!(out.samples(), &[11, 11, 11, 11]);
    }

    #[test]
    fn test_get_a_plain_clipped_site_takes_secondary() {
        let combined = cell([100, 50, 120, 50], 10.0);
        let secondary = cell([77, 40, 88, 40], 5.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Plain, None)).unwrap();
        assert_eq!(out.samples(), &[77, 11, 88, 11]);
    }

    #[test]
    fn test_get_a_bayer_single_clip_invalidates_cell() {
        let combined = cell([50, 100, 50, 50], 10.0);
        let secondary = cell([40, 40, 40, 40], 5.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Bayer, None)).unwrap();
        assert_eq!(out.samples(), &[100, 100, 100, 100]);

        let combined = cell([50, 99, 50, 50], 10.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Bayer, None)).unwrap();
        assert_eq!(out.samples(), &[11, 60, 11, 11]);
    }

    #[test]
    fn test_blend_plain() {
        let combined = cell([50, 100, 30, 10], 10.0);
        let secondary = cell([40, 60, 40, 40], 5.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::Blend, DprawMode::Plain, Some(1.0))).unwrap();
        // round(0.5 + (v - 10) * 2 + 5); the clipped G1 comes from the secondary
        assert_eq!(out.samples(), &[86, 60, 46, 6]);
    }

    #[test]
    fn test_blend_bayer_clipped_cell_copies_secondary() {
        let combined = cell([50, 50, 50, 100], 10.0);
        let secondary = cell([41, 42, 43, 44], 5.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::Blend, DprawMode::Bayer, Some(-1.0))).unwrap();
        assert_eq!(out.samples(), &[41, 42, 43, 44]);

        let combined = cell([50, 50, 50, 90], 10.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::Blend, DprawMode::Bayer, Some(-1.0))).unwrap();
        // round(0.5 + (v - 10) / 2 + 5)
        assert_eq!(out.samples(), &[26, 26, 26, 46]);
    }

    #[test]
    fn test_negative_results_saturate_at_zero() {
        let combined = cell([10, 10, 10, 10], 10.0);
        let secondary = cell([90, 90, 90, 90], 0.0);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Plain, None)).unwrap();
        assert_eq!(out.samples(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_blend_requires_ev_shift() {
        let combined = cell([50; 4], 10.0);
        let secondary = cell([40; 4], 5.0);
        let result = dpraw_process(&combined, &secondary, &config(DprawAction::Blend, DprawMode::Plain, None));
        assert!(matches!(result, Err(AnalysisError::InvalidArgument(_))));
    }

    #[test]
    fn test_shape_and_calibration_preconditions() {
        let combined = cell([50; 4], 10.0);
        let other = RawImage::new(4, 2, vec![0; 8]).unwrap();
        let result = dpraw_process(&combined, &other, &config(DprawAction::GetA, DprawMode::Plain, None));
        assert!(matches!(result, Err(AnalysisError::ShapeMismatch(_))));

        let uncalibrated = RawImage::new(2, 2, vec![0; 4]).unwrap();
        let result = dpraw_process(&combined, &uncalibrated, &config(DprawAction::GetA, DprawMode::Plain, None));
        assert!(matches!(result, Err(AnalysisError::MissingBlackLevel(FilterCode::R))));
    }

    #[test]
    fn test_output_is_uncalibrated_and_same_shape() {
        let combined = cell([50; 4], 10.0).with_masked_area(1, 1);
        let secondary = cell([40; 4], 5.0).with_masked_area(1, 1);
        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Plain, None)).unwrap();
        assert!(out.same_shape_as(&combined));
        assert!(out.black_level(FilterCode::R).is_err());
    }

    #[test]
    fn test_larger_mosaic_keeps_cells_aligned() {
        // 4x4: cell (1, 0) of the combined frame has a clipped blue
        let mut combined = RawImage::new(
            4,
            4,
            vec![
                50, 50, 50, 50, //
                50, 50, 50, 100, //
                50, 50, 50, 50, //
                50, 50, 50, 50,
            ],
        )
        .unwrap();
        set_black_levels(&mut combined, &[10.0]).unwrap();
        let mut secondary = RawImage::new(4, 4, vec![40; 16]).unwrap();
        set_black_levels(&mut secondary, &[5.0]).unwrap();

        let out = dpraw_process(&combined, &secondary, &config(DprawAction::GetA, DprawMode::Bayer, None)).unwrap();
        assert_eq!(
            out.samples(),
            &[
                11, 11, 100, 100, //
                11, 11, 100, 100, //
                11, 11, 11, 11, //
                11, 11, 11, 11,
            ]
        );
    }
}
