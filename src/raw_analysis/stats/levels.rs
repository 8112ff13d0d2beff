//! Clipping detection and automatic level estimation from histograms
//!
//! The thresholds below are empirical calibration constants, subject to
//! revision once more sensors have been characterised.

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::stats::Histogram;

/// Fraction of the population (1/N) a bin needs to count as significant.
const SIGNIFICANT_BIN_DIVISOR: f64 = 10_000.0;
/// Tail above a significant bin tolerated before it stops counting as overexposed.
const OVEREXPOSED_TAIL_DIVISOR: f64 = 10.0;

/// Lowest distinct values ignored when estimating the black level (banding near zero).
const BLACK_SKIPPED_VALUES: usize = 8;
/// Distinct values scanned from the top when looking for a clipping plateau.
const WHITE_SCAN_WINDOW: usize = 128;
/// Minimum count of a plateau bin, per unit of bucket width.
const CLIP_MIN_COUNT: u64 = 16;
/// Minimum ratio between a plateau bin and the largest bin above it.
const CLIP_SPIKE_RATIO: u64 = 16;
/// A neighbour larger than 1/N of the plateau is folded into it.
const CLIP_SPILL_DIVISOR: u64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlights {
    /// Highest non clipped value
    pub white_level: u16,
    /// Pixels found clipped
    pub clipped_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoLevels {
    pub black_level: u16,
    /// Level at which clipping starts
    pub white_level: u16,
    pub clipped_count: u64,
}

fn empty_histogram(operation: &str) -> AnalysisError {
    AnalysisError::EmptyInput(format!("{}: empty histogram", operation))
}

/// Clipping estimate, most reliable on full channel histograms.
///
/// Scans from the highest value down to the first bin holding more than
/// 1/10000 of the pixels. If almost nothing lies above it, that bin is the
/// overexposure plateau: its pixels (and the tail above) are clipped and the
/// next lower observed value is the white level. Otherwise nothing is clipped
/// and the white level sits at the bottom of the contiguous run of observed
/// bins (one `bucket_width` apart) that bin belongs to.
pub fn highlights(histogram: &Histogram) -> Result<Highlights> {
    if histogram.is_empty() {
        return Err(empty_histogram("highlights"));
    }

    let threshold = histogram.total as f64 / SIGNIFICANT_BIN_DIVISOR;
    let mut clipped_count = 0u64;
    let mut bins = histogram.frequencies.iter().rev().peekable();

    while let Some((&value, &count)) = bins.next() {
        clipped_count += count;
        if count as f64 <= threshold {
            continue;
        }

        if ((clipped_count - count) as f64) < threshold / OVEREXPOSED_TAIL_DIVISOR {
            let white_level = bins.peek().map_or(value, |&(&lower, _)| lower);
            return Ok(Highlights {
                white_level,
                clipped_count,
            });
        }

        let mut white_level = value;
        while let Some(lower) = white_level.checked_sub(histogram.bucket_width) {
            if histogram.frequency(lower) == 0 {
                break;
            }
            white_level = lower;
        }
        return Ok(Highlights {
            white_level,
            clipped_count: 0,
        });
    }

    // no bin is significant: the top value is as good as it gets
    Ok(Highlights {
        white_level: histogram.max_value().unwrap_or(0),
        clipped_count: 0,
    })
}

/// Largest power of two a `u16` holds.
const MAX_POWER_OF_TWO: u16 = 1 << 15;

/// Rounds to the nearest power of two, in the log domain.
///
/// Values from 46341 up would round to 2^16, so they saturate to 32768.
fn nearest_power_of_two(value: u16) -> u16 {
    if value == 0 {
        return 0;
    }
    let exponent = f64::from(value).log2().round();
    if exponent >= f64::from(MAX_POWER_OF_TWO.trailing_zeros()) {
        return MAX_POWER_OF_TWO;
    }
    1 << exponent as u32
}

/// Black and white level estimate.
///
/// Black: the first value above the 8 lowest distinct values, rounded to the
/// nearest power of two. White: within the top 128 distinct values, the
/// lowest bin that is both populated (16 per bucket unit, 16 for the very top
/// bin) and at least 16 times larger than any bin above it marks the clipping
/// plateau. A spill into the bin right below is folded in when that bin holds
/// more than a quarter of the clipped pixels.
pub fn auto_levels(histogram: &Histogram) -> Result<AutoLevels> {
    let lowest = histogram
        .frequencies
        .keys()
        .nth(BLACK_SKIPPED_VALUES)
        .or_else(|| histogram.frequencies.keys().next_back())
        .copied()
        .ok_or_else(|| empty_histogram("auto levels"))?;
    let black_level = nearest_power_of_two(lowest);

    let descending: Vec<(u16, u64)> = histogram
        .frequencies
        .iter()
        .rev()
        .map(|(&value, &count)| (value, count))
        .collect();
    let top_value = descending[0].0;

    let mut spike = 0u64;
    let mut accumulated = 0u64;
    let mut plateau: Option<(usize, u16, u64)> = None;

    for (index, &(value, count)) in descending.iter().take(WHITE_SCAN_WINDOW).enumerate() {
        accumulated += count;
        let compression = if index == 0 { 1 } else { u64::from(histogram.bucket_width) };
        let suspicious = count >= CLIP_MIN_COUNT * compression && count >= CLIP_SPIKE_RATIO * spike;
        if suspicious {
            plateau = Some((index, value, accumulated));
        }
        spike = spike.max(count);
    }

    let Some((index, mut white_level, mut clipped_count)) = plateau else {
        return Ok(AutoLevels {
            black_level,
            white_level: top_value,
            clipped_count: 0,
        });
    };

    if let Some(&(value, count)) = descending.get(index + 1) {
        if count * CLIP_SPILL_DIVISOR > clipped_count {
            clipped_count += count;
            white_level = value;
        }
    }

    Ok(AutoLevels {
        black_level,
        white_level,
        clipped_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn histogram(bins: &[(u16, u64)]) -> Histogram {
        bucketed(bins, 1)
    }

    fn bucketed(bins: &[(u16, u64)], bucket_width: u16) -> Histogram {
        Histogram::from_frequencies(bins.iter().copied().collect::<BTreeMap<_, _>>(), bucket_width)
    }

    /// Sparse floor of single-count bins, 4 DN apart.
    fn bucketed_floor() -> Vec<(u16, u64)> {
        (0..1000).step_by(4).map(|v| (v, 1)).collect()
    }

    #[test]
    fn test_highlights_single_value() {
        let h = histogram(&[(4095, 1000)]);
        let info = highlights(&h).unwrap();
        assert_eq!(info, Highlights { white_level: 4095, clipped_count: 1000 });
    }

    #[test]
    fn test_highlights_overexposed_plateau() {
        let mut bins: Vec<(u16, u64)> = (1000..1100).map(|v| (v, 1000)).collect();
        bins.push((4095, 50_000));
        let h = histogram(&bins);
        let info = highlights(&h).unwrap();
        assert_eq!(info, Highlights { white_level: 1099, clipped_count: 50_000 });
    }

    #[test]
    fn test_highlights_with_significant_tail_is_not_clipped() {
        // 100 pixels above the first significant bin: more than 1/10 of the threshold
        let mut bins: Vec<(u16, u64)> = (200..300).map(|v| (v, 10_000)).collect();
        bins.extend((500..600).map(|v| (v, 1)));
        let h = histogram(&bins);
        let info = highlights(&h).unwrap();
        assert_eq!(info.clipped_count, 0);
        assert_eq!(info.white_level, 200);
    }

    #[test]
    fn test_highlights_walks_bucketed_run() {
        let mut bins: Vec<(u16, u64)> = (0..400).step_by(4).map(|v| (v, 1000)).collect();
        bins.extend((400..500).step_by(4).map(|v| (v, 1)));
        let info = highlights(&bucketed(&bins, 4)).unwrap();
        assert_eq!(info, Highlights { white_level: 0, clipped_count: 0 });

        // a missing bucket ends the run
        bins.retain(|&(v, _)| v != 200);
        let info = highlights(&bucketed(&bins, 4)).unwrap();
        assert_eq!(info.white_level, 204);
    }

    #[test]
    fn test_highlights_empty_histogram_fails() {
        let h = Histogram::from_frequencies(BTreeMap::new(), 1);
        assert!(matches!(highlights(&h), Err(AnalysisError::EmptyInput(_))));
        assert!(matches!(auto_levels(&h), Err(AnalysisError::EmptyInput(_))));
    }

    #[test]
    fn test_nearest_power_of_two() {
        assert_eq!(nearest_power_of_two(0), 0);
        assert_eq!(nearest_power_of_two(1), 1);
        assert_eq!(nearest_power_of_two(500), 512);
        assert_eq!(nearest_power_of_two(2100), 2048);
        assert_eq!(nearest_power_of_two(46340), 32768);
    }

    #[test]
    fn test_nearest_power_of_two_saturates() {
        assert_eq!(nearest_power_of_two(46341), 32768);
        assert_eq!(nearest_power_of_two(60000), 32768);
        assert_eq!(nearest_power_of_two(u16::MAX), 32768);
        assert!(nearest_power_of_two(u16::MAX).is_power_of_two());
    }

    #[test]
    fn test_auto_levels_black_skips_lowest_values() {
        let bins: Vec<(u16, u64)> = (120..140).map(|v| (v, 100)).collect();
        let levels = auto_levels(&histogram(&bins)).unwrap();
        // 120..=127 skipped, 128 is already a power of two
        assert_eq!(levels.black_level, 128);
    }

    #[test]
    fn test_auto_levels_without_clipping() {
        // smooth tail thinning out to a single pixel at the top
        let bins: Vec<(u16, u64)> = (500..1500).map(|v| (v, u64::from(1500 - v) / 10 + 1)).collect();
        let levels = auto_levels(&histogram(&bins)).unwrap();
        assert_eq!(levels.white_level, 1499);
        assert_eq!(levels.clipped_count, 0);
    }

    #[test]
    fn test_auto_levels_plateau_ignores_isolated_outlier() {
        let mut bins: Vec<(u16, u64)> = (500..3000).map(|v| (v, 5)).collect();
        bins.push((3500, 4000));
        bins.push((4095, 1));
        let levels = auto_levels(&histogram(&bins)).unwrap();
        assert_eq!(levels.white_level, 3500);
        assert_eq!(levels.clipped_count, 4001);
    }

    #[test]
    fn test_auto_levels_folds_spill_into_neighbour() {
        let mut bins: Vec<(u16, u64)> = (500..3000).map(|v| (v, 5)).collect();
        bins.push((3400, 1500));
        bins.push((3500, 4000));
        let levels = auto_levels(&histogram(&bins)).unwrap();
        assert_eq!(levels.white_level, 3400);
        assert_eq!(levels.clipped_count, 5500);
    }

    #[test]
    fn test_auto_levels_bucketed_plateau_needs_scaled_count() {
        // 40 beats the spike ratio over the top bin but not 16 per DN of a 4 DN bucket
        let mut bins = bucketed_floor();
        bins.push((3000, 40));
        bins.push((4000, 2));
        let levels = auto_levels(&bucketed(&bins, 4)).unwrap();
        assert_eq!((levels.white_level, levels.clipped_count), (4000, 0));

        let mut bins = bucketed_floor();
        bins.push((3000, 64));
        bins.push((4000, 2));
        let levels = auto_levels(&bucketed(&bins, 4)).unwrap();
        assert_eq!((levels.white_level, levels.clipped_count), (3000, 66));
    }

    #[test]
    fn test_auto_levels_bucketed_top_bin_is_not_scaled() {
        let mut bins = bucketed_floor();
        bins.push((4000, 16));
        let levels = auto_levels(&bucketed(&bins, 4)).unwrap();
        assert_eq!((levels.white_level, levels.clipped_count), (4000, 16));

        // the same count one bin lower is too small
        let mut bins = bucketed_floor();
        bins.push((3000, 16));
        bins.push((4000, 1));
        let levels = auto_levels(&bucketed(&bins, 4)).unwrap();
        assert_eq!((levels.white_level, levels.clipped_count), (4000, 0));
    }

    #[test]
    fn test_auto_levels_with_few_values() {
        let levels = auto_levels(&histogram(&[(60, 3), (70, 2)])).unwrap();
        assert_eq!(levels.black_level, 64);
        assert_eq!(levels.white_level, 70);
        assert_eq!(levels.clipped_count, 0);
    }
}
