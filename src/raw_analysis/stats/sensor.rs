//! Sensor noise characterisation from pairs of frames
//!
//! Dark pairs (lens cap on) give the read noise and the black level. Flat pairs
//! (uniform illumination close to saturation) give photon noise, and from it
//! dynamic range, SNR and the collected signal in electrons.

use crate::raw_analysis::common::error::Result;
use crate::raw_analysis::geometry::Selection;
use crate::raw_analysis::stats::{Highlights, Stats1, build_histogram, highlights, subtract};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadNoise {
    /// Temporal read noise of one frame (DN)
    pub noise: f64,
    pub black_level: f64,
}

/// Exposure figures of one frame of a flat pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatFrame {
    pub stats: Stats1,
    pub mode: u16,
    pub highlights: Highlights,
    /// Derived figures, only when no pixel is clipped
    pub exposure: Option<FlatExposure>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatExposure {
    /// Mean signal above black (DN)
    pub saturation: f64,
    pub dynamic_range_stops: f64,
    pub snr: f64,
    pub snr_db: f64,
    /// Collected signal (electrons)
    pub signal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatPair {
    pub pixels: u64,
    /// Total temporal noise of one frame (DN)
    pub noise: f64,
    pub photon_noise: f64,
    pub frames: [FlatFrame; 2],
}

/// Sensor-wide figures derived from the flat pairs of every filter position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorGain {
    /// Highest white level seen in any frame (DN)
    pub white_level: u16,
    /// Electrons collected at the white level
    pub full_well: f64,
    /// Electrons per DN
    pub gain: f64,
}

pub fn read_noise(dark_a: &Selection<'_>, dark_b: &Selection<'_>) -> Result<ReadNoise> {
    let stats = subtract(dark_a, dark_b)?;
    Ok(ReadNoise {
        noise: stats.stdev,
        black_level: (stats.a.mean + stats.b.mean) / 2.0,
    })
}

pub fn flat_pair(white_a: &Selection<'_>, white_b: &Selection<'_>, dark: &ReadNoise) -> Result<FlatPair> {
    let stats = subtract(white_a, white_b)?;
    let noise = stats.stdev;
    let photon_noise = (noise * noise - dark.noise * dark.noise).max(0.0).sqrt();

    let frame = |selection: &Selection<'_>, frame_stats: Stats1| -> Result<FlatFrame> {
        let histogram = build_histogram(selection)?;
        let highlights = highlights(&histogram)?;
        let exposure = (highlights.clipped_count == 0).then(|| {
            let saturation = frame_stats.mean - dark.black_level;
            let snr = saturation / noise;
            FlatExposure {
                saturation,
                dynamic_range_stops: (saturation / dark.noise).log2(),
                snr,
                snr_db: 20.0 * snr.log10(),
                signal: (saturation / photon_noise).powi(2),
            }
        });
        Ok(FlatFrame {
            stats: frame_stats,
            mode: histogram.mode,
            highlights,
            exposure,
        })
    };

    Ok(FlatPair {
        pixels: white_a.pixel_count(),
        noise,
        photon_noise,
        frames: [frame(white_a, stats.a)?, frame(white_b, stats.b)?],
    })
}

/// Extrapolates the best exposed unclipped frame up to the white level.
///
/// Returns `None` when every frame is clipped.
pub fn sensor_gain(pairs: &[FlatPair], dark: &ReadNoise) -> Option<SensorGain> {
    let frames = || pairs.iter().flat_map(|pair| pair.frames.iter());
    let white_level = frames().map(|frame| frame.highlights.white_level).max()?;
    let best = frames()
        .filter_map(|frame| frame.exposure)
        .filter(|exposure| exposure.saturation > 0.0 && exposure.signal.is_finite())
        .max_by(|a, b| a.signal.total_cmp(&b.signal))?;

    let full_well = (f64::from(white_level) - dark.black_level) / best.saturation * best.signal;
    Some(SensorGain {
        white_level,
        full_well,
        gain: best.signal / best.saturation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_analysis::geometry::FilterCode;
    use crate::raw_analysis::raw::RawImage;
    use approx::assert_relative_eq;

    fn frame(width: usize, height: usize, f: impl Fn(usize) -> u16) -> RawImage {
        RawImage::new(width, height, (0..width * height).map(f).collect()).unwrap()
    }

    #[test]
    fn test_read_noise_from_dark_pair() {
        let a = frame(4, 4, |i| if i % 2 == 0 { 130 } else { 126 });
        let b = frame(4, 4, |_| 128);
        let noise = read_noise(
            &a.channel(FilterCode::All).select_all().unwrap(),
            &b.channel(FilterCode::All).select_all().unwrap(),
        )
        .unwrap();
        // differences alternate +2/-2
        assert_relative_eq!(noise.noise, 2.0 / 2f64.sqrt());
        assert_relative_eq!(noise.black_level, 128.0);
    }

    #[test]
    fn test_flat_pair_exposure() {
        let dark = ReadNoise { noise: 2.0, black_level: 100.0 };
        // a lone brighter pixel forms the tail above the main population
        let a = frame(100, 100, |i| match i {
            0 => 1200,
            i if i % 2 == 0 => 1110,
            _ => 1090,
        });
        let b = frame(100, 100, |i| match i {
            0 => 1200,
            i if i % 2 == 0 => 1090,
            _ => 1110,
        });
        let pair = flat_pair(
            &a.channel(FilterCode::All).select_all().unwrap(),
            &b.channel(FilterCode::All).select_all().unwrap(),
            &dark,
        )
        .unwrap();

        assert_eq!(pair.pixels, 10_000);
        assert_relative_eq!(pair.noise, 20.0 / 2f64.sqrt(), epsilon = 1e-2);
        assert_relative_eq!(pair.photon_noise, 14.0, epsilon = 1e-2);

        let first = &pair.frames[0];
        assert_eq!((first.stats.min, first.stats.max), (1090, 1200));
        assert_eq!(first.mode, 1090);
        assert_eq!(first.highlights.clipped_count, 0);
        let exposure = first.exposure.expect("unclipped frame");
        assert_relative_eq!(exposure.saturation, 1000.0, epsilon = 1e-2);
        assert_relative_eq!(exposure.dynamic_range_stops, 500f64.log2(), epsilon = 1e-3);
        assert!(exposure.signal > 0.0);
    }

    fn exposed_frame(white_level: u16, exposure: Option<FlatExposure>) -> FlatFrame {
        FlatFrame {
            stats: Stats1 { min: 0, max: white_level, mean: 0.0, stdev: 0.0 },
            mode: 0,
            highlights: Highlights { white_level, clipped_count: if exposure.is_some() { 0 } else { 1 } },
            exposure,
        }
    }

    #[test]
    fn test_sensor_gain_uses_best_signal() {
        let exposure = |saturation: f64, signal: f64| FlatExposure {
            saturation,
            dynamic_range_stops: 0.0,
            snr: 0.0,
            snr_db: 0.0,
            signal,
        };
        let pair = |a: FlatFrame, b: FlatFrame| FlatPair {
            pixels: 1,
            noise: 1.0,
            photon_noise: 1.0,
            frames: [a, b],
        };
        let pairs = [
            pair(exposed_frame(3900, Some(exposure(1000.0, 5000.0))), exposed_frame(4095, None)),
            pair(exposed_frame(3800, Some(exposure(2000.0, 8000.0))), exposed_frame(3700, Some(exposure(500.0, 100.0)))),
        ];
        let dark = ReadNoise { noise: 2.0, black_level: 95.0 };

        let gain = sensor_gain(&pairs, &dark).unwrap();
        assert_eq!(gain.white_level, 4095);
        // (4095 - 95) / 2000 * 8000
        assert_relative_eq!(gain.full_well, 16000.0);
        assert_relative_eq!(gain.gain, 4.0);
    }

    #[test]
    fn test_sensor_gain_needs_an_unclipped_frame() {
        let dark = ReadNoise { noise: 2.0, black_level: 95.0 };
        let pairs = [FlatPair {
            pixels: 1,
            noise: 1.0,
            photon_noise: 1.0,
            frames: [exposed_frame(4095, None), exposed_frame(4095, None)],
        }];
        assert!(sensor_gain(&pairs, &dark).is_none());
        assert!(sensor_gain(&[], &dark).is_none());
    }

    #[test]
    fn test_flat_pair_clipped_frame_has_no_exposure() {
        let dark = ReadNoise { noise: 2.0, black_level: 100.0 };
        let a = frame(10, 10, |_| 4095);
        let b = frame(10, 10, |_| 4095);
        let pair = flat_pair(
            &a.channel(FilterCode::All).select_all().unwrap(),
            &b.channel(FilterCode::All).select_all().unwrap(),
            &dark,
        )
        .unwrap();
        assert_eq!(pair.frames[0].highlights.clipped_count, 100);
        assert!(pair.frames[0].exposure.is_none());
    }
}
