//! Statistical analysis module
//!
//! Single pass moments, frequency histograms and the calibration estimates
//! derived from them (clipping, automatic black/white levels, read noise).

mod moments;
mod histogram;
mod levels;
mod calibration;
mod sensor;

pub use moments::{Stats1, Stats2, analyze, subtract};
pub use histogram::{Histogram, build_histogram, build_histogram_bucketed};
pub use levels::{AutoLevels, Highlights, auto_levels, highlights};
pub use calibration::{calibrate_black_levels, set_black_levels, set_white_level};
pub use sensor::{FlatExposure, FlatFrame, FlatPair, ReadNoise, SensorGain, flat_pair, read_noise, sensor_gain};
