use std::collections::BTreeMap;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::Selection;

/// Frequency of every observed sample value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Observed value (bucket floor) to count, ascending
    pub frequencies: BTreeMap<u16, u64>,
    pub total: u64,
    /// Most frequent value; on ties the highest value wins
    pub mode: u16,
    /// Width of the value buckets, 1 when every value has its own bin
    pub bucket_width: u16,
}

impl Histogram {
    /// Builds a histogram from explicit counts. Zero counts are dropped.
    pub fn from_frequencies(frequencies: BTreeMap<u16, u64>, bucket_width: u16) -> Self {
        let frequencies: BTreeMap<u16, u64> = frequencies.into_iter().filter(|&(_, count)| count > 0).collect();
        let mut total = 0;
        let mut mode = 0;
        let mut mode_frequency = 0;
        for (&value, &count) in &frequencies {
            total += count;
            if count >= mode_frequency {
                mode_frequency = count;
                mode = value;
            }
        }
        Self {
            frequencies,
            total,
            mode,
            bucket_width: bucket_width.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn frequency(&self, value: u16) -> u64 {
        self.frequencies.get(&value).copied().unwrap_or(0)
    }

    pub fn min_value(&self) -> Option<u16> {
        self.frequencies.keys().next().copied()
    }

    pub fn max_value(&self) -> Option<u16> {
        self.frequencies.keys().next_back().copied()
    }
}

pub fn build_histogram(selection: &Selection<'_>) -> Result<Histogram> {
    build_histogram_bucketed(selection, 1)
}

/// Histogram whose values are floored to multiples of `bucket_width`.
pub fn build_histogram_bucketed(selection: &Selection<'_>, bucket_width: u16) -> Result<Histogram> {
    if bucket_width == 0 {
        return Err(AnalysisError::InvalidArgument("histogram bucket width must be positive".to_string()));
    }

    let mut frequencies = BTreeMap::new();
    if bucket_width == 1 {
        for value in selection.pixels() {
            *frequencies.entry(value).or_insert(0u64) += 1;
        }
    } else {
        for value in selection.pixels() {
            *frequencies.entry(value - value % bucket_width).or_insert(0u64) += 1;
        }
    }

    if frequencies.is_empty() {
        return Err(AnalysisError::EmptyInput("histogram over an empty selection".to_string()));
    }

    Ok(Histogram::from_frequencies(frequencies, bucket_width))
}
