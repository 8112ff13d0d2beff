//! Tabular reports of the Bayer channels, written as `;` separated CSV.

use std::collections::BTreeSet;
use std::io::Write;
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::{Channel, FilterCode, Selection};
use crate::raw_analysis::raw::RawImage;
use crate::raw_analysis::stats::{
    AutoLevels, Highlights, Histogram, Stats1, analyze, auto_levels, build_histogram, highlights,
};

/// Window in the logical coordinates of each channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crop {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Crop {
    fn select<'a>(crop: Option<Crop>, channel: Channel<'a>) -> Result<Selection<'a>> {
        match crop {
            Some(crop) => channel.select(crop.x, crop.y, crop.width, crop.height),
            None => channel.select_all(),
        }
    }
}

impl FromStr for Crop {
    type Err = AnalysisError;

    /// Parses `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| AnalysisError::InvalidArgument(format!("crop '{}': {}", s, e)))?;
        match values[..] {
            [x, y, width, height] => Ok(Crop { x, y, width, height }),
            _ => Err(AnalysisError::InvalidArgument(format!(
                "crop '{}' must be x,y,width,height",
                s
            ))),
        }
    }
}

/// Histograms of the four Bayer channels, side by side.
#[derive(Debug, Clone)]
pub struct HistogramTable {
    /// In R, G1, G2, B order
    pub histograms: [Histogram; 4],
}

impl HistogramTable {
    /// One row per value observed in any channel, ascending.
    pub fn rows(&self) -> Vec<(u16, [u64; 4])> {
        let values: BTreeSet<u16> = self
            .histograms
            .iter()
            .flat_map(|histogram| histogram.frequencies.keys().copied())
            .collect();
        values
            .into_iter()
            .map(|value| (value, self.histograms.each_ref().map(|histogram| histogram.frequency(value))))
            .collect()
    }
}

#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn histogram_table(image: &RawImage, crop: Option<Crop>) -> Result<HistogramTable> {
    let [r, g1, g2, b] = FilterCode::BAYER;
    let build = |code: FilterCode| build_histogram(&Crop::select(crop, image.channel(code))?);
    Ok(HistogramTable {
        histograms: [build(r)?, build(g1)?, build(g2)?, build(b)?],
    })
}

pub fn write_histogram_csv(table: &HistogramTable, output: &mut dyn Write) -> Result<()> {
    let rows = table.rows();
    debug!("Writing {} histogram rows", rows.len());
    writeln!(output, "DN;R;G1;G2;B")?;
    for (value, [r, g1, g2, b]) in rows {
        writeln!(output, "{};{};{};{};{}", value, r, g1, g2, b)?;
    }
    Ok(())
}

/// Statistics of one filter position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelReport {
    pub code: FilterCode,
    pub pixels: u64,
    pub stats: Stats1,
    pub mode: u16,
    pub highlights: Highlights,
    pub auto_levels: AutoLevels,
}

impl ChannelReport {
    fn from_selection(code: FilterCode, selection: &Selection<'_>) -> Result<Self> {
        let stats = analyze(selection)?;
        let histogram = build_histogram(selection)?;
        Ok(Self {
            code,
            pixels: selection.pixel_count(),
            stats,
            mode: histogram.mode,
            highlights: highlights(&histogram)?,
            auto_levels: auto_levels(&histogram)?,
        })
    }

    /// Share of the pixels found clipped, in percent.
    pub fn clipped_percent(&self) -> f64 {
        self.highlights.clipped_count as f64 / self.pixels as f64 * 100.0
    }
}

#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn channel_reports(image: &RawImage, crop: Option<Crop>) -> Result<Vec<ChannelReport>> {
    FilterCode::BAYER
        .into_iter()
        .map(|code| ChannelReport::from_selection(code, &Crop::select(crop, image.channel(code))?))
        .collect()
}

/// Reports over the optical black band, trimmed away from the active area.
#[instrument(skip(image), fields(masked_left = image.masked().left, masked_top = image.masked().top))]
pub fn masked_reports(image: &RawImage) -> Result<Vec<ChannelReport>> {
    FilterCode::BAYER
        .into_iter()
        .map(|code| ChannelReport::from_selection(code, &image.channel(code).left_mask(true, false)?))
        .collect()
}

pub fn write_stats_csv(reports: &[ChannelReport], output: &mut dyn Write) -> Result<()> {
    writeln!(
        output,
        "filter;pixels;min;max;mean;stdev;mode;white;clipped;auto_black;auto_white"
    )?;
    for report in reports {
        writeln!(
            output,
            "{};{};{};{};{:.3};{:.3};{};{};{};{};{}",
            report.code,
            report.pixels,
            report.stats.min,
            report.stats.max,
            report.stats.mean,
            report.stats.stdev,
            report.mode,
            report.highlights.white_level,
            report.highlights.clipped_count,
            report.auto_levels.black_level,
            report.auto_levels.white_level,
        )?;
    }
    Ok(())
}
