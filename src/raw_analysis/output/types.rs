//! Output configuration types

use std::path::Path;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::output::{DatWriter, ImageWriter, NetpbmWriter, StandardTiffWriter};

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Container chosen from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Headerless big-endian 16-bit dump
    Dat,
    Pgm,
    Ppm,
    Tiff,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "dat" => Ok(OutputFormat::Dat),
            "pgm" => Ok(OutputFormat::Pgm),
            "ppm" => Ok(OutputFormat::Ppm),
            "tif" | "tiff" => Ok(OutputFormat::Tiff),
            _ => Err(AnalysisError::UnsupportedFormat(format!(
                "cannot tell the output format of {}",
                path.display()
            ))),
        }
    }

    /// Whether single channel sensor data can be stored in this container.
    pub fn holds_raw(self) -> bool {
        !matches!(self, OutputFormat::Ppm)
    }

    /// Whether RGB data can be stored in this container.
    pub fn holds_rgb(self) -> bool {
        matches!(self, OutputFormat::Ppm | OutputFormat::Tiff)
    }

    pub fn writer(self) -> Box<dyn ImageWriter> {
        match self {
            OutputFormat::Dat => Box::new(DatWriter),
            OutputFormat::Pgm | OutputFormat::Ppm => Box::new(NetpbmWriter),
            OutputFormat::Tiff => Box::new(StandardTiffWriter),
        }
    }
}

/// Configuration for image output
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Compression method, TIFF only
    pub compression: TiffCompression,
    /// Predictor value for compression (typically 2 for horizontal differencing)
    pub predictor: Option<u16>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            predictor: None,
        }
    }
}

impl OutputConfig {
    pub fn builder() -> OutputConfigBuilder {
        OutputConfigBuilder::default()
    }
}

/// Builder for OutputConfig
#[derive(Default)]
pub struct OutputConfigBuilder {
    compression: Option<TiffCompression>,
    predictor: Option<Option<u16>>,
}

impl OutputConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn predictor(mut self, predictor: Option<u16>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn build(self) -> OutputConfig {
        let default = OutputConfig::default();
        OutputConfig {
            compression: self.compression.unwrap_or(default.compression),
            predictor: self.predictor.unwrap_or(default.predictor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/b.dat")).unwrap(), OutputFormat::Dat);
        assert_eq!(OutputFormat::from_path(Path::new("b.PGM")).unwrap(), OutputFormat::Pgm);
        assert_eq!(OutputFormat::from_path(Path::new("b.ppm")).unwrap(), OutputFormat::Ppm);
        assert_eq!(OutputFormat::from_path(Path::new("b.tif")).unwrap(), OutputFormat::Tiff);
        assert_eq!(OutputFormat::from_path(Path::new("b.tiff")).unwrap(), OutputFormat::Tiff);
        assert!(matches!(
            OutputFormat::from_path(Path::new("b.png")),
            Err(AnalysisError::UnsupportedFormat(_))
        ));
        assert!(OutputFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_format_capabilities() {
        assert!(OutputFormat::Dat.holds_raw() && !OutputFormat::Dat.holds_rgb());
        assert!(OutputFormat::Pgm.holds_raw() && !OutputFormat::Pgm.holds_rgb());
        assert!(!OutputFormat::Ppm.holds_raw() && OutputFormat::Ppm.holds_rgb());
        assert!(OutputFormat::Tiff.holds_raw() && OutputFormat::Tiff.holds_rgb());
    }

    #[test]
    fn test_config_builder() {
        let config = OutputConfig::builder()
            .compression(TiffCompression::DeflateBest)
            .predictor(Some(2))
            .build();
        assert_eq!(config.compression, TiffCompression::DeflateBest);
        assert_eq!(config.predictor, Some(2));

        let config = OutputConfig::builder().build();
        assert_eq!(config.compression, TiffCompression::None);
        assert_eq!(config.predictor, None);
    }
}
