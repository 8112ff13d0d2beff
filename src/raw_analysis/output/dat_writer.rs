use std::io::Write;

use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::output::types::OutputConfig;
use crate::raw_analysis::output::writer::ImageWriter;
use crate::raw_analysis::preview::RgbImageData;
use crate::raw_analysis::raw::RawImage;

/// Headerless dump, 16-bit big-endian samples.
pub struct DatWriter;

impl ImageWriter for DatWriter {
    fn write_raw(&self, image: &RawImage, output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
        debug!("Writing raw dump: {}x{}", image.width(), image.height());
        let bytes: Vec<u8> = image.samples().iter().flat_map(|value| value.to_be_bytes()).collect();
        output.write_all(&bytes)?;
        Ok(())
    }

    fn write_rgb(&self, _image: &RgbImageData, _output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
        Err(AnalysisError::UnsupportedFormat(
            "raw dumps hold single channel data only".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_analysis::raw::{DatReader, RawImageReader};

    #[test]
    fn test_dump_is_big_endian() {
        let image = RawImage::new(2, 1, vec![0x0102, 0xA0B0]).unwrap();
        let mut bytes: Vec<u8> = Vec::new();
        DatWriter.write_raw(&image, &mut bytes, &OutputConfig::default()).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0xA0, 0xB0]);

        let reread = DatReader { width: 2, height: 1 }.read_raw(&bytes).unwrap();
        assert_eq!(reread.samples(), image.samples());
    }

    #[test]
    fn test_rgb_is_rejected() {
        let rgb = RgbImageData {
            width: 1,
            height: 1,
            data: vec![1, 2, 3],
            bits_per_sample: 8,
        };
        let result = DatWriter.write_rgb(&rgb, &mut Vec::<u8>::new(), &OutputConfig::default());
        assert!(matches!(result, Err(AnalysisError::UnsupportedFormat(_))));
    }
}
