use std::io::Write;

use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::output::types::OutputConfig;
use crate::raw_analysis::output::writer::ImageWriter;
use crate::raw_analysis::preview::RgbImageData;
use crate::raw_analysis::raw::RawImage;

/// Binary PGM (P5, 16-bit) for sensor data and PPM (P6) for RGB.
pub struct NetpbmWriter;

impl ImageWriter for NetpbmWriter {
    fn write_raw(&self, image: &RawImage, output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
        debug!("Encoding PGM image: {}x{}", image.width(), image.height());
        let mut buffer = format!("P5\n{} {}\n65535\n", image.width(), image.height()).into_bytes();
        buffer.reserve(image.samples().len() * 2);
        buffer.extend(image.samples().iter().flat_map(|value| value.to_be_bytes()));
        output.write_all(&buffer)?;
        Ok(())
    }

    fn write_rgb(&self, image: &RgbImageData, output: &mut dyn Write, _config: &OutputConfig) -> Result<()> {
        debug!("Encoding PPM image: {}x{}", image.width, image.height);
        if image.data.len() != image.width * image.height * 3 {
            return Err(AnalysisError::EncodeError(format!(
                "{} components do not fill a {}x{} RGB image",
                image.data.len(),
                image.width,
                image.height
            )));
        }

        let wide = image.bits_per_sample > 8;
        let max_value = if wide { 65535 } else { 255 };
        let mut buffer = format!("P6\n{} {}\n{}\n", image.width, image.height, max_value).into_bytes();
        if wide {
            buffer.extend(image.data.iter().flat_map(|value| value.to_be_bytes()));
        } else {
            buffer.extend(image.data.iter().map(|&value| value.min(255) as u8));
        }
        output.write_all(&buffer)?;
        Ok(())
    }
}
