use std::io::Write;

use crate::raw_analysis::common::error::Result;
use crate::raw_analysis::output::types::OutputConfig;
use crate::raw_analysis::preview::RgbImageData;
use crate::raw_analysis::raw::RawImage;

pub trait ImageWriter {
    fn write_raw(&self, image: &RawImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
    fn write_rgb(&self, image: &RgbImageData, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
}
