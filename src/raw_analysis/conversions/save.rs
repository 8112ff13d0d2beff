use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, instrument};

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::output::{OutputConfig, OutputFormat};
use crate::raw_analysis::preview::RgbImageData;
use crate::raw_analysis::raw::RawImage;

fn write_error(output_path: &Path, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::OutputWriteError(format!("{}: {}", output_path.display(), e))
}

fn create_output(output_path: &Path) -> Result<BufWriter<File>> {
    let _span = tracing::info_span!("create_output_file").entered();
    let file = File::create(output_path).map_err(|e| write_error(output_path, e))?;
    Ok(BufWriter::new(file))
}

fn finish(mut output: BufWriter<File>, output_path: &Path) -> Result<()> {
    output.flush().map_err(|e| write_error(output_path, e))
}

/// Saves sensor data in the container named by the extension of `output_path`.
#[instrument(skip(image, output_path, config))]
pub fn save_raw<P: AsRef<Path>>(image: &RawImage, output_path: P, config: &OutputConfig) -> Result<()> {
    let output_path = output_path.as_ref();
    let format = OutputFormat::from_path(output_path)?;
    if !format.holds_raw() {
        return Err(AnalysisError::UnsupportedFormat(format!(
            "{}: single channel data cannot be saved as {:?}",
            output_path.display(),
            format
        )));
    }

    let mut output = create_output(output_path)?;
    {
        let _span = tracing::info_span!("encode_image", format = ?format).entered();
        format
            .writer()
            .write_raw(image, &mut output, config)
            .map_err(|e| write_error(output_path, e))?;
    }
    finish(output, output_path)?;

    info!(
        output = %output_path.display(),
        width = image.width(),
        height = image.height(),
        "Image saved"
    );
    Ok(())
}

/// Saves an RGB rendering in the container named by the extension of `output_path`.
#[instrument(skip(image, output_path, config))]
pub fn save_rgb<P: AsRef<Path>>(image: &RgbImageData, output_path: P, config: &OutputConfig) -> Result<()> {
    let output_path = output_path.as_ref();
    let format = OutputFormat::from_path(output_path)?;
    if !format.holds_rgb() {
        return Err(AnalysisError::UnsupportedFormat(format!(
            "{}: RGB data cannot be saved as {:?}",
            output_path.display(),
            format
        )));
    }

    let mut output = create_output(output_path)?;
    {
        let _span = tracing::info_span!("encode_image", format = ?format).entered();
        format
            .writer()
            .write_rgb(image, &mut output, config)
            .map_err(|e| write_error(output_path, e))?;
    }
    finish(output, output_path)?;

    info!(
        output = %output_path.display(),
        width = image.width,
        height = image.height,
        "RGB image saved"
    );
    Ok(())
}
