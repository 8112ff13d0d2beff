use std::io::{Cursor, Write};

use tiff::encoder::colortype::{ColorType, Gray16, RGB16, RGB8};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, TiffValue};
use tiff::tags::Predictor;
use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::output::types::{OutputConfig, TiffCompression};
use crate::raw_analysis::output::writer::ImageWriter;
use crate::raw_analysis::preview::RgbImageData;
use crate::raw_analysis::raw::RawImage;

pub struct StandardTiffWriter;

impl StandardTiffWriter {
    fn encode<C>(width: usize, height: usize, data: &[C::Inner], config: &OutputConfig) -> Result<Vec<u8>>
    where
        C: ColorType,
        [C::Inner]: TiffValue,
    {
        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut buffer = Vec::new();
        {
            let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
                .map_err(|e| AnalysisError::EncodeError(e.to_string()))?
                .with_compression(compression);

            if let Some(predictor) = config.predictor {
                encoder = encoder.with_predictor(match predictor {
                    2 => Predictor::Horizontal,
                    _ => Predictor::None,
                });
            }

            encoder
                .write_image::<C>(width as u32, height as u32, data)
                .map_err(|e| AnalysisError::EncodeError(e.to_string()))?;
        }
        Ok(buffer)
    }
}

impl ImageWriter for StandardTiffWriter {
    fn write_raw(&self, image: &RawImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!("Encoding TIFF image: {}x{}", image.width(), image.height());
        let buffer = Self::encode::<Gray16>(image.width(), image.height(), image.samples(), config)?;
        output.write_all(&buffer)?;
        debug!("TIFF encoding complete");
        Ok(())
    }

    fn write_rgb(&self, image: &RgbImageData, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        debug!(
            "Encoding RGB TIFF image: {}x{}, {} bits",
            image.width, image.height, image.bits_per_sample
        );
        let buffer = if image.bits_per_sample > 8 {
            Self::encode::<RGB16>(image.width, image.height, &image.data, config)?
        } else {
            let narrow: Vec<u8> = image.data.iter().map(|&value| value.min(255) as u8).collect();
            Self::encode::<RGB8>(image.width, image.height, &narrow, config)?
        };
        output.write_all(&buffer)?;
        debug!("TIFF encoding complete");
        Ok(())
    }
}
