use crate::raw_analysis::common::error::Result;
use crate::raw_analysis::raw::{DatReader, PgmReader, RawImageReader, RawLoaderReader};
use crate::raw_analysis::raw::types::RawImage;

/// Chooses a decoder from the content: `P5` PGM, a sample dump when its
/// dimensions were supplied, camera RAW otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReader {
    pub dat_dimensions: Option<(usize, usize)>,
}

impl AutoReader {
    pub fn new(dat_dimensions: Option<(usize, usize)>) -> Self {
        Self { dat_dimensions }
    }
}

impl RawImageReader for AutoReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        if data.starts_with(b"P5") {
            return PgmReader.read_raw(data);
        }
        match self.dat_dimensions {
            Some((width, height)) => DatReader::new(width, height).read_raw(data),
            None => RawLoaderReader.read_raw(data),
        }
    }
}
