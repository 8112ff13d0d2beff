//! Headerless sample dumps.

use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::raw::reader::RawImageReader;
use crate::raw_analysis::raw::types::RawImage;

/// Reads a dump of big-endian 16-bit samples whose dimensions are known upfront.
#[derive(Debug, Clone, Copy)]
pub struct DatReader {
    pub width: usize,
    pub height: usize,
}

impl DatReader {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

impl RawImageReader for DatReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|pixels| pixels.checked_mul(2))
            .ok_or_else(|| {
                AnalysisError::InvalidArgument(format!("unsupported size {}x{}", self.width, self.height))
            })?;

        if data.len() < expected {
            return Err(AnalysisError::DecodeError(format!(
                "too short file: {} bytes, {}x{} needs {}",
                data.len(),
                self.width,
                self.height,
                expected
            )));
        }

        debug!("Decoding {}x{} sample dump", self.width, self.height);

        let samples = data[..expected]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        RawImage::new(self.width, self.height, samples)
    }
}
