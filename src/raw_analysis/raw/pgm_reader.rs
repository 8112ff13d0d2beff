//! Binary greyscale Netpbm (`P5`) decoding, as produced by `dcraw -D -4 -j -t 0`.

use tracing::debug;

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::raw::reader::RawImageReader;
use crate::raw_analysis::raw::types::RawImage;

pub struct PgmReader;

const MAGIC: &[u8; 2] = b"P5";

/// Walks the whitespace separated header, skipping `#` comments.
struct HeaderScanner<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> HeaderScanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn skip_blanks(&mut self) {
        while let Some(&byte) = self.data.get(self.position) {
            if byte == b'#' {
                while let Some(&byte) = self.data.get(self.position) {
                    self.position += 1;
                    if byte == b'\n' {
                        break;
                    }
                }
            } else if byte.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }

    fn token(&mut self) -> Option<&'a [u8]> {
        self.skip_blanks();
        let start = self.position;
        while self
            .data
            .get(self.position)
            .is_some_and(|byte| !byte.is_ascii_whitespace())
        {
            self.position += 1;
        }
        (self.position > start).then(|| &self.data[start..self.position])
    }

    fn number(&mut self, what: &str) -> Result<u64> {
        let token = self
            .token()
            .ok_or_else(|| AnalysisError::DecodeError(format!("too short file: missing {}", what)))?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| AnalysisError::DecodeError(format!("invalid {} in PGM header", what)))
    }
}

impl RawImageReader for PgmReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage> {
        if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
            return Err(AnalysisError::DecodeError("not a valid PGM file (bad magic number)".to_string()));
        }

        let mut header = HeaderScanner::new(&data[MAGIC.len()..]);
        let width = header.number("width")?;
        let height = header.number("height")?;
        let max_value = header.number("maximum value")?;

        if !(256..=65535).contains(&max_value) {
            return Err(AnalysisError::UnsupportedFormat(format!(
                "not a 16-bit PGM file (maximum value {})",
                max_value
            )));
        }

        let (width, height) = match (usize::try_from(width), usize::try_from(height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(AnalysisError::UnsupportedFormat(format!(
                    "unsupported file size ({}x{})",
                    width, height
                )));
            }
        };

        // exactly one whitespace byte separates the header from the samples
        let body_start = MAGIC.len() + header.position + 1;
        let body = data.get(body_start..).unwrap_or_default();

        let expected = width
            .checked_mul(height)
            .and_then(|pixels| pixels.checked_mul(2))
            .ok_or_else(|| AnalysisError::UnsupportedFormat(format!("unsupported file size ({}x{})", width, height)))?;
        if body.len() < expected {
            return Err(AnalysisError::DecodeError(format!(
                "too short file: {} sample bytes, {}x{} needs {}",
                body.len(),
                width,
                height,
                expected
            )));
        }

        debug!("Decoded PGM header: {}x{}, maximum value {}", width, height, max_value);

        let samples = body[..expected]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();

        RawImage::new(width, height, samples)
    }
}
