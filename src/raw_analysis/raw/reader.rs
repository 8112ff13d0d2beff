use crate::raw_analysis::common::error::Result;
use crate::raw_analysis::raw::types::RawImage;

pub trait RawImageReader {
    fn read_raw(&self, data: &[u8]) -> Result<RawImage>;
}
