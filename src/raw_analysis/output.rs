//! Image writers and output format dispatch

pub mod types;
mod writer;
mod dat_writer;
mod netpbm_writer;
mod standard_tiff_writer;

pub use types::{OutputConfig, OutputConfigBuilder, OutputFormat, TiffCompression};
pub use writer::ImageWriter;
pub use dat_writer::DatWriter;
pub use netpbm_writer::NetpbmWriter;
pub use standard_tiff_writer::StandardTiffWriter;
