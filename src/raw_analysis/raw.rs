//! RAW image module
//!
//! The in-memory sample buffer plus the decoders that build it from files.

mod reader;
mod pgm_reader;
mod dat_reader;
mod rawloader_reader;
mod auto_reader;
pub mod types;

pub use reader::RawImageReader;
pub use pgm_reader::PgmReader;
pub use dat_reader::DatReader;
pub use rawloader_reader::RawLoaderReader;
pub use auto_reader::AutoReader;
pub use types::{MaskedArea, RawImage};
