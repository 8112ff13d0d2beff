//! Pipeline conversions module
//!
//! Orchestration of file loading (read, decode, validate, apply the masked
//! border) and of saving sensor or preview images by output extension.

mod load;
mod save;


pub use load::{LoadConfig, LoadConfigBuilder, RawImagePipeline};
pub use save::{save_raw, save_rgb};
