//! Dual pixel RAW module
//!
//! Recombines the two exposures of a dual pixel capture: the combined (A+B)
//! frame and the secondary (B) frame read out from the same photosites.

mod types;
mod merge;

pub use types::{DprawAction, DprawConfig, DprawConfigBuilder, DprawMode};
pub use merge::dpraw_process;
