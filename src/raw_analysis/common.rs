//! Common utilities module
//!
//! This module contains shared utilities used across the analysis modules.

pub mod error;

pub use error::{AnalysisError, Result};
