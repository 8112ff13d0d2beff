use thiserror::Error;

use crate::raw_analysis::geometry::FilterCode;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Black level not defined for filter {0}")]
    MissingBlackLevel(FilterCode),

    #[error("Image lacks a left mask (optical black area)")]
    MissingMask,

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
