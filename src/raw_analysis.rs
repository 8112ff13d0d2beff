//! Sensor characterisation toolkit for uncompressed RAW captures
//!
//! The model is layered: a [`RawImage`] owns the samples, a [`Channel`] exposes one
//! colour filter position of it as a dense grid, and a [`Selection`] crops that grid
//! for statistics, histograms and the dual pixel merge.

pub mod common;
pub mod raw;
pub mod geometry;
pub mod stats;
pub mod dpraw;
pub mod preview;
pub mod output;
pub mod conversions;
pub mod export;

pub use common::{
    AnalysisError,
    Result,
};

pub use raw::{
    AutoReader,
    DatReader,
    MaskedArea,
    PgmReader,
    RawImage,
    RawImageReader,
    RawLoaderReader,
};

pub use geometry::{
    Channel,
    FilterCode,
    FilterPattern,
    Pixels,
    PixelsMut,
    Selection,
    SelectionMut,
};

pub use stats::{
    AutoLevels,
    FlatExposure,
    FlatFrame,
    FlatPair,
    Highlights,
    Histogram,
    ReadNoise,
    SensorGain,
    Stats1,
    Stats2,
    analyze,
    auto_levels,
    build_histogram,
    build_histogram_bucketed,
    calibrate_black_levels,
    flat_pair,
    highlights,
    read_noise,
    sensor_gain,
    set_black_levels,
    set_white_level,
    subtract,
};

pub use dpraw::{
    DprawAction,
    DprawConfig,
    DprawConfigBuilder,
    DprawMode,
    dpraw_process,
};

pub use preview::{
    GammaTable,
    RgbImageData,
    highlight_clipping,
};

pub use output::{
    DatWriter,
    ImageWriter,
    NetpbmWriter,
    OutputConfig,
    OutputConfigBuilder,
    OutputFormat,
    StandardTiffWriter,
    TiffCompression,
};

pub use conversions::{
    LoadConfig,
    LoadConfigBuilder,
    RawImagePipeline,
    save_raw,
    save_rgb,
};

pub use export::{
    ChannelReport,
    Crop,
    HistogramTable,
    channel_reports,
    histogram_table,
    masked_reports,
    write_histogram_csv,
    write_stats_csv,
};
