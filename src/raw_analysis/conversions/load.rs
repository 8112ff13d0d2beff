use std::path::Path;

use tracing::{info, instrument, warn};

use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::raw::{AutoReader, RawImage, RawImageReader};

/// Configuration for loading sensor data
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Width of the optical black border on the left, 0 keeps what the decoder found
    pub masked_left: usize,
    /// Height of the optical black border on top, 0 keeps what the decoder found
    pub masked_top: usize,
    /// Dimensions of headerless sample dumps
    pub dat_dimensions: Option<(usize, usize)>,
    /// Whether to reject images that cannot hold a full 2x2 cell or their masked border
    pub validate_dimensions: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            masked_left: 0,
            masked_top: 0,
            dat_dimensions: None,
            validate_dimensions: true,
        }
    }
}

impl LoadConfig {
    pub fn builder() -> LoadConfigBuilder {
        LoadConfigBuilder::default()
    }
}

/// Builder for LoadConfig
#[derive(Default)]
pub struct LoadConfigBuilder {
    masked_left: Option<usize>,
    masked_top: Option<usize>,
    dat_dimensions: Option<Option<(usize, usize)>>,
    validate_dimensions: Option<bool>,
}

impl LoadConfigBuilder {
    pub fn masked_area(mut self, left: usize, top: usize) -> Self {
        self.masked_left = Some(left);
        self.masked_top = Some(top);
        self
    }

    pub fn dat_dimensions(mut self, dimensions: Option<(usize, usize)>) -> Self {
        self.dat_dimensions = Some(dimensions);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn build(self) -> LoadConfig {
        let default = LoadConfig::default();
        LoadConfig {
            masked_left: self.masked_left.unwrap_or(default.masked_left),
            masked_top: self.masked_top.unwrap_or(default.masked_top),
            dat_dimensions: self.dat_dimensions.unwrap_or(default.dat_dimensions),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
        }
    }
}

pub struct RawImagePipeline<R: RawImageReader> {
    reader: R,
    config: LoadConfig,
}

impl RawImagePipeline<AutoReader> {
    pub fn new(config: LoadConfig) -> Self {
        Self {
            reader: AutoReader::new(config.dat_dimensions),
            config,
        }
    }
}

impl<R: RawImageReader> RawImagePipeline<R> {
    pub fn with_custom(reader: R, config: LoadConfig) -> Self {
        Self { reader, config }
    }

    fn validate_dimensions(&self, image: &RawImage) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let (width, height) = (image.width(), image.height());
        if width < 2 || height < 2 {
            return Err(AnalysisError::InvalidArgument(format!(
                "image {}x{} does not hold a single 2x2 cell",
                width, height
            )));
        }
        if self.config.masked_left >= width || self.config.masked_top >= height {
            warn!(
                "Masked border {},{} exceeds image {}x{}",
                self.config.masked_left, self.config.masked_top, width, height
            );
            return Err(AnalysisError::InvalidArgument(format!(
                "masked border {},{} does not fit a {}x{} image",
                self.config.masked_left, self.config.masked_top, width, height
            )));
        }

        Ok(())
    }

    #[instrument(skip(self, input_data), fields(input_size = input_data.len()))]
    pub fn decode(&self, input_data: &[u8]) -> Result<RawImage> {
        let mut image = {
            let _span = tracing::info_span!("decode_raw").entered();
            self.reader.read_raw(input_data)?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = image.width(),
                height = image.height()
            ).entered();
            self.validate_dimensions(&image)?;
        }

        if self.config.masked_left > 0 || self.config.masked_top > 0 {
            image = image.with_masked_area(self.config.masked_left, self.config.masked_top);
        }

        info!(
            width = image.width(),
            height = image.height(),
            masked_left = image.masked().left,
            masked_top = image.masked().top,
            "Image decoded"
        );
        Ok(image)
    }

    #[instrument(skip(self, input_path))]
    pub fn load_file<P: AsRef<Path>>(&self, input_path: P) -> Result<RawImage> {
        let input_path = input_path.as_ref();
        info!(input = %input_path.display(), "Loading file");

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                AnalysisError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let image = self.decode(&input_data)?;
        if image.name().is_empty() {
            let name = input_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(image.with_name(name));
        }
        Ok(image)
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }
}
