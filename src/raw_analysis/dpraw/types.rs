//! Dual pixel merge configuration types

use std::str::FromStr;

use crate::raw_analysis::common::error::AnalysisError;

/// What to produce from the pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DprawAction {
    /// Recover the primary (A) subframe by subtracting B from A+B
    GetA,
    /// Replace clipped areas of A+B by B, shifting A+B to match the exposure
    Blend,
}

/// How clipping is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DprawMode {
    /// Every filter position on its own
    Plain,
    /// Whole 2x2 cells: one clipped sub-pixel invalidates the cell
    Bayer,
}

impl FromStr for DprawAction {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "geta" => Ok(DprawAction::GetA),
            "blend" => Ok(DprawAction::Blend),
            other => Err(AnalysisError::InvalidArgument(format!("unknown DPRAW action '{}'", other))),
        }
    }
}

impl FromStr for DprawMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(DprawMode::Plain),
            "bayer" => Ok(DprawMode::Bayer),
            other => Err(AnalysisError::InvalidArgument(format!("unknown DPRAW mode '{}'", other))),
        }
    }
}

/// Configuration for a dual pixel merge
#[derive(Debug, Clone)]
pub struct DprawConfig {
    /// Combined frame values at or above this level are clipped
    pub white_level: u16,
    /// Exposure shift applied to the combined frame when blending (EV)
    pub ev_shift: Option<f64>,
    pub action: DprawAction,
    pub mode: DprawMode,
}

impl Default for DprawConfig {
    fn default() -> Self {
        Self {
            white_level: u16::MAX,
            ev_shift: None,
            action: DprawAction::GetA,
            mode: DprawMode::Plain,
        }
    }
}

impl DprawConfig {
    pub fn builder() -> DprawConfigBuilder {
        DprawConfigBuilder::default()
    }
}

/// Builder for DprawConfig
#[derive(Default)]
pub struct DprawConfigBuilder {
    white_level: Option<u16>,
    ev_shift: Option<Option<f64>>,
    action: Option<DprawAction>,
    mode: Option<DprawMode>,
}

impl DprawConfigBuilder {
    pub fn white_level(mut self, white_level: u16) -> Self {
        self.white_level = Some(white_level);
        self
    }

    pub fn ev_shift(mut self, ev_shift: Option<f64>) -> Self {
        self.ev_shift = Some(ev_shift);
        self
    }

    pub fn action(mut self, action: DprawAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn mode(mut self, mode: DprawMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> DprawConfig {
        let default = DprawConfig::default();
        DprawConfig {
            white_level: self.white_level.unwrap_or(default.white_level),
            ev_shift: self.ev_shift.unwrap_or(default.ev_shift),
            action: self.action.unwrap_or(default.action),
            mode: self.mode.unwrap_or(default.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DprawConfig::builder()
            .white_level(15000)
            .ev_shift(Some(-1.0))
            .action(DprawAction::Blend)
            .mode(DprawMode::Bayer)
            .build();

        assert_eq!(config.white_level, 15000);
        assert_eq!(config.ev_shift, Some(-1.0));
        assert_eq!(config.action, DprawAction::Blend);
        assert_eq!(config.mode, DprawMode::Bayer);
    }

    #[test]
    fn test_config_defaults() {
        let config = DprawConfig::builder().build();
        assert_eq!(config.white_level, u16::MAX);
        assert_eq!(config.ev_shift, None);
        assert_eq!(config.action, DprawAction::GetA);
        assert_eq!(config.mode, DprawMode::Plain);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("GetA".parse::<DprawAction>().unwrap(), DprawAction::GetA);
        assert_eq!("blend".parse::<DprawAction>().unwrap(), DprawAction::Blend);
        assert_eq!("BAYER".parse::<DprawMode>().unwrap(), DprawMode::Bayer);
        assert!("mix".parse::<DprawAction>().is_err());
        assert!("cells".parse::<DprawMode>().is_err());
    }
}
