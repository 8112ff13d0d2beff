//! Colour filter patterns

use std::fmt;
use std::str::FromStr;

use crate::raw_analysis::common::error::AnalysisError;

/// Identifies one of the sampling patterns supported over a 2x2 Bayer mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterCode {
    R,
    G1,
    G2,
    /// Both green positions, interleaved row by row
    G,
    B,
    /// Every sample of the buffer
    All,
}

impl FilterCode {
    /// The four physical positions of a 2x2 cell, in output order.
    pub const BAYER: [FilterCode; 4] = [FilterCode::R, FilterCode::G1, FilterCode::G2, FilterCode::B];

    /// Every code, physical positions first.
    pub const ALL_CODES: [FilterCode; 6] = [
        FilterCode::R,
        FilterCode::G1,
        FilterCode::G2,
        FilterCode::B,
        FilterCode::G,
        FilterCode::All,
    ];

    pub fn pattern(self) -> FilterPattern {
        FilterPattern::from_code(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            FilterCode::R => "R",
            FilterCode::G1 => "G1",
            FilterCode::G2 => "G2",
            FilterCode::G => "G",
            FilterCode::B => "B",
            FilterCode::All => "RGB",
        }
    }
}

impl fmt::Display for FilterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterCode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "R" => Ok(FilterCode::R),
            "G1" => Ok(FilterCode::G1),
            "G2" => Ok(FilterCode::G2),
            "G" => Ok(FilterCode::G),
            "B" => Ok(FilterCode::B),
            "RGB" | "ALL" => Ok(FilterCode::All),
            other => Err(AnalysisError::InvalidArgument(format!("unknown filter code '{}'", other))),
        }
    }
}

/// A simple periodic pixel pattern.
///
/// The sample at logical column `cx`, row `cy` lives at physical row
/// `cy * y_period + y_phase` and physical column `cx * x_period + x_phase(row)`,
/// where the horizontal phase depends on the parity of the physical row.
///
/// ```text
///  R  G1        R  G1  G2  B  G  ALL
///  G2 B   x_phase_even   0   1   0  1  1  0
///         x_phase_odd    0   1   0  1  0  0
///         y_phase        0   0   1  1  0  0
///         x_period       2   2   2  2  2  1
///         y_period       2   2   2  2  1  1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterPattern {
    pub code: FilterCode,
    pub x_phase_even: usize,
    pub x_phase_odd: usize,
    pub y_phase: usize,
    pub x_period: usize,
    pub y_period: usize,
}

impl FilterPattern {
    pub const R: FilterPattern = FilterPattern::new(FilterCode::R, 0, 0, 0, 2, 2);
    pub const G1: FilterPattern = FilterPattern::new(FilterCode::G1, 1, 1, 0, 2, 2);
    pub const G2: FilterPattern = FilterPattern::new(FilterCode::G2, 0, 0, 1, 2, 2);
    pub const G: FilterPattern = FilterPattern::new(FilterCode::G, 1, 0, 0, 2, 1);
    pub const B: FilterPattern = FilterPattern::new(FilterCode::B, 1, 1, 1, 2, 2);
    pub const ALL: FilterPattern = FilterPattern::new(FilterCode::All, 0, 0, 0, 1, 1);

    const fn new(
        code: FilterCode,
        x_phase_even: usize,
        x_phase_odd: usize,
        y_phase: usize,
        x_period: usize,
        y_period: usize,
    ) -> Self {
        Self {
            code,
            x_phase_even,
            x_phase_odd,
            y_phase,
            x_period,
            y_period,
        }
    }

    pub const fn from_code(code: FilterCode) -> Self {
        match code {
            FilterCode::R => Self::R,
            FilterCode::G1 => Self::G1,
            FilterCode::G2 => Self::G2,
            FilterCode::G => Self::G,
            FilterCode::B => Self::B,
            FilterCode::All => Self::ALL,
        }
    }

    /// Horizontal phase for a physical row.
    #[inline]
    pub fn x_phase(&self, physical_row: usize) -> usize {
        if physical_row & 1 == 1 {
            self.x_phase_odd
        } else {
            self.x_phase_even
        }
    }

    /// Physical row holding logical row `cy`.
    #[inline]
    pub fn physical_row(&self, cy: usize) -> usize {
        cy * self.y_period + self.y_phase
    }

    /// Offset of logical `(cx, cy)` in a buffer with `row_pixels` samples per row.
    #[inline]
    pub fn offset(&self, row_pixels: usize, cx: usize, cy: usize) -> usize {
        let row = self.physical_row(cy);
        row * row_pixels + cx * self.x_period + self.x_phase(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_names() {
        for code in FilterCode::ALL_CODES {
            let parsed: FilterCode = code.name().parse().unwrap();
            assert_eq!(parsed, code);
            assert_eq!(code.pattern().code, code);
        }
        assert_eq!("all".parse::<FilterCode>().unwrap(), FilterCode::All);
        assert_eq!(" g1 ".parse::<FilterCode>().unwrap(), FilterCode::G1);
        assert!(matches!("X".parse::<FilterCode>(), Err(AnalysisError::InvalidArgument(_))));
    }

    #[test]
    fn test_bayer_positions_cover_a_cell() {
        let mut hits = [0u8; 4];
        for code in FilterCode::BAYER {
            let offset = code.pattern().offset(2, 0, 0);
            hits[offset] += 1;
        }
        assert_eq!(hits, [1, 1, 1, 1]);
    }

    #[test]
    fn test_green_alternates_phase_by_row() {
        let g = FilterPattern::G;
        // 4 samples per row: row 0 greens at 1, 3; row 1 greens at 4, 6
        assert_eq!(g.offset(4, 0, 0), 1);
        assert_eq!(g.offset(4, 1, 0), 3);
        assert_eq!(g.offset(4, 0, 1), 4);
        assert_eq!(g.offset(4, 1, 1), 6);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(FilterPattern::from_code(FilterCode::B), FilterPattern::B);
        assert_ne!(FilterPattern::G1, FilterPattern::G2);
    }
}
