use crate::raw_analysis::common::error::Result;
use crate::raw_analysis::geometry::{FilterCode, Pixels};
use crate::raw_analysis::raw::RawImage;

/// The four filter positions of one 2x2 cell, in R, G1, G2, B order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell {
    pub(crate) values: [u16; 4],
    pub(crate) offsets: [usize; 4],
}

/// Walks the four Bayer channels of an image in lockstep, one cell at a time,
/// row-major over the logical grid.
pub(crate) struct BayerCells<'a> {
    channels: [Pixels<'a>; 4],
}

impl<'a> BayerCells<'a> {
    pub(crate) fn new(image: &'a RawImage) -> Result<Self> {
        let [r, g1, g2, b] = FilterCode::BAYER;
        Ok(Self {
            channels: [
                image.channel(r).select_all()?.pixels(),
                image.channel(g1).select_all()?.pixels(),
                image.channel(g2).select_all()?.pixels(),
                image.channel(b).select_all()?.pixels(),
            ],
        })
    }
}

impl Iterator for BayerCells<'_> {
    type Item = Cell;

    #[inline]
    fn next(&mut self) -> Option<Cell> {
        // all four channels share the logical size, red speaks for them
        if !self.channels[0].has_pixel() {
            return None;
        }
        let mut cell = Cell {
            values: [0; 4],
            offsets: [0; 4],
        };
        for (index, channel) in self.channels.iter_mut().enumerate() {
            cell.offsets[index] = channel.offset();
            cell.values[index] = channel.next()?;
        }
        Some(cell)
    }
}
