//! Pixel addressing module
//!
//! Periodic colour filter patterns over a flat row-major buffer, exposed as dense
//! logical grids ([`Channel`]), rectangular crops of them ([`Selection`]) and
//! sequential cursors ([`Pixels`]) that step without any division in the hot path.

mod filter;
mod channel;
mod selection;
mod cursor;
mod cells;

pub use filter::{FilterCode, FilterPattern};
pub use channel::Channel;
pub use selection::{Selection, SelectionMut};
pub use cursor::{Pixels, PixelsMut};
pub(crate) use cells::BayerCells;
