use crate::raw_analysis::common::error::{AnalysisError, Result};
use crate::raw_analysis::geometry::cursor::Walk;
use crate::raw_analysis::geometry::{Channel, FilterPattern, Pixels, PixelsMut};
use crate::raw_analysis::raw::RawImage;

fn check_window(
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    bound_width: usize,
    bound_height: usize,
) -> Result<()> {
    if width < 1 || height < 1 {
        return Err(AnalysisError::OutOfRange(format!(
            "width({}) height({})",
            width, height
        )));
    }
    if x as u64 + width as u64 > bound_width as u64 {
        return Err(AnalysisError::OutOfRange(format!(
            "X({}) + width({}) beyond {}",
            x, width, bound_width
        )));
    }
    if y as u64 + height as u64 > bound_height as u64 {
        return Err(AnalysisError::OutOfRange(format!(
            "Y({}) + height({}) beyond {}",
            y, height, bound_height
        )));
    }
    Ok(())
}

fn check_pixel(cx: usize, cy: usize, width: usize, height: usize) -> Result<()> {
    if cx >= width {
        return Err(AnalysisError::OutOfRange(format!("X({}) beyond {}", cx, width - 1)));
    }
    if cy >= height {
        return Err(AnalysisError::OutOfRange(format!("Y({}) beyond {}", cy, height - 1)));
    }
    Ok(())
}

/// Rectangular crop of a [`Channel`], in the channel's logical coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    channel: Channel<'a>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl<'a> Selection<'a> {
    pub fn new(channel: Channel<'a>, x: usize, y: usize, width: usize, height: usize) -> Result<Self> {
        check_window(x, y, width, height, channel.width(), channel.height())?;
        Ok(Self {
            channel,
            x,
            y,
            width,
            height,
        })
    }

    pub fn channel(&self) -> Channel<'a> {
        self.channel
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Same size and placement (the channels may differ).
    pub fn same_placement(&self, other: &Selection<'_>) -> bool {
        self.width == other.width && self.height == other.height && self.x == other.x && self.y == other.y
    }

    /// Random access, slower than [`Selection::pixels`].
    pub fn pixel(&self, cx: usize, cy: usize) -> Result<u16> {
        check_pixel(cx, cy, self.width, self.height)?;
        let image = self.channel.image();
        let offset = self
            .channel
            .pattern()
            .offset(image.width(), self.x + cx, self.y + cy);
        Ok(image.samples()[offset])
    }

    /// Crop of this selection; bounds are relative to it.
    pub fn sub_select(&self, cx: usize, cy: usize, width: usize, height: usize) -> Result<Selection<'a>> {
        check_window(cx, cy, width, height, self.width, self.height)?;
        Ok(Selection {
            channel: self.channel,
            x: self.x + cx,
            y: self.y + cy,
            width,
            height,
        })
    }

    /// Sequential cursor, left to right and top to bottom.
    pub fn pixels(&self) -> Pixels<'a> {
        let image = self.channel.image();
        let walk = Walk::new(
            self.channel.pattern(),
            image.width(),
            self.x,
            self.y,
            self.width,
            self.height,
        );
        Pixels::new(image.samples(), walk)
    }
}

/// Writable crop of one channel of an exclusively borrowed [`RawImage`].
#[derive(Debug)]
pub struct SelectionMut<'a> {
    image: &'a mut RawImage,
    pattern: FilterPattern,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl<'a> SelectionMut<'a> {
    pub fn new(
        image: &'a mut RawImage,
        pattern: FilterPattern,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let channel = Channel::new(image, pattern);
        check_window(x, y, width, height, channel.width(), channel.height())?;
        Ok(Self {
            image,
            pattern,
            x,
            y,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn pixel(&self, cx: usize, cy: usize) -> Result<u16> {
        check_pixel(cx, cy, self.width, self.height)?;
        let offset = self.pattern.offset(self.image.width(), self.x + cx, self.y + cy);
        Ok(self.image.samples()[offset])
    }

    pub fn set_pixel(&mut self, cx: usize, cy: usize, value: u16) -> Result<()> {
        check_pixel(cx, cy, self.width, self.height)?;
        let offset = self.pattern.offset(self.image.width(), self.x + cx, self.y + cy);
        self.image.samples_mut()[offset] = value;
        Ok(())
    }

    pub fn pixels_mut(&mut self) -> PixelsMut<'_> {
        let walk = Walk::new(
            self.pattern,
            self.image.width(),
            self.x,
            self.y,
            self.width,
            self.height,
        );
        PixelsMut::new(self.image.samples_mut(), walk)
    }
}
