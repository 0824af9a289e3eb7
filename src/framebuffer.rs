use crate::color::Color;
use crate::error::{EngineError, EngineResult};

/// Owned XRGB8888 pixel grid, row-major, overwritten every frame.
pub struct Framebuffer {
    pixels: Vec<u32>,
    width: usize,
    height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> EngineResult<Self> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidConfig(format!(
                "framebuffer must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self {
            pixels: vec![0; width * height],
            width,
            height,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_xrgb8888());
    }

    /// Fill `(x, y, w, h)` after clipping it to the screen. Non-positive sizes
    /// and rectangles that end up fully off-screen are no-ops.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        // i64 so that huge near-wall strips cannot overflow x + w
        let (mut x, mut y, mut w, mut h) = (x as i64, y as i64, w as i64, h as i64);
        if x < 0 {
            w += x;
            x = 0;
        }
        if y < 0 {
            h += y;
            y = 0;
        }
        let (fw, fh) = (self.width as i64, self.height as i64);
        if x + w > fw {
            w = fw - x;
        }
        if y + h > fh {
            h = fh - y;
        }
        if w <= 0 || h <= 0 {
            return;
        }

        let px = color.to_xrgb8888();
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        for row in self.pixels.chunks_exact_mut(self.width).skip(y).take(h) {
            row[x..x + w].fill(px);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            Some(Color::from_xrgb8888(self.pixels[y * self.width + x]))
        } else {
            None
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The frame as one contiguous byte region, ready for a display transfer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}
