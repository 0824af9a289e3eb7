use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

use crate::framebuffer::Framebuffer;

/// Precomputed source taps and 8.8 fixed-point weights for stretching a
/// framebuffer onto a window surface of a different size.
#[derive(Clone, Debug, Default)]
pub struct ScaleLut {
    dst_w: usize,
    dst_h: usize,
    x0: Vec<usize>,
    x1: Vec<usize>,
    wx: Vec<u32>,
    y0: Vec<usize>,
    y1: Vec<usize>,
    wy: Vec<u32>,
}

/// Taps along one axis: for each destination index, the two source indices
/// and the weight of the second.
fn axis_taps(dst: usize, src: usize) -> (Vec<usize>, Vec<usize>, Vec<u32>) {
    let step = src as f32 / dst as f32;
    let last = src.saturating_sub(1);
    (0..dst)
        .map(|i| {
            let f = i as f32 * step;
            let a = (f.floor() as usize).min(last);
            let b = (a + 1).min(last);
            let w = ((f - a as f32) * 256.0).round().clamp(0.0, 256.0) as u32;
            (a, b, w)
        })
        .fold((Vec::with_capacity(dst), Vec::with_capacity(dst), Vec::with_capacity(dst)), |mut acc, (a, b, w)| {
            acc.0.push(a);
            acc.1.push(b);
            acc.2.push(w);
            acc
        })
}

impl ScaleLut {
    pub fn new(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> Self {
        let (x0, x1, wx) = axis_taps(dst_w, src_w);
        let (y0, y1, wy) = axis_taps(dst_h, src_h);
        Self {
            dst_w,
            dst_h,
            x0,
            x1,
            wx,
            y0,
            y1,
            wy,
        }
    }

    /// Whether this table was built for a `w x h` destination.
    pub fn fits(&self, w: usize, h: usize) -> bool {
        self.dst_w == w && self.dst_h == h
    }

    /// Bilinear stretch of `src` into `dst`, one destination row per task.
    pub fn blit(&self, dst: &mut [u32], src: &Framebuffer) {
        let sw = src.width();
        let px = src.pixels();
        dst.par_chunks_mut(self.dst_w)
            .take(self.dst_h)
            .enumerate()
            .for_each(|(y, row)| {
                let (r0, r1, wy) = (self.y0[y] * sw, self.y1[y] * sw, self.wy[y]);
                for (x, out) in row.iter_mut().enumerate() {
                    let (x0, x1, wx) = (self.x0[x], self.x1[x], self.wx[x]);
                    let top = lerp_xrgb(px[r0 + x0], px[r0 + x1], wx);
                    let bot = lerp_xrgb(px[r1 + x0], px[r1 + x1], wx);
                    *out = lerp_xrgb(top, bot, wy);
                }
            });
    }
}

/// Blend two XRGB8888 pixels, `w` in `[0, 256]` being the weight of `b`.
#[inline]
fn lerp_xrgb(a: u32, b: u32, w: u32) -> u32 {
    let inv = 256 - w;
    // red and blue share one multiply, green gets its own
    let rb = (((a & 0x00FF_00FF) * inv + (b & 0x00FF_00FF) * w) >> 8) & 0x00FF_00FF;
    let g = (((a & 0x0000_FF00) * inv + (b & 0x0000_FF00) * w) >> 8) & 0x0000_FF00;
    rb | g
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn identity_scale_copies_pixels() {
        let mut src = Framebuffer::new(4, 3).unwrap();
        src.clear(Color::BLACK);
        src.fill_rect(1, 1, 2, 1, Color::ORANGE);
        let lut = ScaleLut::new(4, 3, 4, 3);
        let mut dst = vec![0u32; 12];
        lut.blit(&mut dst, &src);
        assert_eq!(&dst[..], src.pixels());
    }

    #[test]
    fn upscale_of_flat_frame_stays_flat() {
        let mut src = Framebuffer::new(24, 14).unwrap();
        src.clear(Color::SKYBLUE);
        let lut = ScaleLut::new(100, 70, 24, 14);
        assert!(lut.fits(100, 70));
        let mut dst = vec![0u32; 100 * 70];
        lut.blit(&mut dst, &src);
        assert!(dst.iter().all(|&p| p == Color::SKYBLUE.to_xrgb8888()));
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let (a, b) = (0x0000_0000, 0x00FF_FFFF);
        assert_eq!(lerp_xrgb(a, b, 0), a);
        assert_eq!(lerp_xrgb(a, b, 256), b);
        assert_eq!(lerp_xrgb(a, b, 128), 0x007F_7F7F);
    }
}
