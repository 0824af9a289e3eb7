/// 8-bit RGBA color. Alpha is carried along but ignored by every pixel format
/// the engine writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

pub const MAX_CHANNEL: f32 = 255.0;

impl Color {
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const LIGHTGRAY: Color = Color::rgb(200, 200, 200);
    pub const GRAY: Color = Color::rgb(130, 130, 130);
    pub const DARKGRAY: Color = Color::rgb(80, 80, 80);
    pub const YELLOW: Color = Color::rgb(253, 249, 0);
    pub const GOLD: Color = Color::rgb(255, 203, 0);
    pub const ORANGE: Color = Color::rgb(255, 161, 0);
    pub const PINK: Color = Color::rgb(255, 109, 194);
    pub const RED: Color = Color::rgb(230, 41, 55);
    pub const MAROON: Color = Color::rgb(190, 33, 55);
    pub const GREEN: Color = Color::rgb(0, 228, 48);
    pub const LIME: Color = Color::rgb(0, 158, 47);
    pub const DARKGREEN: Color = Color::rgb(0, 117, 44);
    pub const SKYBLUE: Color = Color::rgb(102, 191, 255);
    pub const BLUE: Color = Color::rgb(0, 121, 241);
    pub const DARKBLUE: Color = Color::rgb(0, 82, 172);
    pub const PURPLE: Color = Color::rgb(200, 122, 255);
    pub const VIOLET: Color = Color::rgb(135, 60, 190);
    pub const DARKPURPLE: Color = Color::rgb(112, 31, 126);
    pub const BEIGE: Color = Color::rgb(211, 176, 131);
    pub const BROWN: Color = Color::rgb(127, 106, 79);
    pub const DARKBROWN: Color = Color::rgb(76, 63, 47);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const RAYWHITE: Color = Color::rgb(245, 245, 245);

    /// Pack as `0x00RRGGBB`, which is BGRA8 in little-endian memory (alpha at 0).
    #[inline]
    pub fn to_xrgb8888(self) -> u32 {
        (self.b as u32) | ((self.g as u32) << 8) | ((self.r as u32) << 16)
    }

    #[inline]
    pub fn from_xrgb8888(px: u32) -> Self {
        Self::rgb((px >> 16) as u8, (px >> 8) as u8, px as u8)
    }

    /// Pack as RGB565. Only the top 5/6/5 bits of each channel survive.
    #[inline]
    pub fn to_rgb565(self) -> u16 {
        (((self.r as u16) & 0xF8) << 8) | (((self.g as u16) & 0xFC) << 3) | ((self.b as u16) >> 3)
    }

    /// Inverse of [`Color::to_rgb565`]; the dropped low bits come back as zero.
    #[inline]
    pub fn from_rgb565(px: u16) -> Self {
        let r = ((px >> 11) & 0x1F) as u8;
        let g = ((px >> 5) & 0x3F) as u8;
        let b = (px & 0x1F) as u8;
        Self::rgb(r << 3, g << 2, b << 3)
    }

    /// Brighten (factor > 0) toward white or darken (factor < 0) toward black.
    ///
    /// `factor` is clamped to `[-1, 1]`. For `factor >= 0` every channel becomes
    /// `c + (255 - c) * factor`; for `factor < 0` it becomes `c * (1 + factor)`.
    /// Alpha is left alone.
    pub fn brightness(self, factor: f32) -> Self {
        let factor = factor.clamp(-1.0, 1.0);
        let adjust = |c: u8| -> u8 {
            let c = c as f32;
            let out = if factor < 0.0 {
                c * (1.0 + factor)
            } else {
                c + (MAX_CHANNEL - c) * factor
            };
            out.clamp(0.0, MAX_CHANNEL) as u8
        };
        Self {
            r: adjust(self.r),
            g: adjust(self.g),
            b: adjust(self.b),
            a: self.a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xrgb_layout_matches_softbuffer() {
        assert_eq!(Color::rgb(0x12, 0x34, 0x56).to_xrgb8888(), 0x0012_3456);
        assert_eq!(Color::from_xrgb8888(0x00AB_CDEF), Color::rgb(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn rgb565_extremes() {
        assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
        assert_eq!(Color::BLACK.to_rgb565(), 0x0000);
        assert_eq!(Color::rgb(255, 0, 0).to_rgb565(), 0xF800);
        assert_eq!(Color::rgb(0, 255, 0).to_rgb565(), 0x07E0);
        assert_eq!(Color::rgb(0, 0, 255).to_rgb565(), 0x001F);
    }

    #[test]
    fn brightness_boundaries() {
        let c = Color::RED;
        assert_eq!(c.brightness(0.0), c);
        assert_eq!(c.brightness(-1.0), Color::rgb(0, 0, 0));
        assert_eq!(c.brightness(1.0), Color::rgb(255, 255, 255));
        // clamped
        assert_eq!(c.brightness(-7.0), Color::rgb(0, 0, 0));
        assert_eq!(c.brightness(3.0), Color::rgb(255, 255, 255));
    }

    #[test]
    fn brightness_half_steps() {
        let c = Color::rgb(100, 200, 0);
        assert_eq!(c.brightness(-0.5), Color::rgb(50, 100, 0));
        // 100 + 155 * 0.5 = 177.5, 200 + 55 * 0.5 = 227.5, 0 + 255 * 0.5 = 127.5
        assert_eq!(c.brightness(0.5), Color::rgb(177, 227, 127));
    }

    #[test]
    fn brightness_keeps_alpha() {
        let c = Color { r: 10, g: 20, b: 30, a: 7 };
        assert_eq!(c.brightness(-0.25).a, 7);
    }
}
