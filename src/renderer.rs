use rayon::iter::{IndexedParallelIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::color::Color;
use crate::config::GameConfig;
use crate::framebuffer::Framebuffer;
use crate::math::rotate;
use crate::player::Player;
use crate::raycaster::{RayHit, RayParams, cast};
use crate::world::{Cell, Grid, resolve, sample_texture};

/// Vertical placement and shading of one wall strip, before clipping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub top: f32,
    pub height: f32,
    /// Brightness factor, always `<= 0`.
    pub shade: f32,
}

/// A strip ready to be written: `stride` pixels wide starting at `x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSlice {
    pub x: usize,
    pub top: i32,
    pub height: i32,
    pub color: Color,
    /// World position the strip's ray struck.
    pub hit_point: [f32; 2],
}

/// Ray angle, relative to the facing direction, for the strip starting at `x`.
/// Sampled at the strip center so the middle of the screen looks straight ahead.
#[inline]
pub fn column_angle(x: usize, cfg: &GameConfig) -> f32 {
    let center = x as f32 + cfg.column_stride as f32 * 0.5;
    -cfg.fov * 0.5 + cfg.fov * center / cfg.screen_w as f32
}

/// Inverse-distance projection of a wall at perpendicular distance `perp`.
///
/// The distance is divided by the aspect ratio first so horizontal and vertical
/// units agree. Returns `None` for walls at or behind the eye.
pub fn project(perp: f32, cfg: &GameConfig) -> Option<Projection> {
    let dist = perp / cfg.aspect_ratio();
    if !(dist > 0.0 && dist.is_finite()) {
        return None;
    }
    let screen_h = cfg.screen_h as f32;
    let height = screen_h / dist;
    Some(Projection {
        top: (screen_h - height) * 0.5,
        height,
        shade: (1.0 / dist - cfg.shade_bias).min(0.0),
    })
}

/// Unshaded color of the struck face.
pub fn face_color(hit: &RayHit) -> Color {
    match resolve(hit.cell) {
        Cell::Color(color) => color,
        Cell::Texture(texture) => sample_texture(texture, hit.wall_u),
        // Empty never produces a hit
        Cell::Unassigned(_) | Cell::Empty => Color::MAGENTA,
    }
}

/// Cast and shade the strip starting at screen column `x`.
pub fn cast_column(x: usize, grid: &Grid, player: &Player, cfg: &GameConfig, params: &RayParams) -> Option<ColumnSlice> {
    let dir = rotate(player.dir, column_angle(x, cfg));
    let hit = cast(grid, player.pos, dir, player.dir, params)?;
    let proj = project(hit.perp_dist, cfg)?;
    Some(ColumnSlice {
        x,
        top: proj.top as i32,
        height: proj.height as i32,
        color: face_color(&hit).brightness(proj.shade),
        hit_point: hit.point,
    })
}

/// Casts every strip of the screen and draws the hits. Columns without a hit
/// keep whatever the framebuffer already holds.
#[derive(Default)]
pub struct ColumnRenderer {
    slots: Vec<Option<ColumnSlice>>,
}

impl ColumnRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, fb: &mut Framebuffer, grid: &Grid, player: &Player, cfg: &GameConfig) {
        let stride = cfg.column_stride.max(1);
        let strips = cfg.screen_w.div_ceil(stride);
        let params = RayParams::from(cfg);

        self.slots.clear();
        self.slots.resize(strips, None);

        // casts are independent per column; only the writes below touch the frame
        if cfg.parallel {
            self.slots.par_iter_mut().enumerate().for_each(|(i, slot)| {
                *slot = cast_column(i * stride, grid, player, cfg, &params);
            });
        } else {
            for (i, slot) in self.slots.iter_mut().enumerate() {
                *slot = cast_column(i * stride, grid, player, cfg, &params);
            }
        }

        for slice in self.slots.iter().flatten() {
            fb.fill_rect(slice.x as i32, slice.top, stride as i32, slice.height, slice.color);
        }
    }

    /// Strips from the last `render`, left to right.
    pub fn last_slices(&self) -> &[Option<ColumnSlice>] {
        &self.slots
    }
}

/// Clear to the configured background and draw every column.
pub fn render_frame(fb: &mut Framebuffer, grid: &Grid, player: &Player, cfg: &GameConfig) {
    fb.clear(cfg.clear_color);
    ColumnRenderer::new().render(fb, grid, player, cfg);
}
