//! Compile-time constants plus the runtime [`GameConfig`] built from a [`Preset`].

use std::f32::consts::PI;
use std::time::Duration;

use crate::color::Color;
use crate::error::{EngineError, EngineResult};

pub const COLS: usize = 10;
pub const ROWS: usize = 10;

pub const FOV: f32 = PI / 3.5;
/// In grid cells.
pub const MAX_RENDER_DIST: f32 = 20.0;
/// Largest accepted render distance. Each column walks at most
/// `2 * ceil(dist * sqrt(2)) + 2` cells, so this keeps a full frame bounded.
pub const MAX_RENDER_DIST_LIMIT: f32 = 1024.0;
/// Cells per second.
pub const PLAYER_SPEED: f32 = 4.0;
/// Shading offset: walls closer than `1 / SHADE_BIAS` (aspect-corrected) are not darkened.
pub const SHADE_BIAS: f32 = 0.75;

/// Substituted for a ray direction component that is exactly zero.
pub const DIRECTION_EPSILON: f32 = 1e-6;
/// First sample distance along the ray.
pub const RAY_START_OFFSET: f32 = 1e-3;

/// Frame deltas above this are clamped to avoid huge jumps after a stall.
pub const MAX_FRAME_DT: Duration = Duration::from_millis(100);
/// Largest single transfer to an SPI panel.
pub const MAX_TRANSFER_SIZE: usize = 65536;

pub const MINIMAP_CELL_PX: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// 800x600 window at 60 fps with the debug minimap.
    #[default]
    Desktop,
    /// 240x140 panel at 30 fps, tuned for a microcontroller.
    Embedded,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub screen_w: usize,
    pub screen_h: usize,
    pub fov: f32,
    pub max_render_dist: f32,
    /// Width in pixels of each cast strip.
    pub column_stride: usize,
    pub shade_bias: f32,
    pub clear_color: Color,
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub target_fps: Option<u32>,
    pub minimap: bool,
    pub minimap_cell_px: usize,
    pub parallel: bool,
    pub direction_epsilon: f32,
    pub ray_start_offset: f32,
}

impl GameConfig {
    pub fn from_preset(preset: Preset) -> Self {
        let (screen_w, screen_h, fps, ray_res, rotation_speed, minimap) = match preset {
            Preset::Desktop => (800, 600, 60, 0.005, 2.0, true),
            Preset::Embedded => (240, 140, 30, 0.008, 1.25, false),
        };
        Self {
            screen_w,
            screen_h,
            fov: FOV,
            max_render_dist: MAX_RENDER_DIST,
            column_stride: stride_for_resolution(screen_w, FOV, ray_res),
            shade_bias: SHADE_BIAS,
            clear_color: Color::BLACK,
            move_speed: PLAYER_SPEED,
            rotation_speed,
            target_fps: Some(fps),
            minimap,
            minimap_cell_px: MINIMAP_CELL_PX,
            parallel: false,
            direction_epsilon: DIRECTION_EPSILON,
            ray_start_offset: RAY_START_OFFSET,
        }
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.screen_w as f32 / self.screen_h as f32
    }

    pub fn target_interval(&self) -> Option<Duration> {
        self.target_fps
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
    }

    pub fn validate(&self) -> EngineResult<()> {
        let fail = |msg: String| Err(EngineError::InvalidConfig(msg));
        if self.screen_w == 0 || self.screen_h == 0 {
            return fail(format!("screen must be non-empty, got {}x{}", self.screen_w, self.screen_h));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return fail(format!("fov must be in (0, pi), got {}", self.fov));
        }
        if !(self.max_render_dist > 0.0 && self.max_render_dist <= MAX_RENDER_DIST_LIMIT) {
            return fail(format!(
                "max render distance must be in (0, {MAX_RENDER_DIST_LIMIT}], got {}",
                self.max_render_dist
            ));
        }
        if self.column_stride == 0 || self.column_stride > self.screen_w {
            return fail(format!(
                "column stride must be in 1..={}, got {}",
                self.screen_w, self.column_stride
            ));
        }
        if !(self.direction_epsilon > 0.0 && self.ray_start_offset > 0.0) {
            return fail("ray epsilons must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

/// Pixel width of each strip when rays are spaced `ray_res` radians apart.
pub fn stride_for_resolution(screen_w: usize, fov: f32, ray_res: f32) -> usize {
    let rays = fov / ray_res;
    ((screen_w as f32 / rays).round() as usize).max(1)
}
