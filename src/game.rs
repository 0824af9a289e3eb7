use std::convert::Infallible;

use crate::config::GameConfig;
use crate::error::EngineResult;
use crate::framebuffer::Framebuffer;
use crate::minimap::draw_minimap;
use crate::platform::{ControlSource, Display, FrameTimer};
use crate::player::Player;
use crate::renderer::ColumnRenderer;
use crate::world::Grid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Between frames.
    Running,
    /// Between `begin_frame` and the frame being presented.
    InProgress,
}

/// Owns everything one frame touches: level, pose, framebuffer and config.
pub struct Game {
    pub grid: Grid,
    pub player: Player,
    config: GameConfig,
    framebuffer: Framebuffer,
    columns: ColumnRenderer,
    state: FrameState,
}

impl Game {
    pub fn new(grid: Grid, player: Player, config: GameConfig) -> EngineResult<Self> {
        config.validate()?;
        let framebuffer = Framebuffer::new(config.screen_w, config.screen_h)?;
        Ok(Self {
            grid,
            player,
            config,
            framebuffer,
            columns: ColumnRenderer::new(),
            state: FrameState::Running,
        })
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Integrate controls over `dt` seconds.
    pub fn update(&mut self, controls: &impl ControlSource, dt: f32) {
        self.player
            .apply_controls(controls, dt, self.config.move_speed, self.config.rotation_speed);
    }

    pub fn begin_frame(&mut self) {
        debug_assert_eq!(self.state, FrameState::Running, "frame already in progress");
        self.state = FrameState::InProgress;
    }

    pub fn end_frame(&mut self) {
        debug_assert_eq!(self.state, FrameState::InProgress, "no frame in progress");
        self.state = FrameState::Running;
    }

    /// Clear, cast every column, then overlay the minimap if enabled.
    pub fn render(&mut self) {
        self.framebuffer.clear(self.config.clear_color);
        self.columns
            .render(&mut self.framebuffer, &self.grid, &self.player, &self.config);
        if self.config.minimap {
            let hits = self.columns.last_slices().iter().flatten().map(|s| s.hit_point);
            draw_minimap(
                &mut self.framebuffer,
                &self.grid,
                &self.player,
                self.config.minimap_cell_px,
                hits,
            );
        }
    }

    /// Move by `dt` seconds, draw, and hand the frame to `display`. The frame
    /// is closed even when presenting fails.
    pub fn advance(
        &mut self,
        display: &mut impl Display,
        controls: &impl ControlSource,
        dt: f32,
    ) -> EngineResult<()> {
        self.update(controls, dt);
        self.begin_frame();
        self.render();
        let presented = display.present(&self.framebuffer);
        self.end_frame();
        presented
    }

    /// One full iteration: sample time, move, draw, present, pace.
    pub fn frame(
        &mut self,
        display: &mut impl Display,
        controls: &impl ControlSource,
        timer: &mut impl FrameTimer,
    ) -> EngineResult<()> {
        let dt = timer.frame_time();
        self.advance(display, controls, dt)?;
        timer.pace();
        Ok(())
    }

    /// Run frames forever. Only returns if a collaborator fails.
    pub fn run(
        &mut self,
        display: &mut impl Display,
        controls: &impl ControlSource,
        timer: &mut impl FrameTimer,
    ) -> EngineResult<Infallible> {
        timer.set_target_interval(self.config.target_interval());
        loop {
            self.frame(display, controls, timer)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;
    use crate::color::Color;
    use crate::error::EngineError;
    use crate::platform::KeyState;

    struct FlakyDisplay {
        presented: usize,
        fail: bool,
    }

    impl Display for FlakyDisplay {
        fn present(&mut self, _frame: &Framebuffer) -> EngineResult<()> {
            if self.fail {
                return Err(EngineError::Display("busy".to_string()));
            }
            self.presented += 1;
            Ok(())
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = GameConfig::from_preset(Preset::Embedded);
        cfg.column_stride = 0;
        assert!(Game::new(Grid::demo(), Player::default(), cfg).is_err());
    }

    #[test]
    fn state_cycles_through_frame() {
        let mut game = Game::new(Grid::demo(), Player::default(), GameConfig::from_preset(Preset::Embedded)).unwrap();
        assert_eq!(game.state(), FrameState::Running);
        game.begin_frame();
        assert_eq!(game.state(), FrameState::InProgress);
        game.end_frame();
        assert_eq!(game.state(), FrameState::Running);
    }

    #[test]
    fn update_uses_configured_speeds() {
        let mut cfg = GameConfig::from_preset(Preset::Embedded);
        cfg.move_speed = 2.0;
        let mut game = Game::new(Grid::demo(), Player::new([1.0, 1.0], [1.0, 0.0]), cfg).unwrap();
        game.update(&KeyState::from_iter([crate::platform::Control::MoveForward]), 0.5);
        assert!((game.player.pos[0] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn advance_closes_the_frame_on_failure() {
        let mut game = Game::new(Grid::demo(), Player::default(), GameConfig::from_preset(Preset::Embedded)).unwrap();
        let keys = KeyState::from_iter([crate::platform::Control::MoveForward]);

        let mut display = FlakyDisplay { presented: 0, fail: false };
        game.advance(&mut display, &keys, 0.1).unwrap();
        assert_eq!(display.presented, 1);
        assert!((game.player.pos[0] - 2.9).abs() < 1e-5);

        display.fail = true;
        assert!(game.advance(&mut display, &keys, 0.1).is_err());
        assert_eq!(game.state(), FrameState::Running);
        assert_eq!(display.presented, 1);
    }

    #[test]
    fn minimap_marks_where_columns_hit() {
        let mut cfg = GameConfig::from_preset(Preset::Desktop);
        cfg.minimap_cell_px = 20;
        let mut game = Game::new(Grid::demo(), Player::default(), cfg).unwrap();
        game.render();

        let slices: Vec<_> = game.columns.last_slices().iter().flatten().copied().collect();
        assert!(!slices.is_empty());
        for slice in slices {
            let x = (slice.hit_point[0] * 20.0) as usize;
            let y = (slice.hit_point[1] * 20.0) as usize;
            assert_eq!(game.framebuffer().pixel(x, y), Some(Color::BLUE), "hit {:?}", slice.hit_point);
        }
    }
}
