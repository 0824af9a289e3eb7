use std::f32::consts::FRAC_PI_2;

use crate::math::{add, normalize, rotate, scale};
use crate::platform::{Control, ControlSource};

/// Player pose in grid units. `dir` is kept unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub pos: [f32; 2],
    pub dir: [f32; 2],
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: [2.5, 1.3],
            dir: [1.0, 0.0],
        }
    }
}

impl Player {
    pub fn new(pos: [f32; 2], dir: [f32; 2]) -> Self {
        Self {
            pos,
            dir: normalize(dir),
        }
    }

    #[inline]
    pub fn rotate(&mut self, angle: f32) {
        // renormalize so repeated small turns don't drift the length
        self.dir = normalize(rotate(self.dir, angle));
    }

    #[inline]
    pub fn translate(&mut self, along: [f32; 2], distance: f32) {
        self.pos = add(self.pos, scale(along, distance));
    }

    /// Integrate one frame of input. Controls are not mutually exclusive: every
    /// active one is applied in turn, so opposing controls cancel out.
    pub fn apply_controls(&mut self, controls: &impl ControlSource, dt: f32, move_speed: f32, rotation_speed: f32) {
        let turn = dt * rotation_speed;
        let step = dt * move_speed;

        if controls.is_active(Control::RotateLeft) {
            self.rotate(-turn);
        }
        if controls.is_active(Control::RotateRight) {
            self.rotate(turn);
        }
        if controls.is_active(Control::MoveForward) {
            self.translate(self.dir, step);
        }
        if controls.is_active(Control::MoveBackward) {
            self.translate(self.dir, -step);
        }
        if controls.is_active(Control::StrafeRight) {
            self.translate(rotate(self.dir, FRAC_PI_2), step);
        }
        if controls.is_active(Control::StrafeLeft) {
            self.translate(rotate(self.dir, -FRAC_PI_2), step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::length;
    use crate::platform::KeyState;

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    #[test]
    fn forward_and_back_cancel() {
        let mut p = Player::default();
        let keys = KeyState::from_iter([Control::MoveForward, Control::MoveBackward]);
        p.apply_controls(&keys, 0.5, 4.0, 2.0);
        assert!(close(p.pos, [2.5, 1.3]));
    }

    #[test]
    fn forward_moves_along_dir() {
        let mut p = Player::new([1.0, 1.0], [0.0, 1.0]);
        let keys = KeyState::from_iter([Control::MoveForward]);
        p.apply_controls(&keys, 0.25, 4.0, 2.0);
        assert!(close(p.pos, [1.0, 2.0]));
    }

    #[test]
    fn strafe_right_is_clockwise_of_facing() {
        // facing +x with +y down the screen, right hand points to +y
        let mut p = Player::new([0.0, 0.0], [1.0, 0.0]);
        p.apply_controls(&KeyState::from_iter([Control::StrafeRight]), 1.0, 1.0, 0.0);
        assert!(close(p.pos, [0.0, 1.0]));
        p.apply_controls(&KeyState::from_iter([Control::StrafeLeft]), 2.0, 1.0, 0.0);
        assert!(close(p.pos, [0.0, -1.0]));
    }

    #[test]
    fn rotation_keeps_unit_direction() {
        let mut p = Player::default();
        let keys = KeyState::from_iter([Control::RotateRight]);
        for _ in 0..10_000 {
            p.apply_controls(&keys, 0.016, 4.0, 2.0);
        }
        assert!((length(p.dir) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotate_left_then_right_returns() {
        let mut p = Player::default();
        p.apply_controls(&KeyState::from_iter([Control::RotateLeft]), 0.3, 0.0, 2.0);
        assert!(p.dir[1] < 0.0);
        p.apply_controls(&KeyState::from_iter([Control::RotateRight]), 0.3, 0.0, 2.0);
        assert!(close(p.dir, [1.0, 0.0]));
    }

    #[test]
    fn no_controls_no_change() {
        let mut p = Player::default();
        p.apply_controls(&KeyState::default(), 1.0, 4.0, 2.0);
        assert_eq!(p, Player::default());
    }
}
