//! Collaborators the frame loop talks to: a display that takes finished frames,
//! a source of logical controls, and a frame timer.

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use crate::color::Color;
use crate::config::{MAX_FRAME_DT, MAX_TRANSFER_SIZE};
use crate::error::{EngineError, EngineResult};
use crate::framebuffer::Framebuffer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    RotateLeft,
    RotateRight,
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
}

pub trait ControlSource {
    fn is_active(&self, control: Control) -> bool;
}

pub trait Display {
    /// Push a finished frame to the physical (or virtual) panel.
    fn present(&mut self, frame: &Framebuffer) -> EngineResult<()>;
}

pub trait FrameTimer {
    /// Seconds since the previous call; the first call returns 0.
    fn frame_time(&mut self) -> f32;
    fn set_target_interval(&mut self, interval: Option<Duration>);
    /// Sleep out whatever is left of the target interval for this frame.
    fn pace(&mut self);
}

/// Controls currently held, fed from key press/release events.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    held: HashSet<Control>,
}

impl KeyState {
    pub fn press(&mut self, control: Control) {
        self.held.insert(control);
    }

    pub fn release(&mut self, control: Control) {
        self.held.remove(&control);
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl FromIterator<Control> for KeyState {
    fn from_iter<T: IntoIterator<Item = Control>>(iter: T) -> Self {
        Self {
            held: iter.into_iter().collect(),
        }
    }
}

impl ControlSource for KeyState {
    fn is_active(&self, control: Control) -> bool {
        self.held.contains(&control)
    }
}

/// Two physical buttons, as found on small dev boards.
///
/// Each button alone turns; holding both walks forward. While both are held
/// the two turns are also active and cancel out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonPad {
    pub left: bool,
    pub right: bool,
}

impl ControlSource for ButtonPad {
    fn is_active(&self, control: Control) -> bool {
        match control {
            Control::RotateLeft => self.left,
            Control::RotateRight => self.right,
            Control::MoveForward => self.left && self.right,
            _ => false,
        }
    }
}

/// What is left of `target` after `elapsed`, floored at zero.
#[inline]
pub fn remaining_budget(target: Duration, elapsed: Duration) -> Duration {
    target.saturating_sub(elapsed)
}

/// Monotonic wall clock with best-effort frame pacing.
pub struct FrameClock {
    last_tick: Option<Instant>,
    frame_start: Instant,
    target: Option<Duration>,
}

impl FrameClock {
    pub fn new(target: Option<Duration>) -> Self {
        Self {
            last_tick: None,
            frame_start: Instant::now(),
            target,
        }
    }
}

impl FrameTimer for FrameClock {
    fn frame_time(&mut self) -> f32 {
        let now = Instant::now();
        self.frame_start = now;
        let Some(last) = self.last_tick.replace(now) else {
            return 0.0;
        };
        // cap to avoid huge jumps if the loop was stalled
        now.duration_since(last).min(MAX_FRAME_DT).as_secs_f32()
    }

    fn set_target_interval(&mut self, interval: Option<Duration>) {
        self.target = interval;
    }

    fn pace(&mut self) {
        if let Some(target) = self.target {
            let sleep = remaining_budget(target, self.frame_start.elapsed());
            if !sleep.is_zero() {
                thread::sleep(sleep);
            }
        }
    }
}

/// In-memory RGB565 panel. Frames are packed high byte first, the order an
/// ST7789-style controller expects over SPI, into one transfer buffer.
pub struct Rgb565Panel {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
    frames: u64,
}

impl Rgb565Panel {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bytes: vec![0; width * height * 2],
            frames: 0,
        }
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    /// The transfer buffer split into bus-sized pieces.
    pub fn transfer_chunks(&self, max_transfer: usize) -> impl Iterator<Item = &[u8]> {
        self.bytes.chunks(max_transfer.max(1))
    }

    pub fn default_chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.transfer_chunks(MAX_TRANSFER_SIZE)
    }

    /// Pixel readback, decoded from the packed buffer.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 2;
        Some(u16::from_be_bytes([self.bytes[i], self.bytes[i + 1]]))
    }
}

impl Display for Rgb565Panel {
    fn present(&mut self, frame: &Framebuffer) -> EngineResult<()> {
        let expected = self.width * self.height;
        let actual = frame.width() * frame.height();
        if frame.width() != self.width || frame.height() != self.height {
            return Err(EngineError::FrameSize { expected, actual });
        }
        for (out, &px) in self.bytes.chunks_exact_mut(2).zip(frame.pixels()) {
            out.copy_from_slice(&Color::from_xrgb8888(px).to_rgb565().to_be_bytes());
        }
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_pad_combinations() {
        let pad = ButtonPad { left: true, right: false };
        assert!(pad.is_active(Control::RotateLeft));
        assert!(!pad.is_active(Control::MoveForward));

        let both = ButtonPad { left: true, right: true };
        assert!(both.is_active(Control::MoveForward));
        assert!(both.is_active(Control::RotateLeft));
        assert!(both.is_active(Control::RotateRight));
        assert!(!both.is_active(Control::StrafeLeft));
    }

    #[test]
    fn key_state_press_release() {
        let mut keys = KeyState::default();
        keys.press(Control::StrafeLeft);
        assert!(keys.is_active(Control::StrafeLeft));
        keys.release(Control::StrafeLeft);
        assert!(!keys.is_active(Control::StrafeLeft));
    }

    #[test]
    fn budget_floors_at_zero() {
        let target = Duration::from_millis(33);
        assert_eq!(remaining_budget(target, Duration::from_millis(10)), Duration::from_millis(23));
        assert_eq!(remaining_budget(target, Duration::from_millis(50)), Duration::ZERO);
    }

    #[test]
    fn clock_first_frame_is_zero() {
        let mut clock = FrameClock::new(None);
        assert_eq!(clock.frame_time(), 0.0);
        thread::sleep(Duration::from_millis(2));
        let dt = clock.frame_time();
        assert!(dt > 0.0 && dt <= MAX_FRAME_DT.as_secs_f32());
    }

    #[test]
    fn panel_packs_big_endian_rgb565() {
        let mut fb = Framebuffer::new(3, 2).unwrap();
        fb.clear(Color::BLACK);
        fb.fill_rect(0, 0, 1, 1, Color::rgb(255, 0, 0));
        let mut panel = Rgb565Panel::new(3, 2);
        panel.present(&fb).unwrap();
        assert_eq!(&panel.bytes()[..2], &[0xF8, 0x00]);
        assert_eq!(panel.pixel(0, 0), Some(0xF800));
        assert_eq!(panel.pixel(1, 0), Some(0));
        assert_eq!(panel.frames_presented(), 1);
    }

    #[test]
    fn panel_rejects_wrong_size() {
        let fb = Framebuffer::new(4, 4).unwrap();
        let mut panel = Rgb565Panel::new(3, 2);
        assert!(matches!(
            panel.present(&fb),
            Err(EngineError::FrameSize { expected: 6, actual: 16 })
        ));
    }

    #[test]
    fn transfer_chunks_cover_buffer() {
        let panel = Rgb565Panel::new(240, 140);
        let sizes: Vec<usize> = panel.default_chunks().map(<[u8]>::len).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 240 * 140 * 2);
        assert!(sizes.iter().all(|&s| s <= MAX_TRANSFER_SIZE));
        assert_eq!(sizes.len(), 2);
    }
}
