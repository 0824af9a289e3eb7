//! Grid-DDA raycaster for small displays.
//!
//! One ray is cast per screen strip against a fixed occupancy [`Grid`]; each hit
//! becomes a shaded vertical strip in a [`Framebuffer`], which a [`Display`]
//! collaborator then pushes to a window or panel.

pub mod color;
pub mod config;
pub mod error;
pub mod framebuffer;
pub mod game;
pub mod math;
pub mod minimap;
pub mod platform;
pub mod player;
pub mod raycaster;
pub mod renderer;
pub mod scaler;
pub mod world;

pub use color::Color;
pub use config::{GameConfig, Preset};
pub use error::{EngineError, EngineResult};
pub use framebuffer::Framebuffer;
pub use game::{FrameState, Game};
pub use platform::{ButtonPad, Control, ControlSource, Display, FrameClock, FrameTimer, KeyState, Rgb565Panel};
pub use player::Player;
pub use raycaster::{March, RayHit, RayParams, Side};
pub use world::{Cell, CellId, Grid};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
