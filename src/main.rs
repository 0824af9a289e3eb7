use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::config::stride_for_resolution;
use grid_raycaster::scaler::ScaleLut;
use grid_raycaster::{
    ButtonPad, Control, Display, EngineError, EngineResult, FrameClock, FrameTimer, Framebuffer, Game, GameConfig,
    Grid, KeyState, Player, Preset, Rgb565Panel,
};

/// Grid raycaster: a first-person view of a 2D map, one ray per screen strip.
#[derive(Parser, Debug)]
#[command(name = "grid_raycaster", version)]
struct Args {
    /// Screen size, frame rate and speeds to start from
    #[arg(long, value_enum, default_value_t = Preset::Desktop)]
    preset: Preset,

    /// Horizontal field of view in degrees
    #[arg(long)]
    fov_deg: Option<f32>,

    /// Target frames per second (0 disables pacing)
    #[arg(long)]
    fps: Option<u32>,

    /// Pixel width of each cast strip
    #[arg(long, conflicts_with = "ray_res")]
    stride: Option<usize>,

    /// Angle between neighbouring rays, in radians
    #[arg(long)]
    ray_res: Option<f32>,

    /// Maximum render distance in grid cells, at most 1024
    #[arg(long)]
    max_dist: Option<f32>,

    /// Force the debug minimap on
    #[arg(long, conflicts_with = "no_minimap")]
    minimap: bool,

    /// Force the debug minimap off
    #[arg(long)]
    no_minimap: bool,

    /// Cast columns on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Render into an in-memory RGB565 panel instead of a window
    #[arg(long)]
    headless: bool,

    /// Stop headless mode after this many frames (runs forever if omitted)
    #[arg(long, requires = "headless")]
    frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn game_config(&self) -> EngineResult<GameConfig> {
        let mut cfg = GameConfig::from_preset(self.preset);
        if let Some(deg) = self.fov_deg {
            cfg.fov = deg.to_radians();
        }
        if let Some(fps) = self.fps {
            cfg.target_fps = Some(fps);
        }
        if let Some(res) = self.ray_res {
            cfg.column_stride = stride_for_resolution(cfg.screen_w, cfg.fov, res);
        }
        if let Some(stride) = self.stride {
            cfg.column_stride = stride;
        }
        if let Some(dist) = self.max_dist {
            cfg.max_render_dist = dist;
        }
        if self.minimap {
            cfg.minimap = true;
        }
        if self.no_minimap {
            cfg.minimap = false;
        }
        cfg.parallel = self.parallel;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn control_for_key(code: KeyCode) -> Option<Control> {
    match code {
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(Control::RotateLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(Control::RotateRight),
        KeyCode::KeyW | KeyCode::ArrowUp => Some(Control::MoveForward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(Control::MoveBackward),
        KeyCode::KeyQ => Some(Control::StrafeLeft),
        KeyCode::KeyE => Some(Control::StrafeRight),
        _ => None,
    }
}

/// Window surface that stretches the internal framebuffer to the window size.
struct WindowDisplay {
    window: Rc<Window>,
    surface: softbuffer::Surface<Rc<Window>, Rc<Window>>,
    lut: ScaleLut,
}

impl Display for WindowDisplay {
    fn present(&mut self, frame: &Framebuffer) -> EngineResult<()> {
        let size = self.window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            return Ok(()); // minimized
        };
        let (dw, dh) = (size.width as usize, size.height as usize);

        self.surface
            .resize(w, h)
            .map_err(|e| EngineError::Display(e.to_string()))?;
        if !self.lut.fits(dw, dh) {
            debug!("rebuilding scale table for {dw}x{dh}");
            self.lut = ScaleLut::new(dw, dh, frame.width(), frame.height());
        }

        let mut buf = self
            .surface
            .buffer_mut()
            .map_err(|e| EngineError::Display(e.to_string()))?;
        self.lut.blit(&mut buf, frame);
        buf.present().map_err(|e| EngineError::Display(e.to_string()))
    }
}

struct App {
    game: Game,
    display: Option<WindowDisplay>,
    error: Option<EngineError>,

    keys: KeyState,
    clock: FrameClock,
    frame_interval: Option<Duration>,
    next_frame: Option<Instant>,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
}

impl App {
    fn new(game: Game) -> Self {
        let frame_interval = game.config().target_interval();
        Self {
            game,
            display: None,
            error: None,
            keys: KeyState::default(),
            clock: FrameClock::new(None),
            frame_interval,
            next_frame: None,
            frame_counter: 0,
            last_fps_print: Instant::now(),
        }
    }

    fn open_display(&self, event_loop: &ActiveEventLoop) -> EngineResult<WindowDisplay> {
        let cfg = self.game.config();
        let attributes = Window::default_attributes()
            .with_title("Grid Raycaster")
            .with_inner_size(LogicalSize::new(cfg.screen_w as f64, cfg.screen_h as f64));
        let window = Rc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| EngineError::Display(e.to_string()))?,
        );
        let context = softbuffer::Context::new(window.clone()).map_err(|e| EngineError::Display(e.to_string()))?;
        let surface =
            softbuffer::Surface::new(&context, window.clone()).map_err(|e| EngineError::Display(e.to_string()))?;
        Ok(WindowDisplay {
            window,
            surface,
            lut: ScaleLut::default(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: EngineError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self) -> EngineResult<()> {
        let Some(display) = self.display.as_mut() else {
            warn!("redraw requested before the window exists");
            return Ok(());
        };

        let dt = self.clock.frame_time();
        let frame_start = Instant::now();
        self.game.advance(display, &self.keys, dt)?;

        self.next_frame = self.frame_interval.map(|interval| frame_start + interval);

        self.frame_counter += 1;
        let now = Instant::now();
        let since = now.duration_since(self.last_fps_print).as_secs_f32();
        if since >= 1.0 {
            debug!("FPS: {:.1}", self.frame_counter as f32 / since);
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() {
            return;
        }
        match self.open_display(event_loop) {
            Ok(display) => {
                display.window.request_redraw();
                self.display = Some(display);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event: KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state,
                    ..
                },
                ..
            } => {
                if code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                if let Some(control) = control_for_key(code) {
                    match state {
                        ElementState::Pressed => self.keys.press(control),
                        ElementState::Released => self.keys.release(control),
                    }
                }
            }

            WindowEvent::Focused(false) => self.keys.clear(),

            WindowEvent::RedrawRequested => {
                if self.display.as_ref().is_some_and(|d| d.window.id() == id) {
                    if let Err(e) = self.redraw() {
                        self.fail(event_loop, e);
                    }
                }
            }

            WindowEvent::Resized(size) => debug!("resized to {}x{}", size.width, size.height),

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(display) = &self.display else {
            return;
        };
        match self.next_frame {
            Some(at) if Instant::now() < at => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            _ => {
                event_loop.set_control_flow(ControlFlow::Wait);
                display.window.request_redraw();
            }
        }
    }
}

fn run_window(game: Game) -> EngineResult<()> {
    let event_loop = EventLoop::new().map_err(|e| EngineError::Display(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(game);
    event_loop
        .run_app(&mut app)
        .map_err(|e| EngineError::Display(e.to_string()))?;
    app.error.map_or(Ok(()), Err)
}

fn run_headless(mut game: Game, frames: Option<u64>) -> EngineResult<()> {
    let cfg = game.config().clone();
    let mut panel = Rgb565Panel::new(cfg.screen_w, cfg.screen_h);
    let mut clock = FrameClock::new(None);
    let pad = ButtonPad::default();

    let Some(frames) = frames else {
        info!("running headless until interrupted");
        match game.run(&mut panel, &pad, &mut clock)? {}
    };

    clock.set_target_interval(cfg.target_interval());
    for _ in 0..frames {
        game.frame(&mut panel, &pad, &mut clock)?;
    }
    let checksum = panel
        .bytes()
        .iter()
        .fold(0u32, |acc, &b| acc.rotate_left(5) ^ b as u32);
    info!(
        "presented {} frames, {} transfers each, checksum {checksum:08x}",
        panel.frames_presented(),
        panel.default_chunks().count()
    );
    Ok(())
}

fn main() -> EngineResult<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str())).init();

    let cfg = args.game_config()?;
    info!(
        "grid_raycaster v{} preset {:?}: {}x{}, stride {}, fov {:.1} deg",
        grid_raycaster::VERSION,
        args.preset,
        cfg.screen_w,
        cfg.screen_h,
        cfg.column_stride,
        cfg.fov.to_degrees()
    );

    let game = Game::new(Grid::demo(), Player::default(), cfg)?;
    if args.headless {
        run_headless(game, args.frames)
    } else {
        run_window(game)
    }
}
