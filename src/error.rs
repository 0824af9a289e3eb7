/// Errors surfaced by configuration, level authoring and the display collaborators.
///
/// The per-frame hot paths (ray marching, rectangle fills) never fail; everything
/// in here happens at startup or at the edge where a frame leaves the engine.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid level: {0}")]
    InvalidLevel(String),

    #[error("frame size mismatch: expected {expected} pixels, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("display error: {0}")]
    Display(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
