use thiserror::Error;

/// Unified error type for the widgets and the playground host
#[derive(Error, Debug)]
pub enum BehaviorError {
    #[error("Frame number must be between 1 and {count}. Found: {frame}")]
    FrameOutOfRange { frame: u32, count: u32 },

    #[error("Sprite has no frames (frame size {frame}, sprite size {sprite})")]
    EmptySprite { frame: String, sprite: String },

    #[error("Sprite has too many frames to count (frame size {frame}, sprite size {sprite})")]
    SpriteTooLarge { frame: String, sprite: String },

    #[error("Input is empty")]
    EmptyInput,

    #[error("Duplicate switcher value: {0}")]
    DuplicateValue(String),

    #[error("Unknown switcher value: {0}")]
    UnknownValue(String),

    #[error("Unknown node: {0}")]
    UnknownNode(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
