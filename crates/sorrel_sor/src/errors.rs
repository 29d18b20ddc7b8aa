use sorrel_frame::errors::FrameError;

#[derive(Debug, thiserror::Error)]
pub enum SorError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SorError> = std::result::Result<T, E>;
