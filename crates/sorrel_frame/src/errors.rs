use crate::datatype::DataType;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("index {idx} out of range for axis of length {len}")]
    IndexOutOfRange { idx: usize, len: usize },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: DataType, got: DataType },

    #[error("expected length {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("name not found: {0}")]
    NameNotFound(String),

    #[error("row slot {col} has not been set")]
    IncompleteRow { col: usize },

    #[error("unknown type tag: {0:?}")]
    UnknownTypeTag(char),

    #[error("traversal slice {slice} failed: {source}")]
    SliceFailure {
        slice: usize,
        source: Box<FrameError>,
    },
}

pub type Result<T, E = FrameError> = std::result::Result<T, E>;
