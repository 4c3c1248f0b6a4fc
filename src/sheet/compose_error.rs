use super::layout::Dimensions;

/// Input validation failures. None of them are retryable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
  #[error("no frames were given")]
  EmptyInput,

  #[error(
    "frame {index} ({name}) has dimensions {actual}, expected {expected} like the first frame"
  )]
  DimensionMismatch {
    index: usize,
    name: String,
    expected: Dimensions,
    actual: Dimensions,
  },

  #[error("invalid layout: {0}")]
  InvalidLayout(String),
}
