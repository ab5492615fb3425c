use std::fmt;
use std::io;


/// Errors produced anywhere in the classification pipeline.

#[derive(Debug)]
pub enum Error {
  /// The tensor library rejected an operation, usually a shape mismatch.
  Tensor(candle_core::Error),

  /// A model snapshot could not be encoded or decoded.
  Serialize(postcard::Error),

  /// Reading or writing a snapshot file failed.
  Io(io::Error),

  /// Configuration values are out of range.
  Config(String),

  /// Raw samples and labels don't describe a valid dataset.
  Data(String),

  /// Training produced a non-finite loss.
  Diverged { epoch: usize, loss: f32 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Tensor(err) => write!(f, "tensor operation failed: {err}"),
      Error::Serialize(err) => write!(f, "model snapshot is malformed: {err}"),
      Error::Io(err) => write!(f, "i/o error: {err}"),
      Error::Config(msg) => write!(f, "invalid configuration: {msg}"),
      Error::Data(msg) => write!(f, "invalid dataset: {msg}"),
      Error::Diverged { epoch, loss } => write!(f, "training diverged in epoch {epoch} (loss {loss})"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Tensor(err) => Some(err),
      Error::Serialize(err) => Some(err),
      Error::Io(err) => Some(err),
      _ => None,
    }
  }
}

impl From<candle_core::Error> for Error {
  fn from(err: candle_core::Error) -> Self {
    Error::Tensor(err)
  }
}

impl From<postcard::Error> for Error {
  fn from(err: postcard::Error) -> Self {
    Error::Serialize(err)
  }
}

impl From<io::Error> for Error {
  fn from(err: io::Error) -> Self {
    Error::Io(err)
  }
}
