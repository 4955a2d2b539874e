//! Error type for `capstone-store-sqlite`.

use capstone_core::{ErrorCode, error::Classify};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] capstone_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// The write lock could not be taken before `busy_timeout` expired. No
  /// part of the operation was applied.
  #[error("storage timed out: {0}")]
  StorageTimeout(tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value is outside the range its column allows.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    if is_busy(&err) { Self::StorageTimeout(err) } else { Self::Database(err) }
  }
}

impl From<rusqlite::Error> for Error {
  fn from(err: rusqlite::Error) -> Self { tokio_rusqlite::Error::from(err).into() }
}

fn is_busy(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(failure, _))
      if matches!(
        failure.code,
        rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
      )
  )
}

impl Classify for Error {
  fn code(&self) -> ErrorCode {
    match self {
      Self::Core(err) => err.code(),
      Self::StorageTimeout(_) => ErrorCode::StorageTimeout,
      Self::Database(_) | Self::Uuid(_) | Self::DateParse(_) | Self::Corrupt(_) => {
        ErrorCode::Internal
      }
    }
  }
}
