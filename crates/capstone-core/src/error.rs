//! Error types for `capstone-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::transition::TransitionError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("topic not found: {0}")]
  TopicNotFound(Uuid),

  #[error("registration not found: {0}")]
  RegistrationNotFound(Uuid),

  #[error(transparent)]
  InvalidTransition(#[from] TransitionError),

  #[error("{user_id} already holds an active registration for topic {topic_id}")]
  AlreadyRegistered { topic_id: Uuid, user_id: Uuid },

  #[error("{user_id} holds no active registration for topic {topic_id}")]
  NotRegistered { topic_id: Uuid, user_id: Uuid },

  #[error("student {student_id} was rejected from topic {topic_id} and may not register again")]
  PreviouslyRejected { topic_id: Uuid, student_id: Uuid },

  #[error("student {student_id} already holds an active registration on another non-research topic")]
  OneActiveRegistrationPerCategory { student_id: Uuid },

  #[error("every seat on topic {0} has already been approved")]
  SlotFull(Uuid),

  #[error("topic {0} is full")]
  TopicFull(Uuid),

  #[error("topic {0} already has its supervisors")]
  LecturerSlotFull(Uuid),

  #[error("registration {0} is no longer pending")]
  RegistrationNotPending(Uuid),

  #[error("a topic needs at least one seat, got {0}")]
  InvalidCapacity(u32),

  #[error("unknown {kind}: {value:?}")]
  UnknownVariant { kind: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Stable, machine-readable identifier for a failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
  NotFound,
  InvalidTransition,
  AlreadyRegistered,
  PreviouslyRejected,
  OneActiveRegistrationPerCategory,
  SlotFull,
  TopicFull,
  LecturerSlotFull,
  RegistrationNotPending,
  InvalidCapacity,
  /// The only class worth retrying upstream.
  StorageTimeout,
  Internal,
}

/// Implemented by every error type a [`crate::store::TopicStore`] can return
/// so that outer layers can react to the failure class without knowing the
/// backend.
pub trait Classify {
  fn code(&self) -> ErrorCode;
}

impl Classify for Error {
  fn code(&self) -> ErrorCode {
    match self {
      Self::TopicNotFound(_) | Self::RegistrationNotFound(_) | Self::NotRegistered { .. } => {
        ErrorCode::NotFound
      }
      Self::InvalidTransition(_) => ErrorCode::InvalidTransition,
      Self::AlreadyRegistered { .. } => ErrorCode::AlreadyRegistered,
      Self::PreviouslyRejected { .. } => ErrorCode::PreviouslyRejected,
      Self::OneActiveRegistrationPerCategory { .. } => {
        ErrorCode::OneActiveRegistrationPerCategory
      }
      Self::SlotFull(_) => ErrorCode::SlotFull,
      Self::TopicFull(_) => ErrorCode::TopicFull,
      Self::LecturerSlotFull(_) => ErrorCode::LecturerSlotFull,
      Self::RegistrationNotPending(_) => ErrorCode::RegistrationNotPending,
      Self::InvalidCapacity(_) => ErrorCode::InvalidCapacity,
      Self::UnknownVariant { .. } => ErrorCode::Internal,
    }
  }
}
