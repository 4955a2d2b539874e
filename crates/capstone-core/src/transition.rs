//! The legal-transition graph for [`TopicStatus`].
//!
//! Forward progress runs one way:
//!
//! ```text
//! Draft → Submitted → UnderReview → Approved → PendingRegistration
//!       → {Registered | Full} → AssignedDefense → Graded → Archived
//! ```
//!
//! with a handful of regression edges (resubmission after rejection,
//! pausing execution, and the capacity-driven seat edges). The graph knows
//! nothing about actors or seats.

use thiserror::Error;

use crate::status::TopicStatus;

/// Whether `current → target` is an edge of the graph.
///
/// Self-loops are never edges; see [`crate::lifecycle`] for how a request
/// to re-enter the current status is answered.
pub fn is_legal(current: TopicStatus, target: TopicStatus) -> bool {
  legal_targets(current).contains(&target)
}

/// Every status reachable from `current` in one manual step.
pub fn legal_targets(current: TopicStatus) -> &'static [TopicStatus] {
  use TopicStatus::*;

  match current {
    Draft => &[Submitted, Archived],
    Submitted => &[UnderReview, Draft],
    UnderReview => &[Approved, Rejected],
    Approved => &[PendingRegistration, Archived],
    Rejected => &[Draft, Archived],
    PendingRegistration => &[Registered, Full],
    Registered => &[Full, PendingRegistration, InProgress, AssignedDefense],
    Full => &[Registered, InProgress, AssignedDefense],
    Paused => &[InProgress],
    InProgress => &[Paused, Delayed, AwaitingEvaluation],
    Delayed => &[InProgress, AwaitingEvaluation],
    AwaitingEvaluation => &[AssignedDefense],
    AssignedDefense => &[Graded],
    Graded => &[Archived],
    Archived => &[],
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a requested status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
  /// The topic is already in the requested status.
  #[error("{}", already_in_state_message(.0))]
  AlreadyInState(TopicStatus),

  /// The graph has no edge from `from` to `to`.
  #[error("cannot move a topic from {from} to {to}")]
  Illegal { from: TopicStatus, to: TopicStatus },
}

fn already_in_state_message(status: &TopicStatus) -> &'static str {
  use TopicStatus::*;

  match *status {
    Draft => "topic is already a draft",
    Submitted => "topic has already been submitted",
    UnderReview => "topic is already under review",
    Approved => "topic has already been approved",
    Rejected => "topic has already been rejected",
    PendingRegistration => "topic is already open for registration",
    Registered => "topic already has registered students",
    Full => "topic is already full",
    Paused => "topic is already paused",
    InProgress => "topic is already in progress",
    Delayed => "topic is already delayed",
    AwaitingEvaluation => "topic is already awaiting evaluation",
    AssignedDefense => "topic has already been assigned for defense",
    Graded => "topic has already been graded",
    Archived => "topic has already been archived",
  }
}
