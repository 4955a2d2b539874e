//! Topic lifecycle states and academic period phases.
//!
//! Both enums round-trip through the snake_case strings stored in the
//! database and sent over the wire.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

// ─── TopicStatus ─────────────────────────────────────────────────────────────

/// Where a topic sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
  Draft,
  Submitted,
  UnderReview,
  Approved,
  Rejected,
  /// Open for student registration with no approved seat yet.
  PendingRegistration,
  /// At least one seat is taken, at least one is free.
  Registered,
  /// Every seat is taken.
  Full,
  Paused,
  InProgress,
  Delayed,
  AwaitingEvaluation,
  AssignedDefense,
  Graded,
  Archived,
}

impl TopicStatus {
  pub const ALL: [Self; 15] = [
    Self::Draft,
    Self::Submitted,
    Self::UnderReview,
    Self::Approved,
    Self::Rejected,
    Self::PendingRegistration,
    Self::Registered,
    Self::Full,
    Self::Paused,
    Self::InProgress,
    Self::Delayed,
    Self::AwaitingEvaluation,
    Self::AssignedDefense,
    Self::Graded,
    Self::Archived,
  ];

  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Draft => "draft",
      Self::Submitted => "submitted",
      Self::UnderReview => "under_review",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::PendingRegistration => "pending_registration",
      Self::Registered => "registered",
      Self::Full => "full",
      Self::Paused => "paused",
      Self::InProgress => "in_progress",
      Self::Delayed => "delayed",
      Self::AwaitingEvaluation => "awaiting_evaluation",
      Self::AssignedDefense => "assigned_defense",
      Self::Graded => "graded",
      Self::Archived => "archived",
    }
  }
}

impl fmt::Display for TopicStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TopicStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownVariant { kind: "topic status", value: s.to_owned() })
  }
}

// ─── Phase ───────────────────────────────────────────────────────────────────

/// A named stage of an academic period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Submit,
  OpenRegistration,
  Execution,
  Completion,
}

impl Phase {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Submit => "submit",
      Self::OpenRegistration => "open_registration",
      Self::Execution => "execution",
      Self::Completion => "completion",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Phase {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "submit" => Ok(Self::Submit),
      "open_registration" => Ok(Self::OpenRegistration),
      "execution" => Ok(Self::Execution),
      "completion" => Ok(Self::Completion),
      other => Err(Error::UnknownVariant { kind: "phase", value: other.to_owned() }),
    }
  }
}
