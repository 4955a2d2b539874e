//! Phase history: the append-only audit trail attached to every topic.
//!
//! Entries are written once and never updated. Returning a topic to Draft
//! cuts its period linkage but leaves the trail in place.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  status::{Phase, TopicStatus},
};

/// Who caused a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Actor {
  User(Uuid),
  /// Capacity-driven transitions have no human author.
  System,
}

impl fmt::Display for Actor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::User(id) => write!(f, "{}", id.hyphenated()),
      Self::System => f.write_str("system"),
    }
  }
}

impl FromStr for Actor {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "system" {
      return Ok(Self::System);
    }
    Uuid::parse_str(s)
      .map(Self::User)
      .map_err(|_| Error::UnknownVariant { kind: "actor", value: s.to_owned() })
  }
}

/// The role an authenticated caller acts in. Supplied by the identity layer
/// on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
  Student,
  Lecturer,
  FacultyBoard,
}

/// One transition on a topic's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseHistoryEntry {
  /// The phase the topic was in when the transition happened.
  pub phase:       Option<Phase>,
  /// The status the topic moved into.
  pub status:      TopicStatus,
  pub actor:       Actor,
  pub note:        Option<String>,
  pub recorded_at: DateTime<Utc>,
}
