//! Topic, the aggregate every registration and transition mutates.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  history::PhaseHistoryEntry,
  status::{Phase, TopicStatus},
};

/// The kind of project a topic offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicCategory {
  Thesis,
  Capstone,
  Internship,
  ScientificResearch,
}

impl TopicCategory {
  /// Research topics may be held in parallel with any other registration.
  pub const fn is_research_exempt(&self) -> bool {
    matches!(self, Self::ScientificResearch)
  }

  pub const fn as_str(&self) -> &'static str {
    match self {
      Self::Thesis => "thesis",
      Self::Capstone => "capstone",
      Self::Internship => "internship",
      Self::ScientificResearch => "scientific_research",
    }
  }
}

impl fmt::Display for TopicCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TopicCategory {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "thesis" => Ok(Self::Thesis),
      "capstone" => Ok(Self::Capstone),
      "internship" => Ok(Self::Internship),
      "scientific_research" => Ok(Self::ScientificResearch),
      other => Err(Error::UnknownVariant { kind: "topic category", value: other.to_owned() }),
    }
  }
}

/// A thesis or research project offered for registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
  pub topic_id:              Uuid,
  pub title:                 String,
  pub category:              TopicCategory,
  /// Seat capacity; always at least 1.
  pub max_students:          u32,
  /// Student self-registrations wait for a lecturer decision when set.
  pub allow_manual_approval: bool,
  pub current_status:        TopicStatus,
  /// `None` once the topic is detached from its period.
  pub current_phase:         Option<Phase>,
  pub period_id:             Option<Uuid>,
  pub created_by:            Uuid,
  pub created_at:            DateTime<Utc>,
  /// Bumped on every status change.
  pub version:               u64,
  /// Oldest first; never reordered.
  pub phase_histories:       Vec<PhaseHistoryEntry>,
}

/// Input to [`crate::store::TopicStore::create_topic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
  pub title:                 String,
  pub category:              TopicCategory,
  pub max_students:          u32,
  #[serde(default)]
  pub allow_manual_approval: bool,
  /// The lecturer proposing the topic.
  pub created_by:            Uuid,
}

impl NewTopic {
  pub fn new(title: impl Into<String>, category: TopicCategory, created_by: Uuid) -> Self {
    Self {
      title: title.into(),
      category,
      max_students: 1,
      allow_manual_approval: false,
      created_by,
    }
  }

  pub fn with_max_students(mut self, max_students: u32) -> Self {
    self.max_students = max_students;
    self
  }

  pub fn with_manual_approval(mut self) -> Self {
    self.allow_manual_approval = true;
    self
  }

  /// Refuse a topic that could never admit anyone.
  pub fn validate(&self) -> Result<(), Error> {
    if self.max_students == 0 {
      return Err(Error::InvalidCapacity(self.max_students));
    }
    Ok(())
  }
}
