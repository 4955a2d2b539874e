//! Student and lecturer registrations on a topic.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, history::ActorRole};

/// Implements `as_str`, `Display` and `FromStr` over a fixed snake_case
/// string table.
macro_rules! string_enum {
  ($ty:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
    impl $ty {
      pub const fn as_str(&self) -> &'static str {
        match self {
          $(Self::$variant => $s,)+
        }
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl FromStr for $ty {
      type Err = Error;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($s => Ok(Self::$variant),)+
          other => Err(Error::UnknownVariant { kind: $kind, value: other.to_owned() }),
        }
      }
    }
  };
}

// ─── Student registrations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
  Pending,
  Approved,
  Rejected,
  /// Cancelled by the student.
  Cancelled,
  /// Removed by a lecturer.
  Withdrawn,
}

string_enum!(RegistrationStatus, "registration status", {
  Pending => "pending",
  Approved => "approved",
  Rejected => "rejected",
  Cancelled => "cancelled",
  Withdrawn => "withdrawn",
});

impl RegistrationStatus {
  /// Pending and approved registrations hold (or claim) a seat.
  pub const fn is_active(&self) -> bool {
    matches!(self, Self::Pending | Self::Approved)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentRole {
  Leader,
  Member,
}

string_enum!(StudentRole, "student role", {
  Leader => "leader",
  Member => "member",
});

/// Why a lecturer turned a request down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
  TopicFull,
  NotQualified,
  ScheduleConflict,
  Other,
}

string_enum!(RejectionReason, "rejection reason", {
  TopicFull => "topic_full",
  NotQualified => "not_qualified",
  ScheduleConflict => "schedule_conflict",
  Other => "other",
});

/// A student's request for (or assignment to) a seat on a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRegistration {
  pub registration_id:   Uuid,
  pub topic_id:          Uuid,
  pub student_id:        Uuid,
  pub status:            RegistrationStatus,
  pub student_note:      Option<String>,
  pub lecturer_response: Option<String>,
  pub rejection_reason:  Option<RejectionReason>,
  /// The lecturer who approved, rejected or withdrew the registration.
  pub processed_by:      Option<Uuid>,
  pub student_role:      Option<StudentRole>,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to [`crate::store::TopicStore::register`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
  pub topic_id:     Uuid,
  pub student_id:   Uuid,
  /// The caller: the student themself, or a lecturer assigning them.
  pub actor_id:     Uuid,
  pub actor_role:   ActorRole,
  #[serde(default)]
  pub student_note: Option<String>,
}

impl RegistrationRequest {
  /// A student asking for a seat on their own behalf.
  pub fn by_student(topic_id: Uuid, student_id: Uuid) -> Self {
    Self {
      topic_id,
      student_id,
      actor_id: student_id,
      actor_role: ActorRole::Student,
      student_note: None,
    }
  }

  /// A lecturer placing a student directly on a topic.
  pub fn by_lecturer(topic_id: Uuid, student_id: Uuid, lecturer_id: Uuid) -> Self {
    Self {
      topic_id,
      student_id,
      actor_id: lecturer_id,
      actor_role: ActorRole::Lecturer,
      student_note: None,
    }
  }
}

// ─── Lecturer registrations ──────────────────────────────────────────────────

/// Each role is a single slot on a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorRole {
  Main,
  CoSupervisor,
}

string_enum!(SupervisorRole, "supervisor role", {
  Main => "main",
  CoSupervisor => "co_supervisor",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LecturerRegistrationStatus {
  Approved,
  Cancelled,
}

string_enum!(LecturerRegistrationStatus, "lecturer registration status", {
  Approved => "approved",
  Cancelled => "cancelled",
});

/// A lecturer supervising a topic. Created approved; never reviewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LecturerRegistration {
  pub registration_id: Uuid,
  pub topic_id:        Uuid,
  pub lecturer_id:     Uuid,
  pub role:            SupervisorRole,
  pub status:          LecturerRegistrationStatus,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// What [`crate::store::TopicStore::cancel`] released.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CancelReceipt {
  Student {
    registration_id: Uuid,
    message:         String,
  },
  Lecturer {
    registration_id: Uuid,
    message:         String,
  },
}

impl CancelReceipt {
  pub fn message(&self) -> &str {
    match self {
      Self::Student { message, .. } | Self::Lecturer { message, .. } => message,
    }
  }
}
