//! Admission control for student seats.
//!
//! The functions here decide; they never read or write. A store gathers the
//! facts they need inside a write transaction, asks for a decision, and
//! applies it in that same transaction, so every decision is taken against
//! the authoritative seat count.

use uuid::Uuid;

use crate::{
  Error, Result,
  capacity::Occupancy,
  history::ActorRole,
  registration::{RegistrationRequest, RegistrationStatus, StudentRegistration},
  status::TopicStatus,
  topic::Topic,
};

/// What a store has read about a student and a topic.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionFacts {
  /// A rejected registration exists for this (topic, student) pair.
  pub previously_rejected: bool,
  /// A pending or approved registration exists for this pair.
  pub active_on_topic:     bool,
  /// A pending or approved registration exists on some other non-research
  /// topic.
  pub active_elsewhere:    bool,
  pub occupancy:           Occupancy,
}

/// The status a new registration starts in.
///
/// Anyone other than the student placing them is an assignment and skips
/// review. Students self-registering on a non-research topic that does not
/// ask for manual approval are also approved straight away.
pub fn initial_status(topic: &Topic, role: ActorRole) -> RegistrationStatus {
  if role != ActorRole::Student {
    return RegistrationStatus::Approved;
  }
  if !topic.category.is_research_exempt() && !topic.allow_manual_approval {
    RegistrationStatus::Approved
  } else {
    RegistrationStatus::Pending
  }
}

/// Decide whether a registration may be created and in which status.
pub fn admit(
  topic: &Topic,
  request: &RegistrationRequest,
  facts: &AdmissionFacts,
) -> Result<RegistrationStatus> {
  let topic_id = topic.topic_id;
  let student_id = request.student_id;

  if topic.current_status == TopicStatus::Full {
    return Err(Error::TopicFull(topic_id));
  }
  if request.actor_role == ActorRole::Student && facts.previously_rejected {
    return Err(Error::PreviouslyRejected { topic_id, student_id });
  }
  if facts.active_on_topic {
    return Err(Error::AlreadyRegistered { topic_id, user_id: student_id });
  }
  check_category(topic, student_id, facts.active_elsewhere)?;

  let status = initial_status(topic, request.actor_role);
  // An immediate approval takes a seat like any other.
  if status == RegistrationStatus::Approved && facts.occupancy.is_full() {
    return Err(Error::TopicFull(topic_id));
  }
  Ok(status)
}

/// Decide whether a pending registration may be approved.
pub fn check_approval(
  topic: &Topic,
  registration: &StudentRegistration,
  occupancy: Occupancy,
  active_elsewhere: bool,
) -> Result<()> {
  if registration.status != RegistrationStatus::Pending {
    return Err(Error::RegistrationNotPending(registration.registration_id));
  }
  if occupancy.is_full() {
    return Err(Error::SlotFull(topic.topic_id));
  }
  check_category(topic, registration.student_id, active_elsewhere)
}

fn check_category(topic: &Topic, student_id: Uuid, active_elsewhere: bool) -> Result<()> {
  if !topic.category.is_research_exempt() && active_elsewhere {
    return Err(Error::OneActiveRegistrationPerCategory { student_id });
  }
  Ok(())
}

// ─── Capacity-driven transitions ─────────────────────────────────────────────

/// A status change caused by seat occupancy, with a note for the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatTransition {
  pub to:    TopicStatus,
  pub cause: String,
}

/// The topic status after one more seat is taken, if it changes.
///
/// `before` is the occupancy read before the seat was taken.
pub fn after_admission(topic: &Topic, before: Occupancy) -> Option<SeatTransition> {
  let status = topic.current_status;
  if !matches!(status, TopicStatus::PendingRegistration | TopicStatus::Registered) {
    return None;
  }

  let after = before.admit();
  if after.approved == after.max_students {
    return Some(SeatTransition {
      to:    TopicStatus::Full,
      cause: format!("last seat taken ({}/{})", after.approved, after.max_students),
    });
  }
  if status == TopicStatus::PendingRegistration && before.approved == 0 {
    return Some(SeatTransition {
      to:    TopicStatus::Registered,
      cause: format!("first student approved ({}/{})", after.approved, after.max_students),
    });
  }
  None
}

/// The topic status after one approved seat is given back, if it changes.
///
/// A full topic reopens as Registered while anyone remains; a topic whose
/// only approved student leaves returns to PendingRegistration.
///
/// Both rules read occupancy around the release: Full drops to Registered
/// only while `after.approved >= 1`, and the PendingRegistration rule fires
/// when `before.approved == 1`, i.e. the seat given back was the last one.
/// A topic that still holds one student after the release stays put.
pub fn after_release(topic: &Topic, before: Occupancy) -> Option<SeatTransition> {
  let after = before.release();
  let cause = format!("seat released ({}/{})", after.approved, after.max_students);

  match topic.current_status {
    TopicStatus::Full if after.approved >= 1 => {
      Some(SeatTransition { to: TopicStatus::Registered, cause })
    }
    TopicStatus::Full | TopicStatus::Registered if before.approved == 1 => {
      Some(SeatTransition { to: TopicStatus::PendingRegistration, cause })
    }
    _ => None,
  }
}
