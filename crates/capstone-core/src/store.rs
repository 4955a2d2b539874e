//! The `TopicStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `capstone-store-sqlite`). Higher layers (`capstone-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  capacity::Occupancy,
  error::Classify,
  history::PhaseHistoryEntry,
  lifecycle::TransferRequest,
  registration::{
    CancelReceipt, LecturerRegistration, RegistrationRequest, RejectionReason,
    StudentRegistration, StudentRole, SupervisorRole,
  },
  topic::{NewTopic, Topic},
};

/// Abstraction over the storage of topics, their registrations and their
/// phase history.
///
/// Every mutating method is atomic: it either applies completely (topic
/// status, registration rows and ledger entries together) or not at all.
/// Mutations on the same topic are linearizable, so two approvals racing
/// for the last seat cannot both succeed, and a manual transfer cannot
/// interleave with a capacity-driven one.
pub trait TopicStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Topics ────────────────────────────────────────────────────────────

  /// Create a topic in Draft with no period and an empty trail.
  fn create_topic(
    &self,
    input: NewTopic,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  /// Retrieve a topic with its full trail. Soft-deleted topics read as
  /// `None`.
  fn get_topic(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<Option<Topic>, Self::Error>> + Send + '_;

  /// Soft-delete a topic and force-cancel its lecturer registrations.
  fn delete_topic(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Move a topic to a new status through the transition graph, appending
  /// one ledger entry.
  fn transfer(
    &self,
    topic_id: Uuid,
    request: TransferRequest,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  /// The topic's trail, oldest first.
  fn phase_history(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PhaseHistoryEntry>, Self::Error>> + Send + '_;

  // ── Student admission ─────────────────────────────────────────────────

  /// Create a student registration and return the updated topic.
  fn register(
    &self,
    request: RegistrationRequest,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  /// Approve a pending registration, taking a seat.
  fn approve(
    &self,
    registration_id: Uuid,
    actor_id: Uuid,
    student_role: StudentRole,
    response: Option<String>,
  ) -> impl Future<Output = Result<StudentRegistration, Self::Error>> + Send + '_;

  /// Reject a pending registration. The student may not register for the
  /// topic again.
  fn reject(
    &self,
    registration_id: Uuid,
    actor_id: Uuid,
    reason: RejectionReason,
    response: Option<String>,
  ) -> impl Future<Output = Result<StudentRegistration, Self::Error>> + Send + '_;

  /// Cancel `user_id`'s active registration on a topic: a student's seat
  /// request or a lecturer's supervision.
  fn cancel(
    &self,
    topic_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<CancelReceipt, Self::Error>> + Send + '_;

  /// Remove a student from a topic on a lecturer's initiative.
  fn unassign(
    &self,
    topic_id: Uuid,
    student_id: Uuid,
    actor_id: Uuid,
  ) -> impl Future<Output = Result<StudentRegistration, Self::Error>> + Send + '_;

  /// All student registrations on a topic, in creation order.
  fn registrations(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StudentRegistration>, Self::Error>> + Send + '_;

  // ── Supervisors ───────────────────────────────────────────────────────

  /// Register a lecturer as a supervisor. Approved immediately.
  fn register_lecturer(
    &self,
    topic_id: Uuid,
    lecturer_id: Uuid,
    role: SupervisorRole,
  ) -> impl Future<Output = Result<LecturerRegistration, Self::Error>> + Send + '_;

  /// All lecturer registrations on a topic, in creation order.
  fn lecturers(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LecturerRegistration>, Self::Error>> + Send + '_;

  // ── Capacity ──────────────────────────────────────────────────────────

  /// Approved seats against capacity, read now.
  fn occupancy(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<Occupancy, Self::Error>> + Send + '_;

  /// Number of approved student registrations on a topic.
  fn approved_count(
    &self,
    topic_id: Uuid,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_ {
    async move { Ok(self.occupancy(topic_id).await?.approved) }
  }

  /// Whether exactly `n` seats remain.
  fn has_exactly_n_seats_left(
    &self,
    topic_id: Uuid,
    n: u32,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_ {
    async move { Ok(self.occupancy(topic_id).await?.has_exactly_n_seats_left(n)) }
  }

  /// Whether every seat is taken.
  fn is_full(&self, topic_id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_ {
    async move { Ok(self.occupancy(topic_id).await?.is_full()) }
  }
}
