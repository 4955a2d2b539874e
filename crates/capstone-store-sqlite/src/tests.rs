//! Integration tests for `SqliteStore` against an in-memory database.

use capstone_core::{
  ErrorCode,
  error::Classify,
  history::{Actor, ActorRole},
  lifecycle::TransferRequest,
  registration::{
    CancelReceipt, LecturerRegistrationStatus, RegistrationRequest, RegistrationStatus,
    RejectionReason, StudentRole, SupervisorRole,
  },
  status::{Phase, TopicStatus},
  store::TopicStore,
  topic::{NewTopic, Topic, TopicCategory},
  transition::TransitionError,
};
use std::time::Duration;

use uuid::Uuid;

use crate::{Error, SqliteStore, StoreOptions};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn lecturer() -> Uuid { Uuid::new_v4() }

async fn move_to(s: &SqliteStore, topic_id: Uuid, target: TopicStatus) -> Topic {
  s.transfer(topic_id, TransferRequest::new(target, lecturer()))
    .await
    .unwrap()
}

/// Create a topic and walk it through review into open registration.
async fn open_topic(s: &SqliteStore, input: NewTopic) -> Topic {
  let topic = s.create_topic(input).await.unwrap();
  let submit = TransferRequest::new(TopicStatus::Submitted, lecturer()).into_period(Uuid::new_v4());
  s.transfer(topic.topic_id, submit).await.unwrap();
  move_to(s, topic.topic_id, TopicStatus::UnderReview).await;
  move_to(s, topic.topic_id, TopicStatus::Approved).await;
  move_to(s, topic.topic_id, TopicStatus::PendingRegistration).await
}

fn thesis(max_students: u32) -> NewTopic {
  NewTopic::new("Scheduling exams with SAT solvers", TopicCategory::Thesis, Uuid::new_v4())
    .with_max_students(max_students)
}

fn reviewed_thesis(max_students: u32) -> NewTopic { thesis(max_students).with_manual_approval() }

/// Register `student` by self-service and return the new registration id.
async fn request_seat(s: &SqliteStore, topic_id: Uuid, student: Uuid) -> Uuid {
  s.register(RegistrationRequest::by_student(topic_id, student))
    .await
    .unwrap();
  s.registrations(topic_id)
    .await
    .unwrap()
    .into_iter()
    .rev()
    .find(|r| r.student_id == student)
    .map(|r| r.registration_id)
    .unwrap()
}

fn system_entries(topic: &Topic) -> usize {
  topic
    .phase_histories
    .iter()
    .filter(|e| e.actor == Actor::System)
    .count()
}

// ─── Topics ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_topic() {
  let s = store().await;
  let topic = s.create_topic(thesis(3)).await.unwrap();
  assert_eq!(topic.current_status, TopicStatus::Draft);
  assert_eq!(topic.current_phase, None);
  assert!(topic.phase_histories.is_empty());

  let fetched = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(fetched.topic_id, topic.topic_id);
  assert_eq!(fetched.max_students, 3);
  assert_eq!(fetched.category, TopicCategory::Thesis);
}

#[tokio::test]
async fn zero_seat_topic_is_refused() {
  let s = store().await;
  let err = s.create_topic(thesis(0)).await.unwrap_err();
  assert!(matches!(err, Error::Core(capstone_core::Error::InvalidCapacity(0))));
  assert_eq!(err.code(), ErrorCode::InvalidCapacity);
}

#[tokio::test]
async fn get_topic_missing_returns_none() {
  let s = store().await;
  assert!(s.get_topic(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn transfer_on_missing_topic_is_not_found() {
  let s = store().await;
  let err = s
    .transfer(Uuid::new_v4(), TransferRequest::new(TopicStatus::Submitted, lecturer()))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn deleted_topic_reads_as_missing() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();
  s.register_lecturer(topic.topic_id, Uuid::new_v4(), SupervisorRole::Main)
    .await
    .unwrap();

  s.delete_topic(topic.topic_id).await.unwrap();
  assert!(s.get_topic(topic.topic_id).await.unwrap().is_none());

  let err = s.lecturers(topic.topic_id).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
  let err = s.delete_topic(topic.topic_id).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_records_the_submit_phase_and_period() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();
  let period_id = Uuid::new_v4();
  let actor = lecturer();

  let submitted = s
    .transfer(
      topic.topic_id,
      TransferRequest::new(TopicStatus::Submitted, actor)
        .into_period(period_id)
        .with_note("first draft"),
    )
    .await
    .unwrap();

  assert_eq!(submitted.current_status, TopicStatus::Submitted);
  assert_eq!(submitted.current_phase, Some(Phase::Submit));
  assert_eq!(submitted.period_id, Some(period_id));
  assert_eq!(submitted.version, 1);

  let history = s.phase_history(topic.topic_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].status, TopicStatus::Submitted);
  assert_eq!(history[0].actor, Actor::User(actor));
  assert_eq!(history[0].note.as_deref(), Some("first draft"));
}

#[tokio::test]
async fn only_capacity_changes_are_attributed_to_the_system() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;
  assert_eq!(system_entries(&topic), 0);

  s.register(RegistrationRequest::by_student(topic.topic_id, Uuid::new_v4()))
    .await
    .unwrap();
  let caller = lecturer();
  s.transfer(topic.topic_id, TransferRequest::new(TopicStatus::InProgress, caller))
    .await
    .unwrap();

  let history = s.phase_history(topic.topic_id).await.unwrap();
  let automatic: Vec<_> = history
    .iter()
    .filter(|e| e.actor == Actor::System)
    .map(|e| e.status)
    .collect();
  assert_eq!(automatic, [TopicStatus::Full]);
  let last = history.last().unwrap();
  assert_eq!(last.status, TopicStatus::InProgress);
  assert_eq!(last.actor, Actor::User(caller));
}

#[tokio::test]
async fn illegal_transition_is_refused_and_writes_nothing() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();

  let err = s
    .transfer(topic.topic_id, TransferRequest::new(TopicStatus::InProgress, lecturer()))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(capstone_core::Error::InvalidTransition(TransitionError::Illegal { .. }))
  ));

  let fetched = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(fetched.current_status, TopicStatus::Draft);
  assert_eq!(fetched.version, 0);
  assert!(fetched.phase_histories.is_empty());
}

#[tokio::test]
async fn repeating_the_current_status_is_refused_with_its_own_message() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;

  let err = s
    .transfer(
      topic.topic_id,
      TransferRequest::new(TopicStatus::PendingRegistration, lecturer()),
    )
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::InvalidTransition);
  assert!(matches!(
    err,
    Error::Core(capstone_core::Error::InvalidTransition(TransitionError::AlreadyInState(
      TopicStatus::PendingRegistration
    )))
  ));
  assert_eq!(s.phase_history(topic.topic_id).await.unwrap().len(), 4);
}

#[tokio::test]
async fn reentering_review_is_a_silent_no_op() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();
  let submit = TransferRequest::new(TopicStatus::Submitted, lecturer()).into_period(Uuid::new_v4());
  s.transfer(topic.topic_id, submit).await.unwrap();
  let in_review = move_to(&s, topic.topic_id, TopicStatus::UnderReview).await;

  let again = move_to(&s, topic.topic_id, TopicStatus::UnderReview).await;
  assert_eq!(again.current_status, TopicStatus::UnderReview);
  assert_eq!(again.version, in_review.version);
  assert_eq!(again.phase_histories.len(), in_review.phase_histories.len());
}

#[tokio::test]
async fn returning_to_draft_detaches_the_period_but_keeps_the_trail() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();
  let submit = TransferRequest::new(TopicStatus::Submitted, lecturer()).into_period(Uuid::new_v4());
  s.transfer(topic.topic_id, submit).await.unwrap();
  move_to(&s, topic.topic_id, TopicStatus::UnderReview).await;
  move_to(&s, topic.topic_id, TopicStatus::Rejected).await;

  let draft = move_to(&s, topic.topic_id, TopicStatus::Draft).await;
  assert_eq!(draft.current_status, TopicStatus::Draft);
  assert_eq!(draft.period_id, None);
  assert_eq!(draft.current_phase, None);
  assert_eq!(draft.phase_histories.len(), 4);

  let stored = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(stored.period_id, None);
  assert_eq!(stored.current_phase, None);
  let statuses: Vec<_> = stored.phase_histories.iter().map(|e| e.status).collect();
  assert_eq!(statuses, [
    TopicStatus::Submitted,
    TopicStatus::UnderReview,
    TopicStatus::Rejected,
    TopicStatus::Draft,
  ]);
}

#[tokio::test]
async fn every_successful_transfer_appends_exactly_one_entry() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;
  assert_eq!(topic.phase_histories.len(), 4);
  assert_eq!(topic.version, 4);

  // Lecturer assignment on a single seat fills the topic.
  let full = s
    .register(RegistrationRequest::by_lecturer(topic.topic_id, Uuid::new_v4(), topic.created_by))
    .await
    .unwrap();
  assert_eq!(full.current_status, TopicStatus::Full);
  assert_eq!(full.phase_histories.len(), 5);

  move_to(&s, topic.topic_id, TopicStatus::InProgress).await;
  move_to(&s, topic.topic_id, TopicStatus::Paused).await;
  move_to(&s, topic.topic_id, TopicStatus::InProgress).await;
  move_to(&s, topic.topic_id, TopicStatus::AwaitingEvaluation).await;
  move_to(&s, topic.topic_id, TopicStatus::AssignedDefense).await;
  move_to(&s, topic.topic_id, TopicStatus::Graded).await;
  let archived = move_to(&s, topic.topic_id, TopicStatus::Archived).await;

  assert_eq!(archived.phase_histories.len(), 12);
  assert_eq!(s.phase_history(topic.topic_id).await.unwrap(), archived.phase_histories);
}

// ─── Admission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn self_registration_without_review_is_approved_immediately() {
  let s = store().await;
  let topic = open_topic(&s, thesis(2)).await;

  let updated = s
    .register(RegistrationRequest::by_student(topic.topic_id, Uuid::new_v4()))
    .await
    .unwrap();
  assert_eq!(updated.current_status, TopicStatus::Registered);
  assert_eq!(system_entries(&updated), 1);
  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 1);
}

#[tokio::test]
async fn two_approvals_register_then_fill() {
  let s = store().await;
  let topic = open_topic(&s, reviewed_thesis(2)).await;
  let r1 = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;
  let r2 = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;
  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 0);

  let approved = s
    .approve(r1, Uuid::new_v4(), StudentRole::Leader, Some("welcome".into()))
    .await
    .unwrap();
  assert_eq!(approved.status, RegistrationStatus::Approved);
  assert_eq!(approved.student_role, Some(StudentRole::Leader));
  assert_eq!(approved.lecturer_response.as_deref(), Some("welcome"));

  let after_first = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(after_first.current_status, TopicStatus::Registered);
  assert_eq!(after_first.phase_histories.len(), topic.phase_histories.len() + 1);
  assert_eq!(system_entries(&after_first), 1);
  assert!(s.has_exactly_n_seats_left(topic.topic_id, 1).await.unwrap());

  s.approve(r2, Uuid::new_v4(), StudentRole::Member, None)
    .await
    .unwrap();
  let after_second = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(after_second.current_status, TopicStatus::Full);
  assert_eq!(system_entries(&after_second), 2);
  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 2);
  assert!(s.occupancy(topic.topic_id).await.unwrap().is_full());
}

#[tokio::test]
async fn racing_approvals_for_the_last_seat_admit_exactly_one() {
  let s = store().await;
  let topic = open_topic(&s, reviewed_thesis(1)).await;
  let r1 = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;
  let r2 = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;

  let (a, b) = tokio::join!(
    s.approve(r1, Uuid::new_v4(), StudentRole::Leader, None),
    s.approve(r2, Uuid::new_v4(), StudentRole::Leader, None),
  );

  let outcomes = [a, b];
  assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
  let loser = outcomes.into_iter().find_map(Result::err).unwrap();
  assert_eq!(loser.code(), ErrorCode::SlotFull);

  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 1);
  assert!(s.is_full(topic.topic_id).await.unwrap());
  let topic = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(topic.current_status, TopicStatus::Full);
  assert_eq!(system_entries(&topic), 1);
}

#[tokio::test]
async fn racing_approvals_across_connections_admit_exactly_one() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("topics.db");
  let options = StoreOptions::default();
  let first = SqliteStore::open_with(&path, options).await.unwrap();
  let second = SqliteStore::open_with(&path, options).await.unwrap();

  let topic = open_topic(&first, reviewed_thesis(1)).await;
  let r1 = request_seat(&first, topic.topic_id, Uuid::new_v4()).await;
  let r2 = request_seat(&first, topic.topic_id, Uuid::new_v4()).await;

  let (a, b) = tokio::join!(
    first.approve(r1, Uuid::new_v4(), StudentRole::Leader, None),
    second.approve(r2, Uuid::new_v4(), StudentRole::Leader, None),
  );

  assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
  assert_eq!(second.approved_count(topic.topic_id).await.unwrap(), 1);
  let topic = second.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(topic.current_status, TopicStatus::Full);
}

#[tokio::test]
async fn approval_under_a_held_write_lock_times_out_and_applies_nothing() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("topics.db");
  let options = StoreOptions { busy_timeout: Duration::from_millis(50) };
  let s = SqliteStore::open_with(&path, options).await.unwrap();

  let topic = open_topic(&s, reviewed_thesis(1)).await;
  let reg = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;

  let blocker = rusqlite::Connection::open(&path).unwrap();
  blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

  let err = s
    .approve(reg, Uuid::new_v4(), StudentRole::Leader, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::StorageTimeout(_)));
  assert_eq!(err.code(), ErrorCode::StorageTimeout);

  blocker.execute_batch("ROLLBACK").unwrap();
  drop(blocker);

  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 0);
  let after = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(after.current_status, TopicStatus::PendingRegistration);
  assert_eq!(after.phase_histories.len(), topic.phase_histories.len());
  assert_eq!(after.version, topic.version);
  let pending = s.registrations(topic.topic_id).await.unwrap();
  assert_eq!(pending[0].status, RegistrationStatus::Pending);

  // The lock is gone, so the same approval now goes through.
  s.approve(reg, Uuid::new_v4(), StudentRole::Leader, None)
    .await
    .unwrap();
  assert!(s.is_full(topic.topic_id).await.unwrap());
}

#[tokio::test]
async fn one_active_registration_across_non_research_topics() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic_a = open_topic(&s, thesis(2)).await;
  let topic_b = open_topic(&s, thesis(2)).await;
  let topic_c = open_topic(
    &s,
    NewTopic::new("Graph sparsifiers", TopicCategory::ScientificResearch, Uuid::new_v4()),
  )
  .await;

  s.register(RegistrationRequest::by_student(topic_a.topic_id, student))
    .await
    .unwrap();

  let err = s
    .register(RegistrationRequest::by_student(topic_b.topic_id, student))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::OneActiveRegistrationPerCategory);

  s.register(RegistrationRequest::by_student(topic_c.topic_id, student))
    .await
    .unwrap();
  let regs = s.registrations(topic_c.topic_id).await.unwrap();
  assert_eq!(regs.len(), 1);
  assert_eq!(regs[0].status, RegistrationStatus::Pending);
}

#[tokio::test]
async fn capstone_and_thesis_share_the_one_active_rule() {
  let s = store().await;
  let student = Uuid::new_v4();
  let thesis_topic = open_topic(&s, reviewed_thesis(2)).await;
  let capstone = open_topic(
    &s,
    NewTopic::new("Campus wayfinding app", TopicCategory::Capstone, Uuid::new_v4()),
  )
  .await;

  // A pending request counts as active too.
  request_seat(&s, thesis_topic.topic_id, student).await;
  let err = s
    .register(RegistrationRequest::by_student(capstone.topic_id, student))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::OneActiveRegistrationPerCategory);
}

#[tokio::test]
async fn research_requests_do_not_count_toward_the_one_active_rule() {
  let s = store().await;
  let student = Uuid::new_v4();
  let research = open_topic(
    &s,
    NewTopic::new("Graph sparsifiers", TopicCategory::ScientificResearch, Uuid::new_v4()),
  )
  .await;
  let other = open_topic(&s, thesis(1)).await;

  request_seat(&s, research.topic_id, student).await;
  let updated = s
    .register(RegistrationRequest::by_lecturer(other.topic_id, student, other.created_by))
    .await
    .unwrap();
  assert_eq!(updated.current_status, TopicStatus::Full);

  // Approving the research request is still allowed alongside the thesis seat.
  let reg = s.registrations(research.topic_id).await.unwrap()[0].registration_id;
  s.approve(reg, research.created_by, StudentRole::Leader, None)
    .await
    .unwrap();
}

#[tokio::test]
async fn rejected_student_may_not_register_again() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic = open_topic(&s, reviewed_thesis(3)).await;
  let reg = request_seat(&s, topic.topic_id, student).await;

  let rejected = s
    .reject(reg, Uuid::new_v4(), RejectionReason::NotQualified, Some("missing prerequisites".into()))
    .await
    .unwrap();
  assert_eq!(rejected.status, RegistrationStatus::Rejected);
  assert_eq!(rejected.rejection_reason, Some(RejectionReason::NotQualified));

  let err = s
    .register(RegistrationRequest::by_student(topic.topic_id, student))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::PreviouslyRejected);

  // Rejection leaves the topic where it was.
  let stored = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(stored.current_status, TopicStatus::PendingRegistration);
}

#[tokio::test]
async fn lecturer_may_still_assign_a_rejected_student() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic = open_topic(&s, reviewed_thesis(3)).await;
  let reg = request_seat(&s, topic.topic_id, student).await;
  s.reject(reg, Uuid::new_v4(), RejectionReason::ScheduleConflict, None)
    .await
    .unwrap();

  let updated = s
    .register(RegistrationRequest::by_lecturer(topic.topic_id, student, topic.created_by))
    .await
    .unwrap();
  assert_eq!(updated.current_status, TopicStatus::Registered);
}

#[tokio::test]
async fn duplicate_registration_is_refused() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic = open_topic(&s, reviewed_thesis(2)).await;
  request_seat(&s, topic.topic_id, student).await;

  let err = s
    .register(RegistrationRequest::by_student(topic.topic_id, student))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::AlreadyRegistered);
}

#[tokio::test]
async fn full_topic_refuses_new_registrations() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;
  s.register(RegistrationRequest::by_student(topic.topic_id, Uuid::new_v4()))
    .await
    .unwrap();

  let err = s
    .register(RegistrationRequest::by_student(topic.topic_id, Uuid::new_v4()))
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::TopicFull);
  assert_eq!(s.registrations(topic.topic_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn only_pending_registrations_can_be_decided() {
  let s = store().await;
  let topic = open_topic(&s, reviewed_thesis(2)).await;
  let reg = request_seat(&s, topic.topic_id, Uuid::new_v4()).await;
  s.approve(reg, Uuid::new_v4(), StudentRole::Leader, None)
    .await
    .unwrap();

  let err = s
    .approve(reg, Uuid::new_v4(), StudentRole::Leader, None)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::RegistrationNotPending);
  let err = s
    .reject(reg, Uuid::new_v4(), RejectionReason::Other, None)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::RegistrationNotPending);

  let err = s
    .approve(Uuid::new_v4(), Uuid::new_v4(), StudentRole::Leader, None)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
}

// ─── Downgrades ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelling_from_full_reopens_the_topic() {
  let s = store().await;
  let topic = open_topic(&s, thesis(2)).await;
  let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
  s.register(RegistrationRequest::by_student(topic.topic_id, first))
    .await
    .unwrap();
  let full = s
    .register(RegistrationRequest::by_student(topic.topic_id, second))
    .await
    .unwrap();
  assert_eq!(full.current_status, TopicStatus::Full);

  let receipt = s.cancel(topic.topic_id, second).await.unwrap();
  assert!(matches!(receipt, CancelReceipt::Student { .. }));

  let reopened = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(reopened.current_status, TopicStatus::Registered);
  assert_eq!(system_entries(&reopened), 3);
  assert_eq!(s.approved_count(topic.topic_id).await.unwrap(), 1);

  // The seat is free again and the cancelled student may come back.
  s.register(RegistrationRequest::by_student(topic.topic_id, second))
    .await
    .unwrap();
  assert_eq!(
    s.get_topic(topic.topic_id).await.unwrap().unwrap().current_status,
    TopicStatus::Full
  );
}

#[tokio::test]
async fn unassigning_the_last_student_returns_to_pending_registration() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic = open_topic(&s, thesis(3)).await;
  s.register(RegistrationRequest::by_student(topic.topic_id, student))
    .await
    .unwrap();

  let actor = Uuid::new_v4();
  let withdrawn = s.unassign(topic.topic_id, student, actor).await.unwrap();
  assert_eq!(withdrawn.status, RegistrationStatus::Withdrawn);
  assert_eq!(withdrawn.processed_by, Some(actor));

  let topic = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(topic.current_status, TopicStatus::PendingRegistration);
  let last = topic.phase_histories.last().unwrap();
  assert_eq!(last.actor, Actor::System);
  assert_eq!(last.status, TopicStatus::PendingRegistration);
}

#[tokio::test]
async fn cancelling_a_pending_request_leaves_status_alone() {
  let s = store().await;
  let student = Uuid::new_v4();
  let topic = open_topic(&s, reviewed_thesis(2)).await;
  request_seat(&s, topic.topic_id, student).await;

  s.cancel(topic.topic_id, student).await.unwrap();
  let stored = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(stored.current_status, TopicStatus::PendingRegistration);
  assert_eq!(stored.phase_histories.len(), topic.phase_histories.len());
  assert_eq!(
    s.registrations(topic.topic_id).await.unwrap()[0].status,
    RegistrationStatus::Cancelled
  );
}

#[tokio::test]
async fn cancel_without_a_registration_is_not_found() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;
  let err = s.cancel(topic.topic_id, Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
  let err = s
    .unassign(topic.topic_id, Uuid::new_v4(), Uuid::new_v4())
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::NotFound);
}

// ─── Supervisors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn two_supervisor_slots_per_topic() {
  let s = store().await;
  let topic = s.create_topic(thesis(1)).await.unwrap();
  let (main, co, third) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

  let reg = s
    .register_lecturer(topic.topic_id, main, SupervisorRole::Main)
    .await
    .unwrap();
  assert_eq!(reg.status, LecturerRegistrationStatus::Approved);

  let err = s
    .register_lecturer(topic.topic_id, main, SupervisorRole::CoSupervisor)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::AlreadyRegistered);

  let err = s
    .register_lecturer(topic.topic_id, third, SupervisorRole::Main)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::LecturerSlotFull);

  s.register_lecturer(topic.topic_id, co, SupervisorRole::CoSupervisor)
    .await
    .unwrap();
  let err = s
    .register_lecturer(topic.topic_id, third, SupervisorRole::CoSupervisor)
    .await
    .unwrap_err();
  assert_eq!(err.code(), ErrorCode::LecturerSlotFull);
}

#[tokio::test]
async fn lecturer_cancellation_frees_the_slot_without_touching_status() {
  let s = store().await;
  let topic = open_topic(&s, thesis(1)).await;
  let main = Uuid::new_v4();
  s.register_lecturer(topic.topic_id, main, SupervisorRole::Main)
    .await
    .unwrap();

  let receipt = s.cancel(topic.topic_id, main).await.unwrap();
  assert!(matches!(receipt, CancelReceipt::Lecturer { .. }));

  let lecturers = s.lecturers(topic.topic_id).await.unwrap();
  assert_eq!(lecturers.len(), 1);
  assert_eq!(lecturers[0].status, LecturerRegistrationStatus::Cancelled);

  let stored = s.get_topic(topic.topic_id).await.unwrap().unwrap();
  assert_eq!(stored.current_status, TopicStatus::PendingRegistration);
  assert_eq!(stored.version, topic.version);

  s.register_lecturer(topic.topic_id, Uuid::new_v4(), SupervisorRole::Main)
    .await
    .unwrap();
}

#[tokio::test]
async fn faculty_board_assignment_skips_review() {
  let s = store().await;
  let topic = open_topic(&s, reviewed_thesis(2)).await;
  let request = RegistrationRequest {
    actor_role: ActorRole::FacultyBoard,
    ..RegistrationRequest::by_lecturer(topic.topic_id, Uuid::new_v4(), Uuid::new_v4())
  };
  let updated = s.register(request).await.unwrap();
  assert_eq!(updated.current_status, TopicStatus::Registered);
}
