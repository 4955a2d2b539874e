//! [`SqliteStore`], the SQLite implementation of [`TopicStore`].

use std::{path::Path, time::Duration};

use capstone_core::{
  Error as CoreError,
  admission::{self, AdmissionFacts, SeatTransition},
  capacity::Occupancy,
  history::{ActorRole, PhaseHistoryEntry},
  lifecycle::{self, AppliedTransfer, TransferPlan, TransferRequest},
  registration::{
    CancelReceipt, LecturerRegistration, LecturerRegistrationStatus, RegistrationRequest,
    RegistrationStatus, RejectionReason, StudentRegistration, StudentRole, SupervisorRole,
  },
  status::TopicStatus,
  store::TopicStore,
  topic::{NewTopic, Topic},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    LECTURER_REGISTRATION_COLUMNS, RawHistoryEntry, RawLecturerRegistration, RawStudentRegistration,
    RawTopic, STUDENT_REGISTRATION_COLUMNS, TOPIC_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Lecturer supervision slots per topic.
const MAX_SUPERVISORS: usize = 2;

// ─── Options ─────────────────────────────────────────────────────────────────

/// Connection tuning.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
  /// How long a write waits for another connection's write lock before the
  /// operation fails with `StorageTimeout`.
  pub busy_timeout: Duration,
}

impl Default for StoreOptions {
  fn default() -> Self { Self { busy_timeout: Duration::from_secs(5) } }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A topic store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All calls
/// on one store (and its clones) run in order on a single connection
/// thread; separate stores on the same file serialise their writes through
/// SQLite's write lock.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init(options).await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init(StoreOptions::default()).await?;
    Ok(store)
  }

  async fn init(&self, options: StoreOptions) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.busy_timeout(options.busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a `BEGIN IMMEDIATE` transaction on the connection
  /// thread. The transaction commits only if `f` succeeds; on any error,
  /// including a domain refusal, every write `f` made is rolled back.
  async fn write<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let outcome = f(&tx);
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?
  }

  /// Run `f` inside a read transaction, for a consistent snapshot across
  /// several queries.
  async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        Ok(f(&tx))
      })
      .await?
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

fn load_history(conn: &rusqlite::Connection, topic_id: &str) -> Result<Vec<PhaseHistoryEntry>> {
  let mut stmt = conn.prepare(
    "SELECT phase, status, actor, note, recorded_at
     FROM phase_history
     WHERE topic_id = ?1
     ORDER BY seq",
  )?;
  let raws = stmt
    .query_map(rusqlite::params![topic_id], |row| {
      Ok(RawHistoryEntry {
        phase:       row.get(0)?,
        status:      row.get(1)?,
        actor:       row.get(2)?,
        note:        row.get(3)?,
        recorded_at: row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawHistoryEntry::into_entry).collect()
}

fn find_topic(conn: &rusqlite::Connection, topic_id: Uuid) -> Result<Option<Topic>> {
  let id_str = encode_uuid(topic_id);
  let raw = conn
    .query_row(
      &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE topic_id = ?1 AND deleted_at IS NULL"),
      rusqlite::params![id_str],
      RawTopic::from_row,
    )
    .optional()?;

  match raw {
    Some(raw) => {
      let history = load_history(conn, &id_str)?;
      Ok(Some(raw.into_topic(history)?))
    }
    None => Ok(None),
  }
}

fn load_topic(conn: &rusqlite::Connection, topic_id: Uuid) -> Result<Topic> {
  find_topic(conn, topic_id)?.ok_or_else(|| CoreError::TopicNotFound(topic_id).into())
}

fn count_approved(conn: &rusqlite::Connection, topic: &Topic) -> Result<Occupancy> {
  let approved: u32 = conn.query_row(
    "SELECT COUNT(*) FROM student_registrations WHERE topic_id = ?1 AND status = 'approved'",
    rusqlite::params![encode_uuid(topic.topic_id)],
    |row| row.get(0),
  )?;
  Ok(Occupancy::new(approved, topic.max_students))
}

/// Whether `student_id` holds a live registration on any non-research topic
/// other than `topic_id`.
fn active_elsewhere(conn: &rusqlite::Connection, student_id: Uuid, topic_id: Uuid) -> Result<bool> {
  Ok(conn.query_row(
    "SELECT EXISTS (
       SELECT 1
       FROM student_registrations r
       JOIN topics t ON t.topic_id = r.topic_id
       WHERE r.student_id = ?1
         AND r.topic_id  != ?2
         AND r.status IN ('pending', 'approved')
         AND t.category  != 'scientific_research'
         AND t.deleted_at IS NULL
     )",
    rusqlite::params![encode_uuid(student_id), encode_uuid(topic_id)],
    |row| row.get(0),
  )?)
}

fn pair_has_status(
  conn: &rusqlite::Connection,
  topic_id: Uuid,
  student_id: Uuid,
  statuses: &str,
) -> Result<bool> {
  Ok(conn.query_row(
    &format!(
      "SELECT EXISTS (
         SELECT 1 FROM student_registrations
         WHERE topic_id = ?1 AND student_id = ?2 AND status IN ({statuses})
       )"
    ),
    rusqlite::params![encode_uuid(topic_id), encode_uuid(student_id)],
    |row| row.get(0),
  )?)
}

fn load_registration(conn: &rusqlite::Connection, registration_id: Uuid) -> Result<StudentRegistration> {
  conn
    .query_row(
      &format!(
        "SELECT {STUDENT_REGISTRATION_COLUMNS} FROM student_registrations WHERE registration_id = ?1"
      ),
      rusqlite::params![encode_uuid(registration_id)],
      RawStudentRegistration::from_row,
    )
    .optional()?
    .ok_or(CoreError::RegistrationNotFound(registration_id))?
    .into_registration()
}

fn find_active_registration(
  conn: &rusqlite::Connection,
  topic_id: Uuid,
  student_id: Uuid,
) -> Result<Option<StudentRegistration>> {
  conn
    .query_row(
      &format!(
        "SELECT {STUDENT_REGISTRATION_COLUMNS} FROM student_registrations
         WHERE topic_id = ?1 AND student_id = ?2 AND status IN ('pending', 'approved')"
      ),
      rusqlite::params![encode_uuid(topic_id), encode_uuid(student_id)],
      RawStudentRegistration::from_row,
    )
    .optional()?
    .map(RawStudentRegistration::into_registration)
    .transpose()
}

fn insert_registration(conn: &rusqlite::Connection, reg: &StudentRegistration) -> Result<()> {
  conn.execute(
    &format!(
      "INSERT INTO student_registrations ({STUDENT_REGISTRATION_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
    ),
    rusqlite::params![
      encode_uuid(reg.registration_id),
      encode_uuid(reg.topic_id),
      encode_uuid(reg.student_id),
      reg.status.as_str(),
      reg.student_note,
      reg.lecturer_response,
      reg.rejection_reason.map(|r| r.as_str()),
      reg.processed_by.map(encode_uuid),
      reg.student_role.map(|r| r.as_str()),
      encode_dt(reg.created_at),
      encode_dt(reg.updated_at),
    ],
  )?;
  Ok(())
}

/// Write back the mutable fields of a student registration.
fn update_registration(conn: &rusqlite::Connection, reg: &StudentRegistration) -> Result<()> {
  conn.execute(
    "UPDATE student_registrations
     SET status = ?2, lecturer_response = ?3, rejection_reason = ?4,
         processed_by = ?5, student_role = ?6, updated_at = ?7
     WHERE registration_id = ?1",
    rusqlite::params![
      encode_uuid(reg.registration_id),
      reg.status.as_str(),
      reg.lecturer_response,
      reg.rejection_reason.map(|r| r.as_str()),
      reg.processed_by.map(encode_uuid),
      reg.student_role.map(|r| r.as_str()),
      encode_dt(reg.updated_at),
    ],
  )?;
  Ok(())
}

fn active_lecturers(conn: &rusqlite::Connection, topic_id: Uuid) -> Result<Vec<LecturerRegistration>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {LECTURER_REGISTRATION_COLUMNS} FROM lecturer_registrations
     WHERE topic_id = ?1 AND status = 'approved'
     ORDER BY rowid"
  ))?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(topic_id)], RawLecturerRegistration::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawLecturerRegistration::into_registration).collect()
}

/// Persist a transfer: the topic row and one ledger entry.
fn apply_transfer(conn: &rusqlite::Connection, topic_id: Uuid, applied: &AppliedTransfer) -> Result<()> {
  let id_str = encode_uuid(topic_id);
  conn.execute(
    "UPDATE topics
     SET current_status = ?2, current_phase = ?3, period_id = ?4, version = version + 1
     WHERE topic_id = ?1",
    rusqlite::params![
      id_str,
      applied.to.as_str(),
      applied.phase.map(|p| p.as_str()),
      applied.period_id.map(encode_uuid),
    ],
  )?;

  let entry = &applied.entry;
  conn.execute(
    "INSERT INTO phase_history (topic_id, phase, status, actor, note, recorded_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    rusqlite::params![
      id_str,
      entry.phase.map(|p| p.as_str()),
      entry.status.as_str(),
      entry.actor.to_string(),
      entry.note,
      encode_dt(entry.recorded_at),
    ],
  )?;
  Ok(())
}

/// Apply a capacity-driven transition, if any, to both the row and the
/// in-memory snapshot.
fn apply_seat_transition(
  conn: &rusqlite::Connection,
  topic: &mut Topic,
  seat: Option<SeatTransition>,
) -> Result<Option<AppliedTransfer>> {
  let Some(seat) = seat else { return Ok(None) };
  let applied = lifecycle::plan_system_transfer(topic, seat.to, seat.cause, Utc::now());
  apply_transfer(conn, topic.topic_id, &applied)?;
  applied.apply_to(topic);
  Ok(Some(applied))
}

fn log_seat_transition(topic_id: Uuid, applied: Option<&AppliedTransfer>) {
  if let Some(applied) = applied {
    tracing::info!(
      %topic_id,
      from = %applied.from,
      to = %applied.to,
      cause = applied.entry.note.as_deref().unwrap_or_default(),
      "capacity-driven transition"
    );
  }
}

// ─── TopicStore impl ─────────────────────────────────────────────────────────

impl TopicStore for SqliteStore {
  type Error = crate::Error;

  // ── Topics ────────────────────────────────────────────────────────────────

  async fn create_topic(&self, input: NewTopic) -> Result<Topic> {
    input.validate()?;
    let topic = Topic {
      topic_id:              Uuid::new_v4(),
      title:                 input.title,
      category:              input.category,
      max_students:          input.max_students,
      allow_manual_approval: input.allow_manual_approval,
      current_status:        TopicStatus::Draft,
      current_phase:         None,
      period_id:             None,
      created_by:            input.created_by,
      created_at:            Utc::now(),
      version:               0,
      phase_histories:       Vec::new(),
    };

    let id_str       = encode_uuid(topic.topic_id);
    let title        = topic.title.clone();
    let category     = topic.category.as_str();
    let max_students = topic.max_students;
    let manual       = topic.allow_manual_approval;
    let status       = topic.current_status.as_str();
    let created_by   = encode_uuid(topic.created_by);
    let created_at   = encode_dt(topic.created_at);

    self
      .write(move |conn| {
        conn.execute(
          "INSERT INTO topics (
             topic_id, title, category, max_students, allow_manual_approval,
             current_status, created_by, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, title, category, max_students, manual, status, created_by, created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(topic_id = %topic.topic_id, category = %topic.category, "topic created");
    Ok(topic)
  }

  async fn get_topic(&self, topic_id: Uuid) -> Result<Option<Topic>> {
    self.read(move |conn| find_topic(conn, topic_id)).await
  }

  async fn delete_topic(&self, topic_id: Uuid) -> Result<()> {
    let released = self
      .write(move |conn| {
        load_topic(conn, topic_id)?;
        let id_str = encode_uuid(topic_id);
        let now = encode_dt(Utc::now());

        conn.execute(
          "UPDATE topics SET deleted_at = ?2 WHERE topic_id = ?1",
          rusqlite::params![id_str, now],
        )?;
        let released = conn.execute(
          "UPDATE lecturer_registrations SET status = 'cancelled', updated_at = ?2
           WHERE topic_id = ?1 AND status = 'approved'",
          rusqlite::params![id_str, now],
        )?;
        Ok(released)
      })
      .await?;

    tracing::info!(%topic_id, released_supervisors = released, "topic deleted");
    Ok(())
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn transfer(&self, topic_id: Uuid, request: TransferRequest) -> Result<Topic> {
    let (topic, applied) = self
      .write(move |conn| {
        let mut topic = load_topic(conn, topic_id)?;
        let plan =
          lifecycle::plan_transfer(&topic, &request, Utc::now()).map_err(CoreError::from)?;

        match plan {
          TransferPlan::NoOp => Ok((topic, None)),
          TransferPlan::Apply(applied) => {
            apply_transfer(conn, topic_id, &applied)?;
            applied.apply_to(&mut topic);
            Ok((topic, Some(applied)))
          }
        }
      })
      .await?;

    match applied {
      Some(applied) => tracing::info!(
        %topic_id,
        from = %applied.from,
        to = %applied.to,
        actor = %applied.entry.actor,
        "topic transferred"
      ),
      None => tracing::debug!(%topic_id, "transfer into current review state ignored"),
    }
    Ok(topic)
  }

  async fn phase_history(&self, topic_id: Uuid) -> Result<Vec<PhaseHistoryEntry>> {
    self
      .read(move |conn| {
        load_topic(conn, topic_id)?;
        load_history(conn, &encode_uuid(topic_id))
      })
      .await
  }

  // ── Student admission ─────────────────────────────────────────────────────

  async fn register(&self, request: RegistrationRequest) -> Result<Topic> {
    let (topic, registration, applied) = self
      .write(move |conn| {
        let mut topic = load_topic(conn, request.topic_id)?;
        let (topic_id, student_id) = (request.topic_id, request.student_id);

        let facts = AdmissionFacts {
          previously_rejected: pair_has_status(conn, topic_id, student_id, "'rejected'")?,
          active_on_topic:     pair_has_status(conn, topic_id, student_id, "'pending', 'approved'")?,
          active_elsewhere:    active_elsewhere(conn, student_id, topic_id)?,
          occupancy:           count_approved(conn, &topic)?,
        };
        let status = admission::admit(&topic, &request, &facts)?;

        let now = Utc::now();
        let assigned = request.actor_role != ActorRole::Student;
        let registration = StudentRegistration {
          registration_id:   Uuid::new_v4(),
          topic_id,
          student_id,
          status,
          student_note:      request.student_note,
          lecturer_response: None,
          rejection_reason:  None,
          processed_by:      assigned.then_some(request.actor_id),
          student_role:      None,
          created_at:        now,
          updated_at:        now,
        };
        insert_registration(conn, &registration)?;

        let seat = match status {
          RegistrationStatus::Approved => admission::after_admission(&topic, facts.occupancy),
          _ => None,
        };
        let applied = apply_seat_transition(conn, &mut topic, seat)?;
        Ok((topic, registration, applied))
      })
      .await?;

    tracing::info!(
      topic_id = %topic.topic_id,
      registration_id = %registration.registration_id,
      status = %registration.status,
      "registration created"
    );
    log_seat_transition(topic.topic_id, applied.as_ref());
    Ok(topic)
  }

  async fn approve(
    &self,
    registration_id: Uuid,
    actor_id: Uuid,
    student_role: StudentRole,
    response: Option<String>,
  ) -> Result<StudentRegistration> {
    let (registration, applied) = self
      .write(move |conn| {
        let mut registration = load_registration(conn, registration_id)?;
        let mut topic = load_topic(conn, registration.topic_id)?;

        // Both reads happen under the write lock taken by BEGIN IMMEDIATE.
        let occupancy = count_approved(conn, &topic)?;
        let elsewhere = active_elsewhere(conn, registration.student_id, topic.topic_id)?;
        admission::check_approval(&topic, &registration, occupancy, elsewhere)?;

        registration.status = RegistrationStatus::Approved;
        registration.processed_by = Some(actor_id);
        registration.lecturer_response = response;
        registration.student_role = Some(student_role);
        registration.updated_at = Utc::now();
        update_registration(conn, &registration)?;

        let seat = admission::after_admission(&topic, occupancy);
        let applied = apply_seat_transition(conn, &mut topic, seat)?;
        Ok((registration, applied))
      })
      .await?;

    tracing::info!(
      topic_id = %registration.topic_id,
      %registration_id,
      %actor_id,
      "registration approved"
    );
    log_seat_transition(registration.topic_id, applied.as_ref());
    Ok(registration)
  }

  async fn reject(
    &self,
    registration_id: Uuid,
    actor_id: Uuid,
    reason: RejectionReason,
    response: Option<String>,
  ) -> Result<StudentRegistration> {
    let registration = self
      .write(move |conn| {
        let mut registration = load_registration(conn, registration_id)?;
        load_topic(conn, registration.topic_id)?;
        if registration.status != RegistrationStatus::Pending {
          return Err(CoreError::RegistrationNotPending(registration_id).into());
        }

        registration.status = RegistrationStatus::Rejected;
        registration.rejection_reason = Some(reason);
        registration.processed_by = Some(actor_id);
        registration.lecturer_response = response;
        registration.updated_at = Utc::now();
        update_registration(conn, &registration)?;
        Ok(registration)
      })
      .await?;

    tracing::info!(
      topic_id = %registration.topic_id,
      %registration_id,
      %actor_id,
      reason = %reason,
      "registration rejected"
    );
    Ok(registration)
  }

  async fn cancel(&self, topic_id: Uuid, user_id: Uuid) -> Result<CancelReceipt> {
    let (receipt, applied) = self
      .write(move |conn| {
        let mut topic = load_topic(conn, topic_id)?;

        if let Some(registration) = find_active_registration(conn, topic_id, user_id)? {
          let (registration, applied) =
            release_student(conn, &mut topic, registration, RegistrationStatus::Cancelled, None)?;
          let receipt = CancelReceipt::Student {
            registration_id: registration.registration_id,
            message:         format!("registration for \"{}\" cancelled", topic.title),
          };
          return Ok((receipt, applied));
        }

        let supervision = active_lecturers(conn, topic_id)?
          .into_iter()
          .find(|l| l.lecturer_id == user_id)
          .ok_or(CoreError::NotRegistered { topic_id, user_id })?;
        conn.execute(
          "UPDATE lecturer_registrations SET status = 'cancelled', updated_at = ?2
           WHERE registration_id = ?1",
          rusqlite::params![encode_uuid(supervision.registration_id), encode_dt(Utc::now())],
        )?;
        let receipt = CancelReceipt::Lecturer {
          registration_id: supervision.registration_id,
          message:         format!("supervision of \"{}\" cancelled", topic.title),
        };
        Ok((receipt, None))
      })
      .await?;

    tracing::info!(%topic_id, %user_id, message = receipt.message(), "registration cancelled");
    log_seat_transition(topic_id, applied.as_ref());
    Ok(receipt)
  }

  async fn unassign(
    &self,
    topic_id: Uuid,
    student_id: Uuid,
    actor_id: Uuid,
  ) -> Result<StudentRegistration> {
    let (registration, applied) = self
      .write(move |conn| {
        let mut topic = load_topic(conn, topic_id)?;
        let registration = find_active_registration(conn, topic_id, student_id)?
          .ok_or(CoreError::NotRegistered { topic_id, user_id: student_id })?;

        release_student(conn, &mut topic, registration, RegistrationStatus::Withdrawn, Some(actor_id))
      })
      .await?;

    tracing::info!(
      %topic_id,
      registration_id = %registration.registration_id,
      %actor_id,
      "student withdrawn"
    );
    log_seat_transition(topic_id, applied.as_ref());
    Ok(registration)
  }

  async fn registrations(&self, topic_id: Uuid) -> Result<Vec<StudentRegistration>> {
    self
      .read(move |conn| {
        load_topic(conn, topic_id)?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_REGISTRATION_COLUMNS} FROM student_registrations
           WHERE topic_id = ?1
           ORDER BY rowid"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![encode_uuid(topic_id)], RawStudentRegistration::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawStudentRegistration::into_registration).collect()
      })
      .await
  }

  // ── Supervisors ───────────────────────────────────────────────────────────

  async fn register_lecturer(
    &self,
    topic_id: Uuid,
    lecturer_id: Uuid,
    role: SupervisorRole,
  ) -> Result<LecturerRegistration> {
    let registration = self
      .write(move |conn| {
        load_topic(conn, topic_id)?;
        let active = active_lecturers(conn, topic_id)?;

        if active.iter().any(|l| l.lecturer_id == lecturer_id) {
          return Err(CoreError::AlreadyRegistered { topic_id, user_id: lecturer_id }.into());
        }
        if active.len() >= MAX_SUPERVISORS || active.iter().any(|l| l.role == role) {
          return Err(CoreError::LecturerSlotFull(topic_id).into());
        }

        let now = Utc::now();
        let registration = LecturerRegistration {
          registration_id: Uuid::new_v4(),
          topic_id,
          lecturer_id,
          role,
          status: LecturerRegistrationStatus::Approved,
          created_at: now,
          updated_at: now,
        };
        conn.execute(
          &format!(
            "INSERT INTO lecturer_registrations ({LECTURER_REGISTRATION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            encode_uuid(registration.registration_id),
            encode_uuid(topic_id),
            encode_uuid(lecturer_id),
            role.as_str(),
            registration.status.as_str(),
            encode_dt(now),
            encode_dt(now),
          ],
        )?;
        Ok(registration)
      })
      .await?;

    tracing::info!(%topic_id, %lecturer_id, role = %role, "lecturer registered");
    Ok(registration)
  }

  async fn lecturers(&self, topic_id: Uuid) -> Result<Vec<LecturerRegistration>> {
    self
      .read(move |conn| {
        load_topic(conn, topic_id)?;
        let mut stmt = conn.prepare(&format!(
          "SELECT {LECTURER_REGISTRATION_COLUMNS} FROM lecturer_registrations
           WHERE topic_id = ?1
           ORDER BY rowid"
        ))?;
        let raws = stmt
          .query_map(rusqlite::params![encode_uuid(topic_id)], RawLecturerRegistration::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawLecturerRegistration::into_registration).collect()
      })
      .await
  }

  // ── Capacity ──────────────────────────────────────────────────────────────

  async fn occupancy(&self, topic_id: Uuid) -> Result<Occupancy> {
    self
      .read(move |conn| {
        let topic = load_topic(conn, topic_id)?;
        count_approved(conn, &topic)
      })
      .await
  }
}

/// Move a live registration into a terminal status and, if it held a seat,
/// re-derive the topic status downward.
fn release_student(
  conn: &rusqlite::Connection,
  topic: &mut Topic,
  mut registration: StudentRegistration,
  status: RegistrationStatus,
  processed_by: Option<Uuid>,
) -> Result<(StudentRegistration, Option<AppliedTransfer>)> {
  let held_seat = registration.status == RegistrationStatus::Approved;
  let before = count_approved(conn, topic)?;

  registration.status = status;
  if processed_by.is_some() {
    registration.processed_by = processed_by;
  }
  registration.updated_at = Utc::now();
  update_registration(conn, &registration)?;

  let seat = if held_seat { admission::after_release(topic, before) } else { None };
  let applied = apply_seat_transition(conn, topic, seat)?;
  Ok((registration, applied))
}
