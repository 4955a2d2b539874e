//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums use their snake_case `as_str` form.

use capstone_core::{
  history::{Actor, PhaseHistoryEntry},
  registration::{LecturerRegistration, StudentRegistration},
  topic::Topic,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Counters ─────────────────────────────────────────────────────────────────

fn decode_version(v: i64) -> Result<u64> {
  u64::try_from(v).map_err(|_| Error::Corrupt(format!("negative topic version {v}")))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

/// Parse a column through the type's `FromStr`, surfacing the core error.
fn decode<T>(s: &str) -> Result<T>
where
  T: std::str::FromStr<Err = capstone_core::Error>,
{
  Ok(s.parse()?)
}

fn decode_opt<T>(s: Option<String>) -> Result<Option<T>>
where
  T: std::str::FromStr<Err = capstone_core::Error>,
{
  s.as_deref().map(decode).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const TOPIC_COLUMNS: &str = "topic_id, title, category, max_students, \
   allow_manual_approval, current_status, current_phase, period_id, created_by, \
   created_at, version";

/// Raw values read directly from a `topics` row.
pub struct RawTopic {
  pub topic_id:              String,
  pub title:                 String,
  pub category:              String,
  pub max_students:          u32,
  pub allow_manual_approval: bool,
  pub current_status:        String,
  pub current_phase:         Option<String>,
  pub period_id:             Option<String>,
  pub created_by:            String,
  pub created_at:            String,
  pub version:               i64,
}

impl RawTopic {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      topic_id:              row.get(0)?,
      title:                 row.get(1)?,
      category:              row.get(2)?,
      max_students:          row.get(3)?,
      allow_manual_approval: row.get(4)?,
      current_status:        row.get(5)?,
      current_phase:         row.get(6)?,
      period_id:             row.get(7)?,
      created_by:            row.get(8)?,
      created_at:            row.get(9)?,
      version:               row.get(10)?,
    })
  }

  pub fn into_topic(self, phase_histories: Vec<PhaseHistoryEntry>) -> Result<Topic> {
    Ok(Topic {
      topic_id: decode_uuid(&self.topic_id)?,
      title: self.title,
      category: decode(&self.category)?,
      max_students: self.max_students,
      allow_manual_approval: self.allow_manual_approval,
      current_status: decode(&self.current_status)?,
      current_phase: decode_opt(self.current_phase)?,
      period_id: decode_opt_uuid(self.period_id)?,
      created_by: decode_uuid(&self.created_by)?,
      created_at: decode_dt(&self.created_at)?,
      version: decode_version(self.version)?,
      phase_histories,
    })
  }
}

/// Raw values read directly from a `phase_history` row.
pub struct RawHistoryEntry {
  pub phase:       Option<String>,
  pub status:      String,
  pub actor:       String,
  pub note:        Option<String>,
  pub recorded_at: String,
}

impl RawHistoryEntry {
  pub fn into_entry(self) -> Result<PhaseHistoryEntry> {
    Ok(PhaseHistoryEntry {
      phase:       decode_opt(self.phase)?,
      status:      decode(&self.status)?,
      actor:       decode::<Actor>(&self.actor)?,
      note:        self.note,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

pub const STUDENT_REGISTRATION_COLUMNS: &str = "registration_id, topic_id, student_id, \
   status, student_note, lecturer_response, rejection_reason, processed_by, student_role, \
   created_at, updated_at";

/// Raw strings read directly from a `student_registrations` row.
pub struct RawStudentRegistration {
  pub registration_id:   String,
  pub topic_id:          String,
  pub student_id:        String,
  pub status:            String,
  pub student_note:      Option<String>,
  pub lecturer_response: Option<String>,
  pub rejection_reason:  Option<String>,
  pub processed_by:      Option<String>,
  pub student_role:      Option<String>,
  pub created_at:        String,
  pub updated_at:        String,
}

impl RawStudentRegistration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      registration_id:   row.get(0)?,
      topic_id:          row.get(1)?,
      student_id:        row.get(2)?,
      status:            row.get(3)?,
      student_note:      row.get(4)?,
      lecturer_response: row.get(5)?,
      rejection_reason:  row.get(6)?,
      processed_by:      row.get(7)?,
      student_role:      row.get(8)?,
      created_at:        row.get(9)?,
      updated_at:        row.get(10)?,
    })
  }

  pub fn into_registration(self) -> Result<StudentRegistration> {
    Ok(StudentRegistration {
      registration_id:   decode_uuid(&self.registration_id)?,
      topic_id:          decode_uuid(&self.topic_id)?,
      student_id:        decode_uuid(&self.student_id)?,
      status:            decode(&self.status)?,
      student_note:      self.student_note,
      lecturer_response: self.lecturer_response,
      rejection_reason:  decode_opt(self.rejection_reason)?,
      processed_by:      decode_opt_uuid(self.processed_by)?,
      student_role:      decode_opt(self.student_role)?,
      created_at:        decode_dt(&self.created_at)?,
      updated_at:        decode_dt(&self.updated_at)?,
    })
  }
}

pub const LECTURER_REGISTRATION_COLUMNS: &str =
  "registration_id, topic_id, lecturer_id, role, status, created_at, updated_at";

/// Raw strings read directly from a `lecturer_registrations` row.
pub struct RawLecturerRegistration {
  pub registration_id: String,
  pub topic_id:        String,
  pub lecturer_id:     String,
  pub role:            String,
  pub status:          String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawLecturerRegistration {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      registration_id: row.get(0)?,
      topic_id:        row.get(1)?,
      lecturer_id:     row.get(2)?,
      role:            row.get(3)?,
      status:          row.get(4)?,
      created_at:      row.get(5)?,
      updated_at:      row.get(6)?,
    })
  }

  pub fn into_registration(self) -> Result<LecturerRegistration> {
    Ok(LecturerRegistration {
      registration_id: decode_uuid(&self.registration_id)?,
      topic_id:        decode_uuid(&self.topic_id)?,
      lecturer_id:     decode_uuid(&self.lecturer_id)?,
      role:            decode(&self.role)?,
      status:          decode(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}
