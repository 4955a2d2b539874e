//! SQL schema for the capstone SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS topics (
    topic_id              TEXT PRIMARY KEY,
    title                 TEXT NOT NULL,
    category              TEXT NOT NULL,
    max_students          INTEGER NOT NULL CHECK (max_students >= 1),
    allow_manual_approval INTEGER NOT NULL DEFAULT 0,
    current_status        TEXT NOT NULL,
    current_phase         TEXT,            -- NULL when detached from a period
    period_id             TEXT,
    created_by            TEXT NOT NULL,
    created_at            TEXT NOT NULL,
    version               INTEGER NOT NULL DEFAULT 0,
    deleted_at            TEXT             -- soft delete
);

-- The audit trail. Strictly append-only; rowid order is temporal order.
CREATE TABLE IF NOT EXISTS phase_history (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id    TEXT NOT NULL REFERENCES topics(topic_id),
    phase       TEXT,
    status      TEXT NOT NULL,     -- the status the topic moved into
    actor       TEXT NOT NULL,     -- user UUID or 'system'
    note        TEXT,
    recorded_at TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS phase_history_no_update
BEFORE UPDATE ON phase_history
BEGIN
    SELECT RAISE(ABORT, 'phase_history is append-only');
END;

CREATE TRIGGER IF NOT EXISTS phase_history_no_delete
BEFORE DELETE ON phase_history
BEGIN
    SELECT RAISE(ABORT, 'phase_history is append-only');
END;

CREATE TABLE IF NOT EXISTS student_registrations (
    registration_id   TEXT PRIMARY KEY,
    topic_id          TEXT NOT NULL REFERENCES topics(topic_id),
    student_id        TEXT NOT NULL,
    status            TEXT NOT NULL,   -- pending | approved | rejected | cancelled | withdrawn
    student_note      TEXT,
    lecturer_response TEXT,
    rejection_reason  TEXT,
    processed_by      TEXT,
    student_role      TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

-- At most one live registration per (topic, student).
CREATE UNIQUE INDEX IF NOT EXISTS student_registrations_active_idx
    ON student_registrations(topic_id, student_id)
    WHERE status IN ('pending', 'approved');

CREATE INDEX IF NOT EXISTS student_registrations_student_idx
    ON student_registrations(student_id, status);

CREATE TABLE IF NOT EXISTS lecturer_registrations (
    registration_id TEXT PRIMARY KEY,
    topic_id        TEXT NOT NULL REFERENCES topics(topic_id),
    lecturer_id     TEXT NOT NULL,
    role            TEXT NOT NULL,     -- main | co_supervisor
    status          TEXT NOT NULL,     -- approved | cancelled
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

-- One lecturer per supervisor slot.
CREATE UNIQUE INDEX IF NOT EXISTS lecturer_registrations_role_idx
    ON lecturer_registrations(topic_id, role)
    WHERE status = 'approved';

CREATE INDEX IF NOT EXISTS phase_history_topic_idx ON phase_history(topic_id, seq);

PRAGMA user_version = 1;
";
