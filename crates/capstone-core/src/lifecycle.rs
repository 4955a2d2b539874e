//! Topic lifecycle engine.
//!
//! A transfer is planned here, against a snapshot of the topic, and the
//! resulting [`AppliedTransfer`] is written by the store inside the same
//! transaction that read the snapshot. Planning never touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  history::{Actor, PhaseHistoryEntry},
  status::{Phase, TopicStatus},
  topic::Topic,
  transition::{TransitionError, is_legal},
};

/// Input to [`crate::store::TopicStore::transfer`].
///
/// A manual transfer is always made by a person. The ledger entry records
/// `Actor::User(actor_id)`; only [`plan_system_transfer`] writes
/// [`Actor::System`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
  pub target:    TopicStatus,
  pub actor_id:  Uuid,
  #[serde(default)]
  pub note:      Option<String>,
  /// Supplied only when the topic is being submitted into a period.
  #[serde(default)]
  pub period_id: Option<Uuid>,
}

impl TransferRequest {
  pub fn new(target: TopicStatus, actor_id: Uuid) -> Self {
    Self { target, actor_id, note: None, period_id: None }
  }

  pub fn with_note(mut self, note: impl Into<String>) -> Self {
    self.note = Some(note.into());
    self
  }

  pub fn into_period(mut self, period_id: Uuid) -> Self {
    self.period_id = Some(period_id);
    self
  }
}

/// The outcome of planning a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferPlan {
  /// Re-entering review; nothing is written.
  NoOp,
  Apply(AppliedTransfer),
}

/// Everything a transfer changes on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTransfer {
  pub from:      TopicStatus,
  pub to:        TopicStatus,
  pub phase:     Option<Phase>,
  pub period_id: Option<Uuid>,
  pub entry:     PhaseHistoryEntry,
}

impl AppliedTransfer {
  /// Fold the transfer into an in-memory topic.
  pub fn apply_to(&self, topic: &mut Topic) {
    topic.current_status = self.to;
    topic.current_phase = self.phase;
    topic.period_id = self.period_id;
    topic.version += 1;
    topic.phase_histories.push(self.entry.clone());
  }
}

/// Plan a manually requested transfer.
///
/// Asking for the status the topic is already in fails with a
/// state-specific [`TransitionError::AlreadyInState`], except for
/// [`TopicStatus::UnderReview`], which is a silent no-op.
pub fn plan_transfer(
  topic: &Topic,
  request: &TransferRequest,
  now: DateTime<Utc>,
) -> Result<TransferPlan, TransitionError> {
  let current = topic.current_status;
  let target = request.target;

  if target == current {
    return match target {
      TopicStatus::UnderReview => Ok(TransferPlan::NoOp),
      _ => Err(TransitionError::AlreadyInState(current)),
    };
  }

  if !is_legal(current, target) {
    return Err(TransitionError::Illegal { from: current, to: target });
  }

  let (mut phase, mut period_id) = match request.period_id {
    Some(period_id) => (Some(Phase::Submit), Some(period_id)),
    None => (topic.current_phase, topic.period_id),
  };

  let entry = PhaseHistoryEntry {
    phase,
    status: target,
    actor: Actor::User(request.actor_id),
    note: request.note.clone(),
    recorded_at: now,
  };

  // Returning to Draft detaches the topic from its period. The trail stays.
  if target == TopicStatus::Draft {
    phase = None;
    period_id = None;
  }

  Ok(TransferPlan::Apply(AppliedTransfer { from: current, to: target, phase, period_id, entry }))
}

/// Plan a capacity-driven transfer. These edges are safe by construction
/// and skip the graph.
pub fn plan_system_transfer(
  topic: &Topic,
  target: TopicStatus,
  cause: String,
  now: DateTime<Utc>,
) -> AppliedTransfer {
  AppliedTransfer {
    from:      topic.current_status,
    to:        target,
    phase:     topic.current_phase,
    period_id: topic.period_id,
    entry:     PhaseHistoryEntry {
      phase:       topic.current_phase,
      status:      target,
      actor:       Actor::System,
      note:        Some(cause),
      recorded_at: now,
    },
  }
}
