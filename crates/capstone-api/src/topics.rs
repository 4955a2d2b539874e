//! Handlers for `/topics` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/topics` | Body: [`NewTopic`]; returns 201 + the Draft topic |
//! | `GET`    | `/topics/:id` | 404 if missing or deleted |
//! | `DELETE` | `/topics/:id` | Soft delete; 204 |
//! | `POST`   | `/topics/:id/transfer` | Body: [`TransferRequest`] |
//! | `GET`    | `/topics/:id/history` | Oldest entry first |
//! | `GET`    | `/topics/:id/occupancy` | Optional `?seats_left=<n>` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use capstone_core::{
  history::PhaseHistoryEntry,
  lifecycle::TransferRequest,
  store::TopicStore,
  topic::{NewTopic, Topic},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /topics`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTopic>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TopicStore,
{
  let topic = store.create_topic(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(topic)))
}

// ─── Get / delete ─────────────────────────────────────────────────────────────

/// `GET /topics/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Topic>, ApiError>
where
  S: TopicStore,
{
  let topic = store
    .get_topic(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("topic not found: {id}")))?;
  Ok(Json(topic))
}

/// `DELETE /topics/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: TopicStore,
{
  store.delete_topic(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /topics/:id/transfer`, body:
/// `{"target":"submitted","actor_id":"…","period_id":"…"}`
pub async fn transfer<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<TransferRequest>,
) -> Result<Json<Topic>, ApiError>
where
  S: TopicStore,
{
  let topic = store.transfer(id, body).await.map_err(ApiError::store)?;
  Ok(Json(topic))
}

/// `GET /topics/:id/history`
pub async fn history<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<PhaseHistoryEntry>>, ApiError>
where
  S: TopicStore,
{
  let entries = store.phase_history(id).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Capacity ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OccupancyParams {
  pub seats_left: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OccupancyView {
  pub approved:     u32,
  pub max_students: u32,
  pub seats_left:   u32,
  pub is_full:      bool,
  /// Present when `?seats_left=<n>` was asked.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub exactly:      Option<bool>,
}

/// `GET /topics/:id/occupancy[?seats_left=<n>]`
pub async fn occupancy<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<OccupancyParams>,
) -> Result<Json<OccupancyView>, ApiError>
where
  S: TopicStore,
{
  let occupancy = store.occupancy(id).await.map_err(ApiError::store)?;
  Ok(Json(OccupancyView {
    approved:     occupancy.approved,
    max_students: occupancy.max_students,
    seats_left:   occupancy.seats_left(),
    is_full:      occupancy.is_full(),
    exactly:      params.seats_left.map(|n| occupancy.has_exactly_n_seats_left(n)),
  }))
}
