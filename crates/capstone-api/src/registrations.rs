//! Handlers for student and lecturer registrations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/topics/:id/registrations` | Student registrations, oldest first |
//! | `POST` | `/topics/:id/registrations` | Body: [`RegisterBody`]; returns 201 + the topic |
//! | `POST` | `/topics/:id/cancel` | Body: `{"user_id":"…"}` |
//! | `POST` | `/topics/:id/unassign` | Body: `{"student_id":"…","actor_id":"…"}` |
//! | `POST` | `/registrations/:id/approve` | Body: [`ApproveBody`] |
//! | `POST` | `/registrations/:id/reject` | Body: [`RejectBody`] |
//! | `GET`  | `/topics/:id/lecturers` | Lecturer registrations, oldest first |
//! | `POST` | `/topics/:id/lecturers` | Body: `{"lecturer_id":"…","role":"main"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use capstone_core::{
  history::ActorRole,
  registration::{
    CancelReceipt, LecturerRegistration, RegistrationRequest, RejectionReason,
    StudentRegistration, StudentRole, SupervisorRole,
  },
  store::TopicStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Students ─────────────────────────────────────────────────────────────────

/// `GET /topics/:id/registrations`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<StudentRegistration>>, ApiError>
where
  S: TopicStore,
{
  let registrations = store.registrations(id).await.map_err(ApiError::store)?;
  Ok(Json(registrations))
}

/// JSON body accepted by `POST /topics/:id/registrations`.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub student_id:   Uuid,
  /// Defaults to the student themself.
  pub actor_id:     Option<Uuid>,
  #[serde(default = "student_role")]
  pub actor_role:   ActorRole,
  pub student_note: Option<String>,
}

fn student_role() -> ActorRole { ActorRole::Student }

/// `POST /topics/:id/registrations`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TopicStore,
{
  let request = RegistrationRequest {
    topic_id:     id,
    student_id:   body.student_id,
    actor_id:     body.actor_id.unwrap_or(body.student_id),
    actor_role:   body.actor_role,
    student_note: body.student_note,
  };
  let topic = store.register(request).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(topic)))
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
  pub actor_id:     Uuid,
  pub student_role: StudentRole,
  pub response:     Option<String>,
}

/// `POST /registrations/:id/approve`
pub async fn approve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ApproveBody>,
) -> Result<Json<StudentRegistration>, ApiError>
where
  S: TopicStore,
{
  let registration = store
    .approve(id, body.actor_id, body.student_role, body.response)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(registration))
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
  pub actor_id: Uuid,
  pub reason:   RejectionReason,
  pub response: Option<String>,
}

/// `POST /registrations/:id/reject`
pub async fn reject<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RejectBody>,
) -> Result<Json<StudentRegistration>, ApiError>
where
  S: TopicStore,
{
  let registration = store
    .reject(id, body.actor_id, body.reason, body.response)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(registration))
}

#[derive(Debug, Deserialize)]
pub struct CancelBody {
  pub user_id: Uuid,
}

/// `POST /topics/:id/cancel`
pub async fn cancel<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<CancelBody>,
) -> Result<Json<CancelReceipt>, ApiError>
where
  S: TopicStore,
{
  let receipt = store.cancel(id, body.user_id).await.map_err(ApiError::store)?;
  Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
pub struct UnassignBody {
  pub student_id: Uuid,
  pub actor_id:   Uuid,
}

/// `POST /topics/:id/unassign`
pub async fn unassign<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UnassignBody>,
) -> Result<Json<StudentRegistration>, ApiError>
where
  S: TopicStore,
{
  let registration = store
    .unassign(id, body.student_id, body.actor_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(registration))
}

// ─── Lecturers ────────────────────────────────────────────────────────────────

/// `GET /topics/:id/lecturers`
pub async fn list_lecturers<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<LecturerRegistration>>, ApiError>
where
  S: TopicStore,
{
  let lecturers = store.lecturers(id).await.map_err(ApiError::store)?;
  Ok(Json(lecturers))
}

#[derive(Debug, Deserialize)]
pub struct LecturerBody {
  pub lecturer_id: Uuid,
  pub role:        SupervisorRole,
}

/// `POST /topics/:id/lecturers`
pub async fn register_lecturer<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<LecturerBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: TopicStore,
{
  let registration = store
    .register_lecturer(id, body.lecturer_id, body.role)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(registration)))
}
