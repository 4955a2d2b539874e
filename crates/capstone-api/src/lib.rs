//! JSON REST API for the capstone topic core.
//!
//! Exposes an axum [`Router`] backed by any [`capstone_core::store::TopicStore`].
//! Authentication is the caller's responsibility: actor ids and roles arrive
//! in request bodies and are recorded, never verified.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", capstone_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod registrations;
pub mod topics;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use capstone_core::store::TopicStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CAPSTONE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  pub store_path:      PathBuf,
  /// How long a write waits on another writer before failing with 503.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 { 5_000 }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: TopicStore + 'static,
{
  Router::new()
    // Topics and lifecycle
    .route("/topics", post(topics::create::<S>))
    .route("/topics/{id}", get(topics::get_one::<S>).delete(topics::delete_one::<S>))
    .route("/topics/{id}/transfer", post(topics::transfer::<S>))
    .route("/topics/{id}/history", get(topics::history::<S>))
    .route("/topics/{id}/occupancy", get(topics::occupancy::<S>))
    // Admission
    .route(
      "/topics/{id}/registrations",
      get(registrations::list::<S>).post(registrations::register::<S>),
    )
    .route("/topics/{id}/cancel", post(registrations::cancel::<S>))
    .route("/topics/{id}/unassign", post(registrations::unassign::<S>))
    .route("/registrations/{id}/approve", post(registrations::approve::<S>))
    .route("/registrations/{id}/reject", post(registrations::reject::<S>))
    // Supervisors
    .route(
      "/topics/{id}/lecturers",
      get(registrations::list_lecturers::<S>).post(registrations::register_lecturer::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}
