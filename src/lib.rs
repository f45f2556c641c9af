pub mod appresult;
pub mod clock;
pub mod config;
pub mod db;
pub mod extract;
pub mod messages;
pub mod participants;
pub mod validate;

use axum::{extract::FromRef, Router};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult};

use messages::Messages;
use participants::Participants;

/// Both stores share one pool; handlers pull out whichever they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub participants: Participants,
    pub messages: Messages,
}

impl AppState {
    pub fn new(db_pool: SqlitePool) -> Self {
        AppState {
            participants: Participants::new(db_pool.clone()),
            messages: Messages::new(db_pool),
        }
    }
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .merge(participants::router())
        .merge(messages::router())
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
