mod registry;
mod roster;
pub mod sweep;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub use registry::{Participant, Participants};
pub use sweep::{SweepReport, Sweeper};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", get(roster::list_participants).post(roster::register))
        .route("/status", post(roster::heartbeat))
}
