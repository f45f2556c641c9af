use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, Json};

use crate::{
    extract::{json_body, User},
    validate::NewParticipant,
    AppError, AppResult, AppState,
};

use super::{Participant, Participants};

#[debug_handler(state = AppState)]
pub(crate) async fn list_participants(
    State(participants): State<Participants>,
) -> AppResult<Json<Vec<Participant>>> {
    Ok(Json(participants.list().await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(participants): State<Participants>,
    body: Result<Json<NewParticipant>, JsonRejection>,
) -> AppResult<StatusCode> {
    let registration = json_body(body)?.validate()?;
    participants.register(registration).await?;

    Ok(StatusCode::CREATED)
}

#[debug_handler(state = AppState)]
pub(crate) async fn heartbeat(
    State(participants): State<Participants>,
    User(user): User,
) -> AppResult<StatusCode> {
    let Some(name) = user else {
        return Err(AppError::NotFound("participant without a name".to_owned()));
    };
    participants.heartbeat(&name).await?;

    Ok(StatusCode::OK)
}
