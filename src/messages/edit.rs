use axum::{debug_handler, extract::{rejection::JsonRejection, Path, State}, http::StatusCode, Json};
use tracing::debug;

use crate::{
    extract::{json_body, User},
    validate::MessageBody,
    AppResult, AppState,
};

use super::Messages;

#[debug_handler(state = AppState)]
pub(crate) async fn edit_message(
    State(messages): State<Messages>,
    Path(message_id): Path<String>,
    User(user): User,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> AppResult<StatusCode> {
    let patch = json_body(body)?.validate(user)?;
    let requester = patch.from.clone();

    messages.edit(&message_id, &requester, patch).await?;
    debug!(id = %message_id, by = %requester, "message edited");

    Ok(StatusCode::ACCEPTED)
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    State(messages): State<Messages>,
    Path(message_id): Path<String>,
    User(user): User,
) -> AppResult<StatusCode> {
    messages.delete(&message_id, user.as_deref()).await?;
    debug!(id = %message_id, "message deleted");

    Ok(StatusCode::OK)
}
