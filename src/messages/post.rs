use axum::{debug_handler, extract::{rejection::JsonRejection, State}, http::StatusCode, Json};
use tracing::debug;

use crate::{
    extract::{json_body, User},
    participants::Participants,
    validate::{MessageBody, Violations},
    AppResult, AppState,
};

use super::Messages;

#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(participants): State<Participants>,
    State(messages): State<Messages>,
    User(user): User,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> AppResult<StatusCode> {
    let Some(from) = user else {
        return Err(Violations::single("user", "is required").into());
    };
    if !participants.exists(&from).await? {
        return Err(Violations::single("user", "must be a registered participant").into());
    }

    let draft = json_body(body)?.validate(Some(from))?;
    let message = messages.append(draft).await?;
    debug!(id = %message.id, from = %message.from, kind = %message.kind, "message posted");

    Ok(StatusCode::CREATED)
}
