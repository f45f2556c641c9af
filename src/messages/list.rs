use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;

use crate::{extract::User, AppResult, AppState};

use super::{visibility, Message, Messages};

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    limit: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_messages(
    State(messages): State<Messages>,
    User(user): User,
    Query(ListQuery { limit }): Query<ListQuery>,
) -> AppResult<Json<Vec<Message>>> {
    let log = messages.list(None).await?;
    let limit = visibility::parse_limit(limit.as_deref());

    Ok(Json(visibility::feed(log, user.as_deref(), limit)))
}
