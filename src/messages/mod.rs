mod edit;
mod list;
mod message;
mod post;
pub mod store;
pub mod visibility;

use axum::{routing::{get, put}, Router};

use crate::AppState;

pub use message::{Message, MessageDraft, MessageKind, ARRIVAL_TEXT, BROADCAST, DEPARTURE_TEXT};
pub use store::Messages;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list::list_messages).post(post::post_message))
        .route("/messages/{message_id}", put(edit::edit_message).delete(edit::delete_message))
}
