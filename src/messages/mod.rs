mod conversations;
mod list;
mod send;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list::list_messages).post(send::send_message))
        .route("/conversations", get(conversations::conversations))
}
