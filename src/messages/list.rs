use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;

use crate::{models::Message, store::DataStore, AppError, AppResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesQuery {
    conversation_id: Option<String>,
}

/// Messages of one conversation, in the order they were stored.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn list_messages(
    State(store): State<DataStore>,
    Query(ListMessagesQuery { conversation_id }): Query<ListMessagesQuery>,
) -> AppResult<Json<Vec<Message>>> {
    let conversation_id = conversation_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AppError::MissingParameter("conversationId"))?;

    let doc = store.read_data().await?;
    Ok(Json(doc.conversation(&conversation_id)))
}
