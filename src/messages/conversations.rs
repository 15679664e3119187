use axum::{debug_handler, extract::{Query, State}, Json};
use serde::{Deserialize, Serialize};

use crate::{models::Message, store::DataStore, AppError, AppResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationsQuery {
    user_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConversationSummary {
    conversation_id: String,
    last_message: Message,
    message_count: usize,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn conversations(
    State(store): State<DataStore>,
    Query(ConversationsQuery { user_id }): Query<ConversationsQuery>,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    let user_id = user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(AppError::MissingParameter("userId"))?;

    let doc = store.read_data().await?;
    Ok(Json(summarize(&doc.messages, &user_id)))
}

/// One entry per conversation the user takes part in, ordered by first appearance.
fn summarize(messages: &[Message], user_id: &str) -> Vec<ConversationSummary> {
    let mut summaries: Vec<ConversationSummary> = Vec::new();

    for message in messages.iter().filter(|message| message.involves(user_id)) {
        match summaries.iter_mut().find(|summary| summary.conversation_id == message.conversation_id) {
            Some(summary) => {
                summary.last_message = message.clone();
                summary.message_count += 1;
            }
            None => summaries.push(ConversationSummary {
                conversation_id: message.conversation_id.clone(),
                last_message: message.clone(),
                message_count: 1,
            }),
        }
    }

    summaries
}
