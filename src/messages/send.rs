use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extract::AppJson, models::{Document, Message, Role}, store::DataStore, AppError, AppResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendMessageRequest {
    conversation_id: Option<String>,
    sender_id: Option<String>,
    receiver_id: Option<String>,
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SentMessage {
    sent_message: Message,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn send_message(
    State(store): State<DataStore>,
    AppJson(request): AppJson<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<SentMessage>)> {
    let (Some(conversation_id), Some(sender_id), Some(receiver_id), Some(text)) = (
        present(request.conversation_id),
        present(request.sender_id),
        present(request.receiver_id),
        present(request.text),
    ) else {
        return Err(AppError::validation(
            "conversationId, senderId, receiverId and text are required",
        ));
    };

    let sent_message = store
        .update(|doc| {
            charge_sender(doc, &sender_id)?;
            let message = Message::new(conversation_id, sender_id, receiver_id, text);
            doc.messages.push(message.clone());
            Ok::<_, AppError>(message)
        })
        .await?;

    info!(conversation_id = %sent_message.conversation_id, message_id = %sent_message.id, "message sent");
    Ok((StatusCode::CREATED, Json(SentMessage { sent_message })))
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Sugar Daddies spend one credit per message. Everyone else messages freely.
fn charge_sender(doc: &mut Document, sender_id: &str) -> AppResult<()> {
    let Some(sender) = doc.user_mut(sender_id) else {
        return Ok(());
    };
    if sender.role != Role::SugarDaddy {
        return Ok(());
    }

    sender.credits = sender.credits.spend_one().ok_or(AppError::InsufficientCredits)?;
    Ok(())
}
