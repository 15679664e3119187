mod generator;
mod prompt;

use std::sync::Arc;

use axum::{debug_handler, extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{extract::AppJson, store::DataStore, AppError, AppResult, AppState};

pub use generator::{Canned, ChatCompletions, GenerateError, Outreach, TextGenerator};

pub fn router() -> Router<AppState> {
    Router::new().route("/ai/message", post(generate_message))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    sender_id: Option<String>,
    receiver_id: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct GenerateResponse {
    message: String,
}

/// Drafts an opening message from the sender to the receiver.
#[debug_handler(state = AppState)]
pub(crate) async fn generate_message(
    State(store): State<DataStore>,
    State(writer): State<Arc<dyn TextGenerator>>,
    AppJson(GenerateRequest { sender_id, receiver_id }): AppJson<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let sender_id = sender_id.ok_or(AppError::MissingParameter("senderId"))?;
    let receiver_id = receiver_id.ok_or(AppError::MissingParameter("receiverId"))?;

    let outreach = {
        let doc = store.read_data().await?;
        let sender = doc.user(&sender_id).ok_or_else(|| AppError::NotFound("Sender".to_owned()))?;
        let receiver = doc.user(&receiver_id).ok_or_else(|| AppError::NotFound("Receiver".to_owned()))?;
        prompt::outreach(sender, doc.profile_for(&sender_id), receiver, doc.profile_for(&receiver_id))
    };

    let message = writer.generate(&outreach).await?;
    info!(%sender_id, %receiver_id, "drafted outreach message");

    Ok(Json(GenerateResponse { message }))
}
