use std::sync::Arc;

use axum::{body::Bytes, debug_handler, extract::{Path, State}, Json};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{models::Credits, session, store::DataStore, AppError, AppResult, AppState};

use super::{catalog, PaymentGateway};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CaptureRequest {
    user_id: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn capture_order(
    State(store): State<DataStore>,
    State(payments): State<Arc<dyn PaymentGateway>>,
    Path(order_id): Path<String>,
    session: Session,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let request: CaptureRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CaptureRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|err| AppError::validation(format!("malformed body: {err}")))?
    };

    let order = payments.capture_order(&order_id).await.inspect_err(|err| {
        if err.is_declined() {
            warn!(%order_id, "instrument declined, client may retry the same order");
        }
    })?;

    if !order.is_completed() {
        return Err(AppError::Upstream {
            message: format!("Order {order_id} was not completed (status {})", order.status),
            details: None,
        });
    }

    let product = order
        .reference_id
        .as_deref()
        .and_then(catalog::product)
        .ok_or_else(|| AppError::Upstream {
            message: format!("Order {order_id} is not for a known product"),
            details: None,
        })?;

    let user_id = match order.custom_id.clone().or(request.user_id) {
        Some(user_id) => user_id,
        None => session::require_user_id(&session).await?,
    };

    let credits = store
        .update(|doc| {
            let user = doc.user_mut(&user_id).ok_or_else(|| AppError::NotFound("User".to_owned()))?;
            user.credits = user.credits.grant(product.grant);
            Ok::<Credits, AppError>(user.credits)
        })
        .await?;

    info!(%order_id, sku = product.sku, %user_id, %credits, "order captured");
    Ok(Json(order.body))
}
