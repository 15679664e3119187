use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use tracing::info;

use crate::{extract::AppJson, session, store::DataStore, AppError, AppResult, AppState};

use super::{catalog, OrderRequest, PaymentGateway};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateOrderRequest {
    product_id: Option<String>,
    user_id: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_order(
    State(store): State<DataStore>,
    State(payments): State<Arc<dyn PaymentGateway>>,
    session: Session,
    AppJson(CreateOrderRequest { product_id, user_id }): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let product = product_id
        .as_deref()
        .and_then(catalog::product)
        .ok_or_else(|| AppError::validation("Invalid product ID"))?;

    let user_id = match user_id {
        Some(user_id) => user_id,
        None => session::require_user_id(&session).await?,
    };
    if store.read_data().await?.user(&user_id).is_none() {
        return Err(AppError::NotFound("User".to_owned()));
    }

    let order = payments
        .create_order(&OrderRequest {
            reference_id: product.sku.to_owned(),
            custom_id: user_id.clone(),
            description: product.description.to_owned(),
            currency: catalog::CURRENCY.to_owned(),
            amount: product.price.to_owned(),
        })
        .await?;

    info!(order_id = %order.id, sku = product.sku, user_id = %user_id, "order created");
    Ok((StatusCode::CREATED, Json(order.body)))
}
