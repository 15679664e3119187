//! Credit purchases. An order is created against the payment provider
//! (`CREATED`), then captured. Once the provider reports it `COMPLETED`,
//! the SKU's credit grant lands on the buyer's balance.

pub mod catalog;
mod capture;
mod create;
pub mod gateway;

use axum::{routing::post, Router};

use crate::AppState;

pub use gateway::{GatewayOrder, OrderRequest, PaymentError, PaymentGateway, PaypalGateway, Unconfigured};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create::create_order))
        .route("/orders/{id}/capture", post(capture::capture_order))
}
