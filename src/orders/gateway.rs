use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{config::PaypalConfig, AppError};

/// Issue code the provider reports when the buyer's card or account is refused.
pub const INSTRUMENT_DECLINED: &str = "INSTRUMENT_DECLINED";

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub reference_id: String,
    pub custom_id: String,
    pub description: String,
    pub currency: String,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub status: String,
    pub reference_id: Option<String>,
    pub custom_id: Option<String>,
    /// Provider response, handed to the client untouched.
    pub body: Value,
}

impl GatewayOrder {
    pub fn from_body(body: Value) -> Self {
        let unit = &body["purchase_units"][0];
        let text = |value: &Value| value.as_str().map(str::to_owned);

        Self {
            id: text(&body["id"]).unwrap_or_default(),
            status: text(&body["status"]).unwrap_or_default(),
            reference_id: text(&unit["reference_id"]),
            custom_id: text(&unit["custom_id"])
                .or_else(|| text(&unit["payments"]["captures"][0]["custom_id"])),
            body,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == "COMPLETED"
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider is not configured")]
    NotConfigured,

    #[error("{message}")]
    Provider { status: u16, message: String, details: Value },

    #[error("Payment provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PaymentError {
    pub fn is_declined(&self) -> bool {
        match self {
            PaymentError::Provider { details, .. } => details
                .as_array()
                .is_some_and(|details| details.iter().any(|d| d["issue"] == INSTRUMENT_DECLINED)),
            _ => false,
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        let details = match &err {
            PaymentError::Provider { details, .. } if !details.is_null() => Some(details.clone()),
            _ => None,
        };
        AppError::Upstream { message: err.to_string(), details }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError>;

    async fn capture_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentError>;
}

/// Stand-in used when no PayPal credentials are configured.
pub struct Unconfigured;

#[async_trait]
impl PaymentGateway for Unconfigured {
    async fn create_order(&self, _request: &OrderRequest) -> Result<GatewayOrder, PaymentError> {
        Err(PaymentError::NotConfigured)
    }

    async fn capture_order(&self, _order_id: &str) -> Result<GatewayOrder, PaymentError> {
        Err(PaymentError::NotConfigured)
    }
}

/// PayPal Orders v2 over REST.
pub struct PaypalGateway {
    client: reqwest::Client,
    config: PaypalConfig,
}

impl PaypalGateway {
    pub fn new(client: reqwest::Client, config: PaypalConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_base.trim_end_matches('/'))
    }

    async fn access_token(&self) -> Result<String, PaymentError> {
        let response = self.client
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let body = read(response).await?;
        body["access_token"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| PaymentError::Provider {
                status: 500,
                message: "Token response carried no access_token".to_owned(),
                details: Value::Null,
            })
    }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError> {
        let token = self.access_token().await?;
        let payload = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": request.reference_id,
                "custom_id": request.custom_id,
                "description": request.description,
                "amount": {
                    "currency_code": request.currency,
                    "value": request.amount,
                },
            }],
        });

        let response = self.client
            .post(self.url("/v2/checkout/orders"))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;

        let order = GatewayOrder::from_body(read(response).await?);
        debug!(order_id = %order.id, status = %order.status, "created order");
        Ok(order)
    }

    async fn capture_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentError> {
        let token = self.access_token().await?;
        let response = self.client
            .post(self.url(&format!("/v2/checkout/orders/{order_id}/capture")))
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let order = GatewayOrder::from_body(read(response).await?);
        debug!(order_id = %order.id, status = %order.status, "captured order");
        Ok(order)
    }
}

async fn read(response: reqwest::Response) -> Result<Value, PaymentError> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(body);
    }

    let message = body["message"]
        .as_str()
        .or_else(|| body["error_description"].as_str())
        .or_else(|| body["name"].as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Payment provider answered {status}"));
    warn!(%status, %message, "payment provider rejected request");

    Err(PaymentError::Provider {
        status: status.as_u16(),
        message,
        details: body["details"].clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_capture_response() {
        let order = GatewayOrder::from_body(json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "credits_10",
                "payments": { "captures": [{ "id": "3C679366HH908993F", "custom_id": "u1" }] }
            }]
        }));

        assert!(order.is_completed());
        assert_eq!(order.reference_id.as_deref(), Some("credits_10"));
        assert_eq!(order.custom_id.as_deref(), Some("u1"));
    }

    #[test]
    fn spots_declined_instrument() {
        let err = PaymentError::Provider {
            status: 422,
            message: "The requested action could not be performed".into(),
            details: json!([{ "issue": "INSTRUMENT_DECLINED", "description": "declined" }]),
        };
        assert!(err.is_declined());
        assert!(!PaymentError::NotConfigured.is_declined());

        match AppError::from(err) {
            AppError::Upstream { details: Some(details), .. } => assert_eq!(details[0]["issue"], INSTRUMENT_DECLINED),
            other => panic!("unexpected {other:?}"),
        }
    }

    mod paypal {
        use axum::{extract::Path, http::{HeaderMap, StatusCode}, routing::post, Json, Router};

        use super::*;

        const BASIC: &str = "Basic Y2xpZW50OnNlY3JldA==";
        const BEARER: &str = "Bearer sandbox-token";

        fn header_is(headers: &HeaderMap, expected: &str) -> bool {
            headers.get(header::AUTHORIZATION).is_some_and(|value| value.as_bytes() == expected.as_bytes())
        }

        async fn token(headers: HeaderMap, body: String) -> (StatusCode, Json<Value>) {
            if !header_is(&headers, BASIC) || body != "grant_type=client_credentials" {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "invalid_client", "error_description": "Client Authentication failed" })),
                );
            }
            (StatusCode::OK, Json(json!({ "access_token": "sandbox-token", "token_type": "Bearer" })))
        }

        async fn create(headers: HeaderMap, Json(order): Json<Value>) -> (StatusCode, Json<Value>) {
            if !header_is(&headers, BEARER) {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "name": "AUTHENTICATION_FAILURE" })));
            }
            let unit = &order["purchase_units"][0];
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": "ORDER-9",
                    "status": "CREATED",
                    "purchase_units": [{
                        "reference_id": unit["reference_id"],
                        "custom_id": unit["custom_id"],
                        "amount": unit["amount"],
                    }],
                })),
            )
        }

        async fn capture(headers: HeaderMap, Path(id): Path<String>) -> (StatusCode, Json<Value>) {
            if !header_is(&headers, BEARER) {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "name": "AUTHENTICATION_FAILURE" })));
            }
            if id == "DECLINED" {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({
                        "name": "UNPROCESSABLE_ENTITY",
                        "message": "The requested action could not be performed",
                        "details": [{ "issue": INSTRUMENT_DECLINED, "description": "The instrument was declined" }],
                    })),
                );
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": id,
                    "status": "COMPLETED",
                    "purchase_units": [{
                        "reference_id": "credits_50",
                        "payments": { "captures": [{ "id": "CAP-1", "custom_id": "u7" }] },
                    }],
                })),
            )
        }

        /// A sandbox stand-in on an ephemeral port.
        async fn sandbox(client_id: &str) -> PaypalGateway {
            let router = Router::new()
                .route("/v1/oauth2/token", post(token))
                .route("/v2/checkout/orders", post(create))
                .route("/v2/checkout/orders/{id}/capture", post(capture));

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let address = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

            PaypalGateway::new(reqwest::Client::new(), PaypalConfig {
                api_base: format!("http://{address}/"),
                client_id: client_id.to_owned(),
                client_secret: "secret".to_owned(),
            })
        }

        fn order_request() -> OrderRequest {
            OrderRequest {
                reference_id: "credits_50".into(),
                custom_id: "u7".into(),
                description: "50 credits".into(),
                currency: "USD".into(),
                amount: "39.99".into(),
            }
        }

        #[tokio::test]
        async fn creates_with_exchanged_token() {
            let gateway = sandbox("client").await;

            let order = gateway.create_order(&order_request()).await.unwrap();
            assert_eq!(order.id, "ORDER-9");
            assert_eq!(order.status, "CREATED");
            assert_eq!(order.reference_id.as_deref(), Some("credits_50"));
            assert_eq!(order.custom_id.as_deref(), Some("u7"));
            assert_eq!(order.body["purchase_units"][0]["amount"]["value"], "39.99");
            assert_eq!(order.body["purchase_units"][0]["amount"]["currency_code"], "USD");
        }

        #[tokio::test]
        async fn capture_reads_custom_id_from_captures() {
            let gateway = sandbox("client").await;

            let order = gateway.capture_order("ORDER-9").await.unwrap();
            assert!(order.is_completed());
            assert_eq!(order.custom_id.as_deref(), Some("u7"));
        }

        #[tokio::test]
        async fn declined_capture_keeps_provider_details() {
            let gateway = sandbox("client").await;

            let err = gateway.capture_order("DECLINED").await.unwrap_err();
            assert!(err.is_declined());
            match err {
                PaymentError::Provider { status, message, details } => {
                    assert_eq!(status, 422);
                    assert_eq!(message, "The requested action could not be performed");
                    assert_eq!(details[0]["issue"], INSTRUMENT_DECLINED);
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        #[tokio::test]
        async fn rejected_credentials_surface_the_description() {
            let gateway = sandbox("someone-else").await;

            match gateway.create_order(&order_request()).await {
                Err(PaymentError::Provider { status, message, details }) => {
                    assert_eq!(status, 401);
                    assert_eq!(message, "Client Authentication failed");
                    assert!(details.is_null());
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
