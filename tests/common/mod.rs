#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sugarkisses::{
    app,
    config::Config,
    orders::{GatewayOrder, OrderRequest, PaymentError, PaymentGateway},
    AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub dir: TempDir,
}

pub fn test_app() -> TestApp {
    test_app_with(|_| {})
}

pub fn test_app_with(customize: impl FnOnce(&mut AppState)) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    write_document(&dir, None);

    let mut config = Config::local(dir.path().join("data"), dir.path().join("uploads"));
    config.bcrypt_cost = 4;

    let mut state = AppState::from_config(config).expect("state");
    customize(&mut state);

    TestApp { router: app(state.clone()), state, dir }
}

/// Pre-populates the document file. `None` leaves the store empty so it seeds itself.
pub fn write_document(dir: &TempDir, content: Option<&str>) {
    let data = dir.path().join("data");
    std::fs::create_dir_all(&data).expect("data dir");
    if let Some(content) = content {
        std::fs::write(data.join("db.json"), content).expect("document");
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub bytes: Vec<u8>,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.expect("body").to_bytes().to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Reply { status, headers, body, bytes }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.send(request(Method::GET, uri, cookie).body(Body::empty()).unwrap()).await
    }

    pub async fn json(&self, method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Reply {
        self.send(
            request(method, uri, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn multipart(&self, uri: &str, parts: &[Part<'_>], cookie: Option<&str>) -> Reply {
        let (content_type, body) = multipart_body(parts);
        self.send(
            request(Method::POST, uri, cookie)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Signs in and returns the session cookie.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let reply = self
            .json(Method::POST, "/api/auth/login", json!({ "email": email, "password": password }), None)
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        session_cookie(&reply)
    }

    /// Registers a member and returns their id with a session cookie.
    pub async fn register(&self, name: &str, sex: &str) -> (String, String) {
        let reply = self
            .json(
                Method::POST,
                "/api/auth/register",
                json!({
                    "name": name,
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "password": "correct horse",
                    "sex": sex,
                    "age": 30,
                }),
                None,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "register failed: {}", reply.body);
        let id = reply.body["id"].as_str().expect("id").to_owned();
        (id, session_cookie(&reply))
    }
}

fn request(method: Method, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

pub fn session_cookie(reply: &Reply) -> String {
    reply
        .headers
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_owned()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File { name: &'a str, file_name: &'a str, content_type: &'a str, bytes: &'a [u8] },
}

const BOUNDARY: &str = "----sugarkisses-test-boundary";

fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, file_name, content_type, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Gateway that remembers the last order and captures it, or declines when told to.
#[derive(Default)]
pub struct FakeGateway {
    pub decline: bool,
    pub last: Mutex<Option<OrderRequest>>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, PaymentError> {
        *self.last.lock().unwrap() = Some(request.clone());
        Ok(GatewayOrder::from_body(json!({
            "id": "ORDER-1",
            "status": "CREATED",
            "purchase_units": [{ "reference_id": request.reference_id, "custom_id": request.custom_id }],
        })))
    }

    async fn capture_order(&self, order_id: &str) -> Result<GatewayOrder, PaymentError> {
        if self.decline {
            return Err(PaymentError::Provider {
                status: 422,
                message: "The instrument presented was either declined or refused".to_owned(),
                details: json!([{ "issue": "INSTRUMENT_DECLINED" }]),
            });
        }

        let last = self.last.lock().unwrap().clone().expect("order created first");
        Ok(GatewayOrder::from_body(json!({
            "id": order_id,
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": last.reference_id,
                "payments": { "captures": [{ "id": "CAPTURE-1", "custom_id": last.custom_id }] },
            }],
        })))
    }
}

pub fn fake_gateway(decline: bool) -> Arc<FakeGateway> {
    Arc::new(FakeGateway { decline, ..Default::default() })
}
