pub mod admin;
pub mod ai;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod messages;
pub mod models;
pub mod orders;
pub mod profiles;
pub mod session;
pub mod store;
pub mod uploads;
pub mod users;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::FromRef,
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tower_http::{cors::{AllowOrigin, CorsLayer}, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;

use ai::{Canned, ChatCompletions, TextGenerator};
use config::{Config, Environment};
use orders::{PaymentGateway, PaypalGateway, Unconfigured};
use store::{BlobStore, DataStore, LocalBlobs, RemoteBlobs};
use uploads::Uploads;

pub use error::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: DataStore,
    pub uploads: Uploads,
    pub payments: Arc<dyn PaymentGateway>,
    pub writer: Arc<dyn TextGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires storage and providers from configuration: the blob store when one is
    /// configured, local directories otherwise.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let (documents, uploads): (Arc<dyn BlobStore>, Uploads) = match &config.blob {
            Some(blob) => {
                info!(base_url = %blob.base_url, "using remote blob store");
                let blobs: Arc<dyn BlobStore> = Arc::new(RemoteBlobs::new(http_client.clone(), &blob.base_url, &blob.token));
                (blobs.clone(), Uploads::new(blobs, "uploads/"))
            }
            None => {
                info!(data_dir = %config.data_dir.display(), uploads_dir = %config.uploads_dir.display(), "using local storage");
                (
                    Arc::new(LocalBlobs::new(&config.data_dir)),
                    Uploads::new(Arc::new(LocalBlobs::new(&config.uploads_dir)), ""),
                )
            }
        };

        let payments: Arc<dyn PaymentGateway> = match &config.paypal {
            Some(paypal) => Arc::new(PaypalGateway::new(http_client.clone(), paypal.clone())),
            None => Arc::new(Unconfigured),
        };

        let writer: Arc<dyn TextGenerator> = match &config.ai {
            Some(ai) => Arc::new(ChatCompletions::new(http_client, ai.clone())),
            None => {
                info!("AI_API_KEY not set, drafting messages from canned openers");
                Arc::new(Canned)
            }
        };

        Ok(Self {
            store: DataStore::new(documents, config.bcrypt_cost),
            uploads,
            payments,
            writer,
            config: Arc::new(config),
        })
    }
}

pub fn app(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.environment == Environment::Production)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(state.config.session_minutes)));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/auth", auth::router())
        .merge(users::router())
        .merge(profiles::router(state.config.max_upload_bytes))
        .merge(messages::router())
        .merge(orders::router())
        .merge(ai::router())
        .merge(admin::router())
        .merge(uploads::router());

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
