use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{extract::AppJson, models::PublicUser, session::USER_ID, store::DataStore, AppError, AppResult};

use super::password;

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(store): State<DataStore>,
    session: Session,
    AppJson(LoginRequest { email, password }): AppJson<LoginRequest>,
) -> AppResult<Json<PublicUser>> {
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::validation("Email and password are required"));
    };

    let doc = store.read_data().await?;
    let denied = || AppError::Unauthorized("Invalid email or password".to_owned());

    let user = doc.user_by_email(&email).ok_or_else(denied)?;
    if !password::verify(password, user.password_hash.clone()).await? {
        return Err(denied());
    }

    session.cycle_id().await?;
    session.insert(USER_ID, user.id.clone()).await?;

    info!(user_id = %user.id, "welcome");
    Ok(Json(user.public()))
}
