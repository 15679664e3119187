use std::sync::Arc;

use axum::{debug_handler, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{config::Config, extract::AppJson, models::{PublicUser, Sex}, session::USER_ID, store::DataStore, AppError, AppResult};

use super::{create_user, password, NewUser};

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    sex: Option<String>,
    age: Option<u8>,
    location: Option<String>,
}

const MIN_PASSWORD_LEN: usize = 8;
const MIN_AGE: u8 = 18;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(store): State<DataStore>,
    State(config): State<Arc<Config>>,
    session: Session,
    AppJson(request): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let name = required(request.name, "name")?;
    let email = required(request.email, "email")?.to_lowercase();
    let password = required(request.password, "password")?;
    let sex: Sex = required(request.sex, "sex")?
        .parse()
        .map_err(AppError::Validation)?;

    if !email.contains('@') {
        return Err(AppError::validation("Email address is malformed"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!("Password must be at least {MIN_PASSWORD_LEN} characters")));
    }
    if request.age.is_some_and(|age| age < MIN_AGE) {
        return Err(AppError::validation(format!("Members must be at least {MIN_AGE}")));
    }

    let password_hash = password::hash(password, config.bcrypt_cost).await?;

    let user = store
        .update(|doc| {
            if doc.user_by_email(&email).is_some() {
                return Err(AppError::validation("Email is already registered"));
            }
            let user = create_user(doc, NewUser {
                name,
                email,
                password_hash,
                sex,
                age: request.age,
                location: request.location.filter(|location| !location.trim().is_empty()),
            });
            Ok(user.public())
        })
        .await?;

    session.cycle_id().await?;
    session.insert(USER_ID, user.id.clone()).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

fn required(value: Option<String>, field: &'static str) -> AppResult<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .ok_or(AppError::MissingParameter(field))
}
