use axum::{debug_handler, extract::{Path, Query, State}, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{models::{Profile, PublicUser, Role}, store::DataStore, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(user))
}

#[derive(Deserialize)]
pub(crate) struct ListUsersQuery {
    role: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct UsersResponse {
    users: Vec<PublicUser>,
    profiles: Vec<Profile>,
}

#[derive(Serialize)]
pub(crate) struct UserResponse {
    user: PublicUser,
    profile: Option<Profile>,
}

/// Every user without credentials, plus the matching profiles. `?role=` narrows the list.
#[debug_handler(state = AppState)]
pub(crate) async fn list_users(
    State(store): State<DataStore>,
    Query(ListUsersQuery { role }): Query<ListUsersQuery>,
) -> AppResult<Json<UsersResponse>> {
    let role = role
        .filter(|role| !role.trim().is_empty())
        .map(|role| role.parse::<Role>())
        .transpose()
        .map_err(AppError::Validation)?;

    let doc = store.read_data().await?;
    let users: Vec<PublicUser> = doc.users
        .iter()
        .filter(|user| role.is_none_or(|role| user.role == role))
        .map(PublicUser::from)
        .collect();
    let profiles = doc.profiles
        .iter()
        .filter(|profile| users.iter().any(|user| user.id == profile.user_id))
        .cloned()
        .collect();

    Ok(Json(UsersResponse { users, profiles }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn user(
    State(store): State<DataStore>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let doc = store.read_data().await?;
    let user = doc.user(&id).ok_or_else(|| AppError::NotFound("User".to_owned()))?;

    Ok(Json(UserResponse {
        user: user.public(),
        profile: doc.profile_for(&id).cloned(),
    }))
}
