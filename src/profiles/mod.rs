mod form;
mod reconcile;
mod update;
mod view;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use serde::Serialize;

use crate::{models::{Profile, PublicUser}, AppState};

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            post(update::update_profile).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/profile/{user_id}", get(view::profile))
}

#[derive(Serialize)]
pub(crate) struct ProfileResponse {
    user: PublicUser,
    profile: Option<Profile>,
    editable: bool,
}
