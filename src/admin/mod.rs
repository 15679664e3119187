use axum::{debug_handler, extract::{Path, State}, routing::{get, put}, Json, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::info;

use crate::{
    extract::AppJson,
    models::{Credits, Document, PublicUser, Role},
    session, store::DataStore, AppError, AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/overview", get(overview))
        .route("/admin/users/{id}", put(update_user))
}

fn require_admin(doc: &Document, user_id: &str) -> AppResult<()> {
    if !session::signed_in_user(doc, user_id)?.is_admin() {
        return Err(AppError::Forbidden("Admins only".to_owned()));
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Overview {
    users: usize,
    sugar_daddies: usize,
    sugar_babies: usize,
    admins: usize,
    messages: usize,
}

#[debug_handler(state = AppState)]
pub(crate) async fn overview(
    State(store): State<DataStore>,
    session: Session,
) -> AppResult<Json<Overview>> {
    let actor_id = session::require_user_id(&session).await?;
    let doc = store.read_data().await?;
    require_admin(&doc, &actor_id)?;

    let count = |role: Role| doc.users.iter().filter(|user| user.role == role).count();
    Ok(Json(Overview {
        users: doc.users.len(),
        sugar_daddies: count(Role::SugarDaddy),
        sugar_babies: count(Role::SugarBaby),
        admins: count(Role::Admin),
        messages: doc.messages.len(),
    }))
}

#[derive(Deserialize)]
pub(crate) struct UpdateUserRequest {
    role: Option<Role>,
    credits: Option<Credits>,
}

/// Direct role and balance overrides. Neither touches the sex-derived default.
#[debug_handler(state = AppState)]
pub(crate) async fn update_user(
    State(store): State<DataStore>,
    Path(id): Path<String>,
    session: Session,
    AppJson(UpdateUserRequest { role, credits }): AppJson<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let actor_id = session::require_user_id(&session).await?;

    let user = store
        .update(|doc| {
            require_admin(doc, &actor_id)?;
            let user = doc.user_mut(&id).ok_or_else(|| AppError::NotFound("User".to_owned()))?;
            if let Some(role) = role {
                user.role = role;
            }
            if let Some(credits) = credits {
                user.credits = credits;
            }
            Ok::<_, AppError>(user.public())
        })
        .await?;

    info!(%actor_id, user_id = %user.id, role = ?user.role, credits = %user.credits, "admin updated user");
    Ok(Json(user))
}
