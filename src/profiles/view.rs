use axum::{debug_handler, extract::{Path, State}, Json};
use tower_sessions::Session;

use crate::{session, store::DataStore, AppError, AppResult, AppState};

use super::ProfileResponse;

/// A member's profile, flagged editable when the viewer owns it or is an admin.
#[debug_handler(state = AppState)]
pub(crate) async fn profile(
    State(store): State<DataStore>,
    Path(user_id): Path<String>,
    session: Session,
) -> AppResult<Json<ProfileResponse>> {
    let viewer_id = session::user_id(&session).await?;
    let doc = store.read_data().await?;

    let user = doc.user(&user_id).ok_or_else(|| AppError::NotFound("User".to_owned()))?;
    let editable = viewer_id
        .as_deref()
        .and_then(|viewer_id| doc.user(viewer_id))
        .is_some_and(|viewer| viewer.id == user.id || viewer.is_admin());

    Ok(Json(ProfileResponse {
        user: user.public(),
        profile: doc.profile_for(&user_id).cloned(),
        editable,
    }))
}
