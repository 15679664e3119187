use axum::{debug_handler, extract::State, Json};
use tower_sessions::Session;

use crate::{models::PublicUser, session, store::DataStore, AppResult};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn me(
    State(store): State<DataStore>,
    session: Session,
) -> AppResult<Json<PublicUser>> {
    let user_id = session::require_user_id(&session).await?;
    let doc = store.read_data().await?;

    Ok(Json(session::signed_in_user(&doc, &user_id)?.public()))
}
