use tower_sessions::Session;

use crate::{models::{Document, User}, AppError, AppResult};

pub const USER_ID: &str = "user_id";

pub async fn user_id(session: &Session) -> AppResult<Option<String>> {
    Ok(session.get::<String>(USER_ID).await?)
}

pub async fn require_user_id(session: &Session) -> AppResult<String> {
    user_id(session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_owned()))
}

/// The signed-in user's record. A session pointing at a vanished user counts as signed out.
pub fn signed_in_user<'a>(doc: &'a Document, user_id: &str) -> AppResult<&'a User> {
    doc.user(user_id)
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_owned()))
}
