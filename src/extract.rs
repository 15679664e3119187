use axum::extract::FromRequest;

use crate::AppError;

/// `Json` whose rejections render through [`AppError`], so a malformed or
/// mistyped body is a 400 with the usual `{error}` payload.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
