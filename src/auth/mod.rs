use axum::{routing::{get, post}, Router};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{models::{Credits, Document, Profile, Role, Sex, User}, AppState};

mod login;
mod logout;
mod me;
pub mod password;
mod register;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::login))
        .route("/register", post(register::register))
        .route("/logout", post(logout::logout))
        .route("/me", get(me::me))
}

pub(crate) struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub sex: Sex,
    pub age: Option<u8>,
    pub location: Option<String>,
}

/// Appends a user and their empty profile. The role comes from the declared sex.
pub(crate) fn create_user(doc: &mut Document, new: NewUser) -> &User {
    let id = Uuid::now_v7().to_string();
    let profile_id = Uuid::now_v7().to_string();

    tracing::info!(user_id = %id, email = %new.email, "adding user");
    doc.profiles.push(Profile::empty(profile_id.clone(), id.clone()));
    doc.users.push(User {
        id,
        email: new.email,
        name: new.name,
        password_hash: new.password_hash,
        role: Role::for_sex(new.sex),
        sex: Some(new.sex),
        age: new.age,
        location: new.location,
        credits: Credits::default(),
        avatar: None,
        profile_id,
        created_at: OffsetDateTime::now_utc(),
    });

    &doc.users[doc.users.len() - 1]
}
