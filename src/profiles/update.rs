use axum::{debug_handler, extract::{Multipart, State}, Json};
use futures_util::future::{join, join_all};
use tower_sessions::Session;
use tracing::{info, warn};

use crate::{
    models::{Profile, PublicUser},
    session, store::DataStore, uploads::Uploads, AppError, AppResult, AppState,
};

use super::{form::{FileUpload, ProfileForm}, reconcile::ProfileChanges, ProfileResponse};

#[debug_handler(state = AppState)]
pub(crate) async fn update_profile(
    State(store): State<DataStore>,
    State(uploads): State<Uploads>,
    session: Session,
    multipart: Multipart,
) -> AppResult<Json<ProfileResponse>> {
    let actor_id = session::require_user_id(&session).await?;
    let form = ProfileForm::from_multipart(multipart).await?;
    let user_id = form.user_id.clone().unwrap_or_else(|| actor_id.clone());

    let actor_is_admin = {
        let doc = store.read_data().await?;
        let actor = session::signed_in_user(&doc, &actor_id)?;
        if actor.id != user_id && !actor.is_admin() {
            return Err(AppError::Forbidden("Cannot edit another member's profile".to_owned()));
        }
        if doc.user(&user_id).is_none() {
            return Err(AppError::NotFound("User".to_owned()));
        }
        actor.is_admin()
    };

    // validate before touching storage so a bad submission leaves no orphaned files
    let changes = ProfileChanges::parse(&form, actor_is_admin)?;

    let ProfileForm { avatar, gallery, .. } = form;
    let avatar = async {
        match avatar {
            Some(file) => store_file(&uploads, file).await.map(Some),
            None => Ok(None),
        }
    };
    let gallery = join_all(gallery.into_iter().map(|file| store_file(&uploads, file)));
    let (avatar, gallery) = join(avatar, gallery).await;

    let (user, profile) = commit(&store, &uploads, &user_id, changes, avatar, gallery).await?;

    info!(user_id = %user.id, actor_id = %actor_id, "profile updated");
    Ok(Json(ProfileResponse { user, profile: Some(profile), editable: true }))
}

async fn store_file(uploads: &Uploads, file: FileUpload) -> AppResult<String> {
    Ok(uploads.save(file.file_name.as_deref(), &file.content_type, file.bytes).await?)
}

/// Writes the changes with the freshly stored files attached. When an upload or
/// the write fails, whatever did get stored is removed again.
async fn commit(
    store: &DataStore,
    uploads: &Uploads,
    user_id: &str,
    changes: ProfileChanges,
    avatar: AppResult<Option<String>>,
    gallery: Vec<AppResult<String>>,
) -> AppResult<(PublicUser, Profile)> {
    let stored: Vec<String> = avatar
        .iter()
        .flatten()
        .chain(gallery.iter().flatten())
        .cloned()
        .collect();

    let applied = apply(store, user_id, changes, avatar, gallery).await;
    if let Err(err) = &applied {
        warn!(%user_id, error = %err, files = stored.len(), "profile update failed, discarding uploads");
        uploads.discard(&stored).await;
    }
    applied
}

async fn apply(
    store: &DataStore,
    user_id: &str,
    mut changes: ProfileChanges,
    avatar: AppResult<Option<String>>,
    gallery: Vec<AppResult<String>>,
) -> AppResult<(PublicUser, Profile)> {
    changes.avatar = avatar?;
    changes.gallery = gallery.into_iter().collect::<AppResult<_>>()?;

    store
        .update(|doc| {
            let (user, profile) = doc
                .user_and_profile_mut(user_id)
                .ok_or_else(|| AppError::NotFound("User".to_owned()))?;
            changes.apply(user, profile);
            Ok::<_, AppError>((user.public(), profile.clone()))
        })
        .await
}
