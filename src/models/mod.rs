mod message;
mod profile;
mod user;
pub mod vocab;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub use message::Message;
pub use profile::{Attributes, Height, Profile};
pub use user::{Credits, PublicUser, Role, Sex, User};

pub const ADMIN_ID: &str = "1";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "password123";

/// The whole persisted state: every user, profile and message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Stand-in creation time for records stored without one.
pub(crate) fn unix_epoch() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

impl Document {
    /// A fresh document holding only the default admin, whose password hash is given.
    pub fn seeded(admin_password_hash: String) -> Self {
        let mut doc = Self::default();
        doc.seed_admin(admin_password_hash);
        doc
    }

    /// Adds the default admin and, unless one is already stored, their profile.
    pub fn seed_admin(&mut self, admin_password_hash: String) {
        let profile_id = format!("profile-{ADMIN_ID}");
        self.users.push(User {
            id: ADMIN_ID.to_owned(),
            email: ADMIN_EMAIL.to_owned(),
            name: "Admin".to_owned(),
            password_hash: admin_password_hash,
            role: Role::Admin,
            sex: None,
            age: None,
            location: None,
            credits: Credits::Unlimited,
            avatar: None,
            profile_id: profile_id.clone(),
            created_at: OffsetDateTime::now_utc(),
        });

        if self.profile_for(ADMIN_ID).is_none() {
            self.profiles.push(Profile::empty(profile_id, ADMIN_ID.to_owned()));
        }
    }

    /// Points users stored without a `profileId` at their existing profile, or
    /// at a derived id when they have none yet. Returns whether anything changed.
    pub fn backfill_profile_ids(&mut self) -> bool {
        let mut changed = false;
        for user in self.users.iter_mut().filter(|user| user.profile_id.is_empty()) {
            user.profile_id = self.profiles
                .iter()
                .find(|profile| profile.user_id == user.id)
                .map(|profile| profile.id.clone())
                .unwrap_or_else(|| format!("profile-{}", user.id));
            changed = true;
        }
        changed
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email.eq_ignore_ascii_case(email.trim()))
    }

    pub fn profile_for(&self, user_id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|profile| profile.user_id == user_id)
    }

    /// The user together with their profile, creating an empty profile if the record is missing.
    pub fn user_and_profile_mut(&mut self, user_id: &str) -> Option<(&mut User, &mut Profile)> {
        let user = self.users.iter_mut().find(|user| user.id == user_id)?;

        let index = match self.profiles.iter().position(|profile| profile.user_id == user_id) {
            Some(index) => index,
            None => {
                self.profiles.push(Profile::empty(user.profile_id.clone(), user.id.clone()));
                self.profiles.len() - 1
            }
        };

        Some((user, &mut self.profiles[index]))
    }

    pub fn conversation(&self, conversation_id: &str) -> Vec<Message> {
        self.messages
            .iter()
            .filter(|message| message.conversation_id == conversation_id)
            .cloned()
            .collect()
    }
}
