//! Merging a profile submission into the stored user/profile pair.
//!
//! Every field is independent: a present, non-empty value overwrites, anything
//! else leaves the stored value alone. Gallery uploads append. Removal only
//! happens through explicit `removeGallery` references.

use std::str::FromStr;

use crate::{
    models::{vocab::{Interest, Want}, Attributes, Profile, Role, Sex, User},
    AppError, AppResult,
};

use super::form::ProfileForm;

const MIN_AGE: u8 = 18;

#[derive(Debug, Default, PartialEq)]
pub(crate) struct ProfileChanges {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub location: Option<String>,
    pub sex: Option<Sex>,
    pub role: Option<Role>,
    pub about: Option<String>,
    pub wants: Option<Vec<Want>>,
    pub interests: Option<Vec<Interest>>,
    pub attributes: Attributes,
    pub remove_gallery: Vec<String>,
    /// Reference of the freshly stored avatar.
    pub avatar: Option<String>,
    /// References of freshly stored gallery images, in upload order.
    pub gallery: Vec<String>,
}

impl ProfileChanges {
    /// Validates the text part of a submission. Files are stored separately and attached afterwards.
    pub fn parse(form: &ProfileForm, actor_is_admin: bool) -> AppResult<Self> {
        let role = parse_opt::<Role>(&form.role)?;
        if role.is_some() && !actor_is_admin {
            return Err(AppError::Forbidden("Only admins can assign roles".to_owned()));
        }

        let age = parse_opt::<u8>(&form.age)?;
        if age.is_some_and(|age| age < MIN_AGE) {
            return Err(AppError::validation(format!("Members must be at least {MIN_AGE}")));
        }

        Ok(Self {
            name: form.name.clone(),
            age,
            location: form.location.clone(),
            sex: parse_opt(&form.sex)?,
            role,
            about: form.about.clone(),
            wants: parse_list(&form.wants)?,
            interests: parse_list(&form.interests)?,
            attributes: Attributes {
                body_type: parse_opt(&form.body_type)?,
                ethnicity: parse_opt(&form.ethnicity)?,
                hair_color: parse_opt(&form.hair_color)?,
                eye_color: parse_opt(&form.eye_color)?,
                smoker: parse_opt(&form.smoker)?,
                drinker: parse_opt(&form.drinker)?,
                piercings: parse_opt(&form.piercings)?,
                tattoos: parse_opt(&form.tattoos)?,
                height: parse_opt(&form.height)?,
            },
            remove_gallery: form.remove_gallery.clone(),
            avatar: None,
            gallery: Vec::new(),
        })
    }

    pub fn apply(self, user: &mut User, profile: &mut Profile) {
        overwrite(&mut user.name, self.name);
        if let Some(age) = self.age {
            user.age = Some(age);
        }
        if let Some(location) = self.location {
            user.location = Some(location);
        }
        if let Some(sex) = self.sex {
            user.set_sex(sex);
        }
        // an explicit admin assignment wins over the sex-derived role
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }

        overwrite(&mut profile.about, self.about);
        overwrite(&mut profile.wants, self.wants);
        overwrite(&mut profile.interests, self.interests);
        merge_attributes(&mut profile.attributes, self.attributes);

        profile.gallery.retain(|image| !self.remove_gallery.contains(image));
        for image in self.gallery {
            if !profile.gallery.contains(&image) {
                profile.gallery.push(image);
            }
        }
    }
}

fn overwrite<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn merge_attributes(stored: &mut Attributes, changes: Attributes) {
    macro_rules! merge {
        ($($field:ident),+) => {
            $(
                if changes.$field.is_some() {
                    stored.$field = changes.$field;
                }
            )+
        };
    }

    merge!(body_type, ethnicity, hair_color, eye_color, smoker, drinker, piercings, tattoos, height);
}

fn parse_opt<T>(value: &Option<String>) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: ToString,
{
    value
        .as_deref()
        .map(|value| value.parse::<T>().map_err(|err| AppError::Validation(err.to_string())))
        .transpose()
}

/// `None` for an absent list. Duplicates collapse onto their first position.
fn parse_list<T>(values: &[String]) -> AppResult<Option<Vec<T>>>
where
    T: FromStr + PartialEq,
    T::Err: ToString,
{
    if values.is_empty() {
        return Ok(None);
    }

    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        let item = value.parse::<T>().map_err(|err| AppError::Validation(err.to_string()))?;
        if !parsed.contains(&item) {
            parsed.push(item);
        }
    }
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::models::{vocab::{BodyType, Habit}, Credits, Height};

    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            email: "u1@example.com".into(),
            name: "Uma".into(),
            password_hash: "hash".into(),
            role: Role::SugarBaby,
            sex: Some(Sex::Female),
            age: Some(25),
            location: Some("Lyon".into()),
            credits: Credits::Limited(0),
            avatar: Some("/api/uploads/old.png".into()),
            profile_id: "p1".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn profile() -> Profile {
        Profile {
            id: "p1".into(),
            user_id: "u1".into(),
            about: "Loves museums".into(),
            wants: vec![Want::Travel],
            interests: vec![Interest::Art],
            gallery: vec!["/api/uploads/a.png".into(), "/api/uploads/b.png".into()],
            attributes: Attributes {
                body_type: Some(BodyType::Slim),
                smoker: Some(Habit::Never),
                height: Some(Height(170)),
                ..Default::default()
            },
        }
    }

    #[test]
    fn location_only_touches_location() {
        let form = ProfileForm { location: Some("Paris".into()), ..Default::default() };
        let (mut user, mut profile) = (user(), profile());

        ProfileChanges::parse(&form, false).unwrap().apply(&mut user, &mut profile);

        assert_eq!(user.location.as_deref(), Some("Paris"));
        assert_eq!(user, User { location: Some("Paris".into()), ..self::user() });
        assert_eq!(profile, self::profile());
    }

    #[test]
    fn attributes_merge_individually() {
        let form = ProfileForm {
            hair_color: Some("blonde".into()),
            height: Some("172 cm".into()),
            ..Default::default()
        };
        let (mut user, mut profile) = (user(), profile());

        ProfileChanges::parse(&form, false).unwrap().apply(&mut user, &mut profile);

        let attributes = &profile.attributes;
        assert_eq!(attributes.body_type, Some(BodyType::Slim));
        assert_eq!(attributes.smoker, Some(Habit::Never));
        assert_eq!(attributes.height, Some(Height(172)));
        assert_eq!(attributes.hair_color.map(|c| c.label()), Some("Blonde"));
    }

    #[test]
    fn gallery_removal_happens_before_append() {
        let (mut user, mut profile) = (user(), profile());
        let mut changes = ProfileChanges::parse(
            &ProfileForm { remove_gallery: vec!["/api/uploads/a.png".into()], ..Default::default() },
            false,
        )
        .unwrap();
        changes.gallery = vec!["/api/uploads/c.png".into()];
        changes.avatar = Some("/api/uploads/new.png".into());

        changes.apply(&mut user, &mut profile);

        assert_eq!(profile.gallery, vec!["/api/uploads/b.png", "/api/uploads/c.png"]);
        assert_eq!(user.avatar.as_deref(), Some("/api/uploads/new.png"));
    }

    #[test]
    fn sex_change_rederives_role() {
        let form = ProfileForm { sex: Some("male".into()), ..Default::default() };
        let (mut user, mut profile) = (user(), profile());

        ProfileChanges::parse(&form, false).unwrap().apply(&mut user, &mut profile);
        assert_eq!(user.role, Role::SugarDaddy);
    }

    #[test]
    fn admin_role_overrides_sex() {
        let form = ProfileForm {
            sex: Some("male".into()),
            role: Some("Sugar Baby".into()),
            ..Default::default()
        };
        let (mut user, mut profile) = (user(), profile());

        ProfileChanges::parse(&form, true).unwrap().apply(&mut user, &mut profile);
        assert_eq!(user.sex, Some(Sex::Male));
        assert_eq!(user.role, Role::SugarBaby);
    }

    #[test]
    fn non_admin_cannot_assign_role() {
        let form = ProfileForm { role: Some("Admin".into()), ..Default::default() };
        assert!(matches!(ProfileChanges::parse(&form, false), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn rejects_values_outside_vocabulary() {
        let form = ProfileForm { interests: vec!["Art".into(), "Skydiving".into()], ..Default::default() };
        assert!(matches!(ProfileChanges::parse(&form, false), Err(AppError::Validation(_))));

        let form = ProfileForm { body_type: Some("Round".into()), ..Default::default() };
        assert!(matches!(ProfileChanges::parse(&form, false), Err(AppError::Validation(_))));
    }

    #[test]
    fn lists_replace_and_dedupe() {
        let form = ProfileForm {
            wants: vec!["Casual".into(), "Mentorship".into(), "casual".into()],
            ..Default::default()
        };
        let (mut user, mut profile) = (user(), profile());

        ProfileChanges::parse(&form, false).unwrap().apply(&mut user, &mut profile);
        assert_eq!(profile.wants, vec![Want::Casual, Want::Mentorship]);
        assert_eq!(profile.interests, vec![Interest::Art]);
    }

    #[test]
    fn minors_are_rejected() {
        let form = ProfileForm { age: Some("17".into()), ..Default::default() };
        assert!(ProfileChanges::parse(&form, false).is_err());
    }
}
