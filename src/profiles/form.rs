use axum::extract::Multipart;
use tracing::debug;

use crate::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FileUpload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Raw multipart submission of the profile editor. Blank text fields read as absent.
#[derive(Debug, Default)]
pub(crate) struct ProfileForm {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub location: Option<String>,
    pub sex: Option<String>,
    pub role: Option<String>,
    pub about: Option<String>,
    pub wants: Vec<String>,
    pub interests: Vec<String>,
    pub body_type: Option<String>,
    pub ethnicity: Option<String>,
    pub hair_color: Option<String>,
    pub eye_color: Option<String>,
    pub smoker: Option<String>,
    pub drinker: Option<String>,
    pub piercings: Option<String>,
    pub tattoos: Option<String>,
    pub height: Option<String>,
    pub remove_gallery: Vec<String>,
    pub avatar: Option<FileUpload>,
    pub gallery: Vec<FileUpload>,
}

impl ProfileForm {
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ProfileForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(normalize_name) else {
                continue;
            };

            if name == "avatar" || name == "gallery" {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().unwrap_or("application/octet-stream").to_owned();
                let bytes = field.bytes().await?;

                // browsers send an empty part for an untouched file input
                if bytes.is_empty() {
                    continue;
                }
                if !content_type.starts_with("image/") {
                    return Err(AppError::validation(format!("{name} must be an image, got {content_type}")));
                }

                let upload = FileUpload { file_name, content_type, bytes: bytes.to_vec() };
                if name == "avatar" {
                    form.avatar = Some(upload);
                } else {
                    form.gallery.push(upload);
                }
                continue;
            }

            let value = field.text().await?;
            form.set(&name, value)?;
        }

        Ok(form)
    }

    fn set(&mut self, name: &str, value: String) -> AppResult<()> {
        let text = Some(value.trim().to_owned()).filter(|value| !value.is_empty());

        let slot = match name {
            "userId" => &mut self.user_id,
            "name" => &mut self.name,
            "age" => &mut self.age,
            "location" => &mut self.location,
            "sex" => &mut self.sex,
            "role" => &mut self.role,
            "about" => &mut self.about,
            "bodyType" => &mut self.body_type,
            "ethnicity" => &mut self.ethnicity,
            "hairColor" => &mut self.hair_color,
            "eyeColor" => &mut self.eye_color,
            "smoker" => &mut self.smoker,
            "drinker" => &mut self.drinker,
            "piercings" => &mut self.piercings,
            "tattoos" => &mut self.tattoos,
            "height" => &mut self.height,
            "wants" => return push_list(&mut self.wants, text),
            "interests" => return push_list(&mut self.interests, text),
            "removeGallery" => return push_list(&mut self.remove_gallery, text),
            other => {
                debug!(field = other, "ignoring unknown profile field");
                return Ok(());
            }
        };

        if text.is_some() {
            *slot = text;
        }
        Ok(())
    }
}

/// `attributes.bodyType`, `attributes[bodyType]` and `wants[]` map to their bare names.
fn normalize_name(name: &str) -> String {
    let name = name.trim_end_matches("[]");
    let name = name
        .strip_prefix("attributes.")
        .or_else(|| name.strip_prefix("attributes[").and_then(|rest| rest.strip_suffix(']')))
        .unwrap_or(name);
    name.to_owned()
}

/// List fields arrive either repeated, one value per part, or as a single JSON array.
fn push_list(list: &mut Vec<String>, value: Option<String>) -> AppResult<()> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.starts_with('[') {
        let values: Vec<String> = serde_json::from_str(&value)
            .map_err(|err| AppError::validation(format!("malformed list: {err}")))?;
        list.extend(values.into_iter().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()));
    } else {
        list.push(value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("bodyType", "bodyType")]
    #[case("attributes.hairColor", "hairColor")]
    #[case("attributes[eyeColor]", "eyeColor")]
    #[case("wants[]", "wants")]
    fn normalizes_field_names(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(raw), expected);
    }

    #[test]
    fn blank_text_does_not_clear() {
        let mut form = ProfileForm::default();
        form.set("location", "Paris".into()).unwrap();
        form.set("location", "   ".into()).unwrap();
        assert_eq!(form.location.as_deref(), Some("Paris"));
    }

    #[test]
    fn lists_accept_repeats_and_json() {
        let mut form = ProfileForm::default();
        form.set("wants", "Travel".into()).unwrap();
        form.set("wants", r#"["Mentorship", " ", "Casual"]"#.into()).unwrap();
        form.set("wants", "".into()).unwrap();
        assert_eq!(form.wants, vec!["Travel", "Mentorship", "Casual"]);
    }

    #[test]
    fn malformed_json_list_is_rejected() {
        let mut form = ProfileForm::default();
        assert!(matches!(form.set("interests", "[\"Art\"".into()), Err(AppError::Validation(_))));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut form = ProfileForm::default();
        form.set("favouriteColour", "teal".into()).unwrap();
        assert!(form.name.is_none());
    }
}
