use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::vocab::{Amount, BodyType, EyeColor, Ethnicity, HairColor, Habit, Interest, Want};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub wants: Vec<Want>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Profile {
    pub fn empty(id: String, user_id: String) -> Self {
        Self { id, user_id, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    pub body_type: Option<BodyType>,
    pub ethnicity: Option<Ethnicity>,
    pub hair_color: Option<HairColor>,
    pub eye_color: Option<EyeColor>,
    pub smoker: Option<Habit>,
    pub drinker: Option<Habit>,
    pub piercings: Option<Amount>,
    pub tattoos: Option<Amount>,
    pub height: Option<Height>,
}

/// Height in whole centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Height(pub u16);

impl Height {
    const RANGE: std::ops::RangeInclusive<u16> = 100..=250;
}

impl FromStr for Height {
    type Err = String;

    /// Accepts `"180"` or `"180 cm"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_end_matches("cm").trim();
        let cm: u16 = digits
            .parse()
            .map_err(|_| format!("{s:?} is not a height in centimetres"))?;
        if !Height::RANGE.contains(&cm) {
            return Err(format!("height {cm}cm is out of range"));
        }
        Ok(Height(cm))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("180", 180)]
    #[case("175 cm", 175)]
    #[case(" 160cm ", 160)]
    fn parses_heights(#[case] input: &str, #[case] cm: u16) {
        assert_eq!(input.parse::<Height>().unwrap(), Height(cm));
    }

    #[rstest]
    #[case("5'11\"")]
    #[case("tall")]
    #[case("20")]
    fn rejects_bad_heights(#[case] input: &str) {
        assert!(input.parse::<Height>().is_err());
    }

    #[test]
    fn missing_collections_default() {
        let profile: Profile = serde_json::from_str(r#"{"id":"p1","userId":"u1"}"#).unwrap();
        assert_eq!(profile, Profile::empty("p1".into(), "u1".into()));
    }
}
