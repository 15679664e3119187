use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Sugar Daddy")]
    SugarDaddy,
    #[serde(rename = "Sugar Baby")]
    SugarBaby,
    Admin,
}

impl Role {
    /// Role a non-admin user holds for the given sex.
    pub fn for_sex(sex: Sex) -> Role {
        match sex {
            Sex::Male => Role::SugarDaddy,
            Sex::Female => Role::SugarBaby,
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sugar daddy" | "sugar_daddy" | "sugardaddy" => Ok(Role::SugarDaddy),
            "sugar baby" | "sugar_baby" | "sugarbaby" => Ok(Role::SugarBaby),
            "admin" => Ok(Role::Admin),
            other => Err(format!("{other:?} is not a valid role")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            other => Err(format!("{other:?} is not a valid sex")),
        }
    }
}

/// Credit balance. Stored as an integer, or the string `"unlimited"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credits {
    Limited(u32),
    Unlimited,
}

impl Default for Credits {
    fn default() -> Self {
        Credits::Limited(0)
    }
}

impl Credits {
    pub fn grant(self, grant: Credits) -> Credits {
        match (self, grant) {
            (Credits::Limited(have), Credits::Limited(add)) => Credits::Limited(have.saturating_add(add)),
            _ => Credits::Unlimited,
        }
    }

    /// Takes one credit, or `None` when the balance is exhausted.
    pub fn spend_one(self) -> Option<Credits> {
        match self {
            Credits::Unlimited => Some(Credits::Unlimited),
            Credits::Limited(0) => None,
            Credits::Limited(n) => Some(Credits::Limited(n - 1)),
        }
    }
}

impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Credits::Limited(n) => write!(f, "{n}"),
            Credits::Unlimited => f.write_str("unlimited"),
        }
    }
}

impl Serialize for Credits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Credits::Limited(n) => serializer.serialize_u32(*n),
            Credits::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for Credits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Credits::Limited(n)),
            Raw::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

impl FromStr for Credits {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") {
            return Ok(Credits::Unlimited);
        }
        s.parse()
            .map(Credits::Limited)
            .map_err(|_| format!("{s:?} is not a credit balance"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub age: Option<u8>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Empty for records written without one, until the store backfills it on load.
    #[serde(default)]
    pub profile_id: String,
    #[serde(with = "time::serde::rfc3339", default = "super::unix_epoch")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Records a new sex and re-derives the role from it. Admins keep their role.
    pub fn set_sex(&mut self, sex: Sex) {
        self.sex = Some(sex);
        if !self.is_admin() {
            self.role = Role::for_sex(sex);
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// User record safe for client responses. Carries no password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub sex: Option<Sex>,
    pub age: Option<u8>,
    pub location: Option<String>,
    pub credits: Credits,
    pub avatar: Option<String>,
    pub profile_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            sex: user.sex,
            age: user.age,
            location: user.location.clone(),
            credits: user.credits,
            avatar: user.avatar.clone(),
            profile_id: user.profile_id.clone(),
            created_at: user.created_at,
        }
    }
}
