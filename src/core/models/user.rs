use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core::errors::CareLinkError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum UserRole {
    Patient,
    Doctor,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UserRole::Patient => "Patient",
            UserRole::Doctor => "Doctor",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UserRole {
    type Err = CareLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Patient" => Ok(UserRole::Patient),
            "Doctor" => Ok(UserRole::Doctor),
            other => Err(CareLinkError::invalid_argument("role", format!("Unknown user role {}", other))),
        }
    }
}

/// Identity record. `password` always holds a bcrypt hash.
#[derive(Clone, Debug)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub role: UserRole,
    pub inserted_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub firstname: String,
    pub lastname: String,
    pub role: UserRole,
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserReadOnly {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub user_role: UserRole,
}

impl From<&User> for UserReadOnly {
    fn from(user: &User) -> Self {
        UserReadOnly {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            firstname: user.firstname.clone(),
            lastname: user.lastname.clone(),
            user_role: user.role,
        }
    }
}

/// Profile update payload shared by patients and doctors. `id` must repeat the path id.
#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub city: String,
    pub address: String,
}
