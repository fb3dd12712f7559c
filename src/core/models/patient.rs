use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{NewUser, User, UserRole};

#[derive(Clone, Debug)]
pub struct Patient {
    pub id: i64,
    pub user_id: i64,
    pub amka: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub inserted_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewPatient {
    pub amka: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
}

/// A patient profile joined with its owning user.
#[derive(Clone, Debug)]
pub struct UserPatient {
    pub user: User,
    pub patient: Patient,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub city: String,
    pub address: String,
    pub amka: String,
    #[serde(default)]
    pub user_role: Option<UserRole>,
}

impl PatientSignup {
    pub fn into_parts(self, password_hash: String) -> (NewUser, NewPatient) {
        (
            NewUser {
                username: self.username,
                email: self.email,
                password_hash,
                firstname: self.firstname,
                lastname: self.lastname,
                role: UserRole::Patient,
            },
            NewPatient {
                amka: self.amka,
                city: self.city,
                address: self.address,
                phone_number: self.phone_number,
            },
        )
    }
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPatientView {
    /// User id, which is the id every patient endpoint takes.
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub user_role: UserRole,
    pub amka: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
}

impl From<&UserPatient> for UserPatientView {
    fn from(up: &UserPatient) -> Self {
        UserPatientView {
            id: up.user.id,
            username: up.user.username.clone(),
            email: up.user.email.clone(),
            firstname: up.user.firstname.clone(),
            lastname: up.user.lastname.clone(),
            user_role: up.user.role,
            amka: up.patient.amka.clone(),
            city: up.patient.city.clone(),
            address: up.patient.address.clone(),
            phone_number: up.patient.phone_number.clone(),
        }
    }
}
