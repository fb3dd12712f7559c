use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use super::user::{NewUser, User, UserRole};
use crate::core::errors::CareLinkError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum Specialty {
    Cardiologist,
    Angiologist,
    Pulmonologist,
    Nephrologist,
    Pathologist,
    Surgeon,
}

impl Specialty {
    pub const ALL: [Specialty; 6] = [
        Specialty::Cardiologist,
        Specialty::Angiologist,
        Specialty::Pulmonologist,
        Specialty::Nephrologist,
        Specialty::Pathologist,
        Specialty::Surgeon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Cardiologist => "Cardiologist",
            Specialty::Angiologist => "Angiologist",
            Specialty::Pulmonologist => "Pulmonologist",
            Specialty::Nephrologist => "Nephrologist",
            Specialty::Pathologist => "Pathologist",
            Specialty::Surgeon => "Surgeon",
        }
    }
}

impl std::fmt::Display for Specialty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialty {
    type Err = CareLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialty::ALL
            .into_iter()
            .find(|sp| sp.as_str() == s)
            .ok_or_else(|| CareLinkError::invalid_argument("specialty", format!("Unknown doctor specialty {}", s)))
    }
}

#[derive(Clone, Debug)]
pub struct Doctor {
    pub id: i64,
    pub user_id: i64,
    pub afm: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub specialty: Specialty,
    pub inserted_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewDoctor {
    pub afm: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub specialty: Specialty,
}

#[derive(Clone, Debug)]
pub struct UserDoctor {
    pub user: User,
    pub doctor: Doctor,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub phone_number: String,
    pub city: String,
    pub address: String,
    pub afm: String,
    pub doctor_specialty: Specialty,
    #[serde(default)]
    pub user_role: Option<UserRole>,
}

impl DoctorSignup {
    pub fn into_parts(self, password_hash: String) -> (NewUser, NewDoctor) {
        (
            NewUser {
                username: self.username,
                email: self.email,
                password_hash,
                firstname: self.firstname,
                lastname: self.lastname,
                role: UserRole::Doctor,
            },
            NewDoctor {
                afm: self.afm,
                city: self.city,
                address: self.address,
                phone_number: self.phone_number,
                specialty: self.doctor_specialty,
            },
        )
    }
}

#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDoctorView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub user_role: UserRole,
    pub afm: String,
    pub city: String,
    pub address: String,
    pub phone_number: String,
    pub doctor_specialty: Specialty,
}

impl From<&UserDoctor> for UserDoctorView {
    fn from(ud: &UserDoctor) -> Self {
        UserDoctorView {
            id: ud.user.id,
            username: ud.user.username.clone(),
            email: ud.user.email.clone(),
            firstname: ud.user.firstname.clone(),
            lastname: ud.user.lastname.clone(),
            user_role: ud.user.role,
            afm: ud.doctor.afm.clone(),
            city: ud.doctor.city.clone(),
            address: ud.doctor.address.clone(),
            phone_number: ud.doctor.phone_number.clone(),
            doctor_specialty: ud.doctor.specialty,
        }
    }
}

/// Search form as the client posts it. Blank fields mean "any".
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct DoctorFilters {
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
}

/// Normalized filters handed to storage. Each present field narrows the result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DoctorCriteria {
    pub lastname_prefix: Option<String>,
    pub city_prefix: Option<String>,
    pub specialty: Option<Specialty>,
}

// Blank means absent; anything else is kept as sent.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<DoctorFilters> for DoctorCriteria {
    type Error = CareLinkError;

    fn try_from(filters: DoctorFilters) -> Result<Self, Self::Error> {
        let specialty = non_blank(filters.specialty)
            .map(|s| s.parse::<Specialty>())
            .transpose()?;
        Ok(DoctorCriteria {
            lastname_prefix: non_blank(filters.lastname),
            city_prefix: non_blank(filters.city),
            specialty,
        })
    }
}

impl DoctorCriteria {
    /// ASCII case-insensitive prefix test, the same rule SQLite `LIKE` applies.
    pub fn matches(&self, lastname: &str, city: &str, specialty: Specialty) -> bool {
        fn has_prefix(value: &str, prefix: &str) -> bool {
            value.len() >= prefix.len()
                && value.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        }
        self.lastname_prefix.as_deref().is_none_or(|p| has_prefix(lastname, p))
            && self.city_prefix.as_deref().is_none_or(|p| has_prefix(city, p))
            && self.specialty.is_none_or(|s| s == specialty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_ignored() {
        let criteria = DoctorCriteria::try_from(DoctorFilters {
            lastname: Some("  ".into()),
            city: Some(String::new()),
            specialty: Some(String::new()),
        })
        .unwrap();
        assert_eq!(criteria, DoctorCriteria::default());
        assert!(criteria.matches("Anyone", "Anywhere", Specialty::Surgeon));
    }

    #[test]
    fn unknown_specialty_is_rejected() {
        let result = DoctorCriteria::try_from(DoctorFilters {
            specialty: Some("Dentist".into()),
            ..Default::default()
        });
        assert!(matches!(result, Err(CareLinkError::InvalidArgument { .. })));
    }

    #[test]
    fn prefix_match_ignores_ascii_case() {
        let criteria = DoctorCriteria {
            lastname_prefix: Some("pap".into()),
            city_prefix: Some("ATH".into()),
            specialty: Some(Specialty::Cardiologist),
        };
        assert!(criteria.matches("Papadopoulos", "Athens", Specialty::Cardiologist));
        assert!(!criteria.matches("Papadopoulos", "Athens", Specialty::Surgeon));
        assert!(!criteria.matches("Georgiou", "Athens", Specialty::Cardiologist));
        assert!(!criteria.matches("Pa", "Athens", Specialty::Cardiologist));
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_prefix() {
        let criteria = DoctorCriteria::try_from(DoctorFilters {
            lastname: Some("Pap ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(criteria.lastname_prefix.as_deref(), Some("Pap "));
        assert!(!criteria.matches("Papadopoulos", "Athens", Specialty::Surgeon));
        assert!(criteria.matches("Pap Nikos", "Athens", Specialty::Surgeon));
    }
}
