use crate::constants::{
    ADDRESS_LEN, AFM_LEN, AMKA_LEN, CITY_LEN, EMAIL_MAX_LEN, NAME_LEN, PASSWORD_LEN, PHONE_LEN, USERNAME_LEN,
};
use crate::core::errors::{CareLinkError, FieldError};
use crate::core::models::{doctor::DoctorSignup, patient::PatientSignup, user::UserUpdate};

/// Collects every field violation so the caller gets one combined error.
#[derive(Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, description: String) -> &mut Self {
        self.errors.push(FieldError::new(field, description));
        self
    }

    pub fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize)) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            return self.fail(field, format!("{} must be between {} and {} characters", field, min, max));
        }
        self
    }

    pub fn no_whitespace(&mut self, field: &str, value: &str) -> &mut Self {
        if value.chars().any(char::is_whitespace) {
            return self.fail(field, format!("{} cannot contain whitespace", field));
        }
        self
    }

    pub fn trimmed(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim() != value {
            return self.fail(field, format!("{} cannot start or end with whitespace", field));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if value.chars().count() > EMAIL_MAX_LEN {
            return self.fail(field, format!("{} cannot exceed {} characters", field, EMAIL_MAX_LEN));
        }
        let well_formed = match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && !value.chars().any(char::is_whitespace)
                    && domain
                        .rsplit_once('.')
                        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            }
            None => false,
        };
        if !well_formed {
            return self.fail(field, format!("{} is not a valid email address", field));
        }
        self
    }

    pub fn password(&mut self, field: &str, value: &str) -> &mut Self {
        let len = value.chars().count();
        let strong = value.chars().any(|c| c.is_ascii_uppercase())
            && value.chars().any(|c| c.is_ascii_lowercase())
            && value.chars().any(|c| c.is_ascii_digit())
            && value.chars().any(|c| !c.is_alphanumeric() && c != '_');
        if len < PASSWORD_LEN.0 || len > PASSWORD_LEN.1 || !strong {
            return self.fail(
                field,
                format!(
                    "{} must be {}-{} characters with an uppercase letter, a lowercase letter, a digit and a special character",
                    field, PASSWORD_LEN.0, PASSWORD_LEN.1
                ),
            );
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), CareLinkError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CareLinkError::InvalidRegistration(std::mem::take(&mut self.errors)))
        }
    }

    fn common(
        &mut self,
        username: &str,
        email: &str,
        firstname: &str,
        lastname: &str,
        phone_number: &str,
        city: &str,
        address: &str,
    ) -> &mut Self {
        self.length("username", username, USERNAME_LEN)
            .no_whitespace("username", username)
            .email("email", email)
            .length("firstname", firstname, NAME_LEN)
            .no_whitespace("firstname", firstname)
            .length("lastname", lastname, NAME_LEN)
            .no_whitespace("lastname", lastname)
            .length("phoneNumber", phone_number, PHONE_LEN)
            .no_whitespace("phoneNumber", phone_number)
            .length("city", city, CITY_LEN)
            .no_whitespace("city", city)
            .length("address", address, ADDRESS_LEN)
            .trimmed("address", address)
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), CareLinkError>;
}

impl Validate for PatientSignup {
    fn validate(&self) -> Result<(), CareLinkError> {
        let mut v = Validator::new();
        v.common(
            &self.username,
            &self.email,
            &self.firstname,
            &self.lastname,
            &self.phone_number,
            &self.city,
            &self.address,
        )
        .password("password", &self.password)
        .length("amka", &self.amka, AMKA_LEN)
        .no_whitespace("amka", &self.amka);
        v.finish()
    }
}

impl Validate for DoctorSignup {
    fn validate(&self) -> Result<(), CareLinkError> {
        let mut v = Validator::new();
        v.common(
            &self.username,
            &self.email,
            &self.firstname,
            &self.lastname,
            &self.phone_number,
            &self.city,
            &self.address,
        )
        .password("password", &self.password)
        .length("afm", &self.afm, AFM_LEN)
        .no_whitespace("afm", &self.afm);
        v.finish()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), CareLinkError> {
        let mut v = Validator::new();
        v.common(
            &self.username,
            &self.email,
            &self.firstname,
            &self.lastname,
            &self.phone_number,
            &self.city,
            &self.address,
        );
        v.finish()
    }
}
