use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CareLinkError {
    /// Requested entity (user, patient, doctor, association or page) does not exist
    #[error("{message}")]
    EntityNotFound { entity: String, message: String },

    /// A unique value is already taken, or the association already exists
    #[error("{message}")]
    EntityAlreadyExists { entity: String, message: String },

    /// A request argument is out of range or inconsistent
    #[error("{message}")]
    InvalidArgument { field: String, message: String },

    /// Signup or update payload failed field validation
    #[error("Invalid registration: {}", format_field_errors(.0))]
    InvalidRegistration(Vec<FieldError>),

    /// Missing/invalid token or bad credentials
    #[error("{0}")]
    NotAuthorized(String),

    /// Authenticated caller is not allowed to touch the resource
    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl CareLinkError {
    pub fn not_found(entity: &str, message: impl Into<String>) -> Self {
        CareLinkError::EntityNotFound {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn already_exists(entity: &str, message: impl Into<String>) -> Self {
        CareLinkError::EntityAlreadyExists {
            entity: entity.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        CareLinkError::InvalidArgument {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.description))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<sqlx::Error> for CareLinkError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CareLinkError::already_exists("Entity", "A record with the same unique value already exists")
            }
            _ => CareLinkError::DatabaseError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_error_lists_every_field() {
        let err = CareLinkError::InvalidRegistration(vec![
            FieldError::new("username", "too short"),
            FieldError::new("email", "invalid"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid registration: username: too short; email: invalid"
        );
    }

    #[test]
    fn not_found_displays_its_message() {
        let err = CareLinkError::not_found("Doctor", "Doctor with user id 4 wasn't found");
        assert_eq!(err.to_string(), "Doctor with user id 4 wasn't found");
    }
}
