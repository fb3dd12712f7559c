use crate::auth::jwt::{Claims, JwtService};
use crate::auth::password::{hash_password, verify_password};
use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::UserDoctor,
    patient::UserPatient,
    user::{User, UserReadOnly},
};
use crate::infrastructure::storage::Storage;
use std::sync::Arc;
use tracing::{info, warn};

mod doctors;
mod patients;

pub struct CareLinkService {
    storage: Arc<dyn Storage>,
    jwt_service: JwtService,
    password_cost: u32,
}

impl CareLinkService {
    pub fn new(storage: Arc<dyn Storage>, jwt_secret: String, token_expiry_hours: u64) -> Self {
        CareLinkService {
            storage,
            jwt_service: JwtService::new(jwt_secret, token_expiry_hours),
            password_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, CareLinkError> {
        self.jwt_service.validate_token(token)
    }

    /// Unknown username and wrong password are reported identically.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String, CareLinkError> {
        let bad_credentials = || CareLinkError::NotAuthorized("Bad credentials".to_string());

        let Some(user) = self.storage.get_user_by_username(username).await? else {
            warn!("Login rejected for unknown username {}", username);
            return Err(bad_credentials());
        };
        if !verify_password(password, &user.password)? {
            warn!("Login rejected for user {}", user.id);
            return Err(bad_credentials());
        }

        let token = self.jwt_service.generate_token(&user)?;
        info!("User {} logged in as {}", user.id, user.role);
        Ok(token)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserReadOnly, CareLinkError> {
        self.storage
            .get_user(user_id)
            .await?
            .map(|user| UserReadOnly::from(&user))
            .ok_or_else(|| CareLinkError::not_found("User", format!("User with id {} wasn't found", user_id)))
    }

    fn hash(&self, password: &str) -> Result<String, CareLinkError> {
        hash_password(password, self.password_cost)
    }

    /// Username and email must not belong to any user other than `except`.
    async fn ensure_user_unique(
        &self,
        username: &str,
        email: &str,
        except: Option<i64>,
    ) -> Result<(), CareLinkError> {
        let (by_username, by_email) = futures::try_join!(
            self.storage.get_user_by_username(username),
            self.storage.get_user_by_email(email)
        )?;
        let taken = |user: &Option<User>| user.as_ref().is_some_and(|u| Some(u.id) != except);

        if taken(&by_username) {
            return Err(CareLinkError::already_exists(
                "User",
                format!("User with username {} already exists", username),
            ));
        }
        if taken(&by_email) {
            return Err(CareLinkError::already_exists(
                "User",
                format!("User with email {} already exists", email),
            ));
        }
        Ok(())
    }

    async fn require_patient(&self, user_id: i64) -> Result<UserPatient, CareLinkError> {
        self.storage
            .get_patient_by_user_id(user_id)
            .await?
            .ok_or_else(|| CareLinkError::not_found("Patient", format!("Patient with user id {} wasn't found", user_id)))
    }

    async fn require_doctor(&self, user_id: i64) -> Result<UserDoctor, CareLinkError> {
        self.storage
            .get_doctor_by_user_id(user_id)
            .await?
            .ok_or_else(|| CareLinkError::not_found("Doctor", format!("Doctor with user id {} wasn't found", user_id)))
    }
}

fn ensure_path_matches_body(path_id: i64, body_id: i64) -> Result<(), CareLinkError> {
    if path_id != body_id {
        return Err(CareLinkError::invalid_argument(
            "id",
            "The Id in the route does not match the Id in the body.",
        ));
    }
    Ok(())
}
