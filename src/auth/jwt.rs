use crate::core::errors::CareLinkError;
use crate::core::models::user::{User, UserRole};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // User ID
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, CareLinkError> {
        self.sub
            .parse()
            .map_err(|_| CareLinkError::NotAuthorized("Invalid token subject".to_string()))
    }

    pub fn require_role(&self, allowed: &[UserRole]) -> Result<&Self, CareLinkError> {
        if allowed.contains(&self.role) {
            Ok(self)
        } else {
            Err(CareLinkError::Forbidden(format!(
                "Role {} is not allowed to access this resource",
                self.role
            )))
        }
    }

    /// Self-access check: the resource owner must be the logged-in user.
    pub fn ensure_owner(&self, owner_id: i64) -> Result<&Self, CareLinkError> {
        if self.user_id()? == owner_id {
            Ok(self)
        } else {
            Err(CareLinkError::Forbidden(
                "User id in the request does not match logged-in user's id.".to_string(),
            ))
        }
    }
}

pub struct JwtService {
    secret: String,
    expiry_secs: u64,
}

impl JwtService {
    pub fn new(secret: String, expiry_hours: u64) -> Self {
        JwtService {
            secret,
            expiry_secs: expiry_hours.saturating_mul(3600),
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, CareLinkError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| CareLinkError::InternalServerError(format!("Time error: {}", e)))?;

        let claims = Claims {
            sub: user.id.to_string(),
            name: user.full_name(),
            email: user.email.clone(),
            role: user.role,
            iat: now as usize,
            exp: now.saturating_add(self.expiry_secs) as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CareLinkError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, CareLinkError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| CareLinkError::NotAuthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            username: "nikos".into(),
            email: "nikos@example.com".into(),
            password: String::new(),
            firstname: "Nikos".into(),
            lastname: "Georgiou".into(),
            role,
            inserted_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let jwt = JwtService::new("test-secret".into(), 3);
        let token = jwt.generate_token(&user(7, UserRole::Doctor)).unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 7);
        assert_eq!(claims.role, UserRole::Doctor);
        assert_eq!(claims.name, "Nikos Georgiou");
        assert_eq!(claims.exp - claims.iat, 3 * 3600);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = JwtService::new("one".into(), 3)
            .generate_token(&user(1, UserRole::Patient))
            .unwrap();
        let result = JwtService::new("two".into(), 3).validate_token(&token);
        assert!(matches!(result, Err(CareLinkError::NotAuthorized(_))));
    }

    #[test]
    fn guards_role_and_ownership() {
        let jwt = JwtService::new("test-secret".into(), 3);
        let token = jwt.generate_token(&user(3, UserRole::Patient)).unwrap();
        let claims = jwt.validate_token(&token).unwrap();

        assert!(claims.require_role(&[UserRole::Patient, UserRole::Doctor]).is_ok());
        assert!(matches!(
            claims.require_role(&[UserRole::Doctor]),
            Err(CareLinkError::Forbidden(_))
        ));
        assert!(claims.ensure_owner(3).is_ok());
        assert!(matches!(claims.ensure_owner(4), Err(CareLinkError::Forbidden(_))));
    }
}
