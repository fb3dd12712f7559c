use crate::core::errors::CareLinkError;

pub fn hash_password(password: &str, cost: u32) -> Result<String, CareLinkError> {
    bcrypt::hash(password, cost).map_err(|e| CareLinkError::InternalServerError(format!("Password hashing error: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, CareLinkError> {
    bcrypt::verify(password, hash)
        .map_err(|e| CareLinkError::InternalServerError(format!("Password verification error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_hashed_password() {
        let hash = hash_password("Secret#123", 4).unwrap();
        assert_ne!(hash, "Secret#123");
        assert!(verify_password("Secret#123", &hash).unwrap());
        assert!(!verify_password("Secret#124", &hash).unwrap());
    }
}
