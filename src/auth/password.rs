use crate::error::AppError;

const PASSWORD_HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(password, PASSWORD_HASH_COST)?)
}

/// A malformed stored hash counts as a mismatch rather than a server error,
/// so login always answers with 401 for bad credentials.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match bcrypt::verify(password, password_hash) {
        Ok(matches) => matches,
        Err(e) => {
            log::warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing_and_verification() {
        let hashed = hash_password("12345678").unwrap();

        assert_ne!(hashed, "12345678");
        assert!(verify_password("12345678", &hashed));
        assert!(!verify_password("87654321", &hashed));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        assert!(!verify_password("12345678", "invalidhashformat"));
    }
}
