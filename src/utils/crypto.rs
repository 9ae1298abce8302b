use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

pub fn hash_password(plain: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plain.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `false` for a wrong password or a missing hash; `Err` only when the stored
/// hash itself is malformed.
pub fn verify_password(plain: &str, hashed: Option<&str>) -> Result<bool, argon2::password_hash::Error> {
    let Some(hashed) = hashed else {
        return Ok(false);
    };
    let parsed_hash = PasswordHash::new(hashed)?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_against_the_original_password() {
        let hash = hash_password("tandoor-2026").unwrap();
        assert!(verify_password("tandoor-2026", Some(&hash)).unwrap());
        assert!(!verify_password("tandoor-2025", Some(&hash)).unwrap());
    }

    #[test]
    fn accounts_without_a_password_never_verify() {
        assert!(!verify_password("anything", None).unwrap());
    }
}
