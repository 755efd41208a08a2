use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Registration-time policy check. Length only; the original client imposed
/// nothing stricter.
pub fn acceptable_password(plain: &str) -> bool {
    plain.trim().len() >= MIN_PASSWORD_LEN
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("argon2 hash failed: {e}"))
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("stored hash malformed: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_password_verifies_against_its_hash() {
        let plain = "glucose-tracker-2026";
        assert!(acceptable_password(plain));
        let hash = hash_password(plain).expect("hash");
        assert!(verify_password(plain, &hash).expect("verify"));
        assert!(!verify_password("glucose-tracker-2025", &hash).expect("verify"));
    }

    #[test]
    fn hashes_are_salted_per_call() {
        let a = hash_password("same-password").expect("hash");
        let b = hash_password("same-password").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_is_an_error_not_a_mismatch() {
        let err = verify_password("anything", "$argon2id$garbage").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn policy_rejects_short_and_whitespace_padded_passwords() {
        assert!(!acceptable_password("short"));
        assert!(!acceptable_password("   1234   "));
        assert!(acceptable_password("12345678"));
    }
}
