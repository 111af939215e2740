use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

lazy_static! {
    /// Stand-in hash for logins against unknown emails, so those pay the
    /// same argon2 cost as a wrong password against a real account.
    static ref UNKNOWN_USER_HASH: String =
        hash_password("unknown-user-placeholder").unwrap_or_default();
}

/// Argon2id with a fresh random salt; the PHC string carries salt and params.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow::anyhow!("argon2 hash_password: {e}"))
}

/// Errors only when `hash` is not a PHC string.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("argon2 parse hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Login check. Always runs one argon2 verification: against the stored hash
/// when the account exists, against `UNKNOWN_USER_HASH` otherwise. A stored
/// hash that does not parse counts as a mismatch.
pub fn check_credentials(plain: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(plain, hash).unwrap_or_else(|e| {
            error!(error = %e, "stored password hash is unreadable");
            false
        }),
        None => {
            let _ = verify_password(plain, &UNKNOWN_USER_HASH);
            false
        }
    }
}
