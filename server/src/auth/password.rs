use crate::config::Config;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Params, Version};
use argon2::{Argon2, Error as ArgonError};

/// Takes a plaintext `password` and hashes it using a cryptographically secure,
/// memory-hard hash: Argon2id. A randomly generated salt is mixed in with the
/// hash to protect against rainbow table attacks, and the configured secret is
/// used as a pepper. The returned PHC string embeds the salt and parameters.
pub fn hash_password(config: &Config, password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon_context = create_argon_context(config)?;
    let password_hash = argon_context.hash_password(password.as_bytes(), &salt)?;
    Ok(password_hash.to_string())
}

/// Returns [`Ok`] if the given `password_hash` and `password` match.
pub fn is_valid_password(config: &Config, password_hash: &str, password: &str) -> Result<(), Error> {
    let argon_context = create_argon_context(config)?;
    PasswordHash::new(password_hash)
        .and_then(|parsed_hash| argon_context.verify_password(password.as_bytes(), &parsed_hash))
}

/// Checks `password` against the hash of the account being logged into. When no account
/// matched, a throwaway hash is verified instead so the response takes as long either way.
pub fn verify_login(config: &Config, password_hash: Option<&str>, password: &str) -> bool {
    let matches = is_valid_password(config, password_hash.unwrap_or(UNMATCHABLE_HASH), password).is_ok();
    matches && password_hash.is_some()
}

/// Argon2id hash with default parameters that belongs to no account.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dW5tYXRjaGFibGU$voqGcDZhS6JWiMJy9q12zBgrC6OTBKa9dL8k0O8gD4M";

fn create_argon_context(config: &Config) -> Result<Argon2<'_>, ArgonError> {
    Argon2::new_with_secret(
        config.password_secret.as_bytes(),
        Algorithm::default(),
        Version::default(),
        Params::default(),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config;
    use crate::test::*;

    #[test]
    fn hash_password() {
        let test_config = config::test_config(None);
        let hash = super::hash_password(&test_config, TEST_PASSWORD).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(is_valid_password(&test_config, &hash, TEST_PASSWORD).is_ok());
        assert!(is_valid_password(&test_config, &hash, "wrong_password").is_err());
    }

    #[test]
    fn salted() {
        let test_config = config::test_config(None);
        let first = super::hash_password(&test_config, TEST_PASSWORD).unwrap();
        let second = super::hash_password(&test_config, TEST_PASSWORD).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn peppered() {
        let test_config = config::test_config(None);
        let hash = super::hash_password(&test_config, TEST_PASSWORD).unwrap();

        let mut other_config = config::test_config(None);
        other_config.password_secret = String::from("another_secret");
        assert!(is_valid_password(&other_config, &hash, TEST_PASSWORD).is_err());
    }

    #[test]
    fn verify_login() {
        let test_config = config::test_config(None);
        let hash = super::hash_password(&test_config, TEST_PASSWORD).unwrap();
        assert!(super::verify_login(&test_config, Some(&hash), TEST_PASSWORD));
        assert!(!super::verify_login(&test_config, Some(&hash), "wrong_password"));
        assert!(!super::verify_login(&test_config, None, TEST_PASSWORD));
    }

    #[test]
    fn unmatchable_hash_is_verified() {
        let parsed = PasswordHash::new(UNMATCHABLE_HASH).unwrap();
        let params = Params::try_from(&parsed).unwrap();
        let defaults = Params::default();
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());

        // A full verification runs and fails on the digest rather than on parsing
        let test_config = config::test_config(None);
        let result = is_valid_password(&test_config, UNMATCHABLE_HASH, TEST_PASSWORD);
        assert!(matches!(result, Err(Error::Password)));
    }
}
