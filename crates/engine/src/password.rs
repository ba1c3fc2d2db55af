//! Credential policy and hashing.
//!
//! [`PasswordPolicy`] is pure: it only inspects the candidate strings and
//! reports every violation at once. [`CredentialHasher`] turns an accepted
//! password into an Argon2id PHC string and verifies login attempts against
//! it.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::{EngineError, FieldErrors, ResultEngine};

pub const PASSWORD_FIELD: &str = "password";
pub const CONFIRM_FIELD: &str = "confirm_password";

const MISMATCH: &str = "Passwords do not match";
const COMMON: &str = "This password is too common.";
const NUMERIC: &str = "This password is entirely numeric.";

fn has_upper(c: char) -> bool {
    c.is_ascii_uppercase()
}

fn has_lower(c: char) -> bool {
    c.is_ascii_lowercase()
}

fn has_digit(c: char) -> bool {
    c.is_numeric()
}

fn has_special(c: char) -> bool {
    !c.is_alphanumeric() || c == '_'
}

/// Character classes every password must contain, checked in this order.
const CHARACTER_CLASSES: [(fn(char) -> bool, &str); 4] = [
    (has_upper, "Password must contain at least 1 uppercase letter."),
    (has_lower, "Password must contain at least 1 lowercase letter."),
    (has_digit, "Password must contain at least 1 number."),
    (has_special, "Password must contain at least 1 special character."),
];

/// Lowercased passwords rejected outright.
const COMMON_PASSWORDS: &[&str] = &[
    "123456",
    "123456789",
    "12345678",
    "1234567890",
    "password",
    "password1",
    "password123",
    "password@123",
    "passw0rd",
    "p@ssw0rd",
    "p@ssword1",
    "qwerty",
    "qwerty123",
    "qwertyuiop",
    "abc123",
    "abcd1234",
    "111111",
    "11111111",
    "000000",
    "iloveyou",
    "admin",
    "admin123",
    "admin@123",
    "welcome",
    "welcome1",
    "welcome@123",
    "letmein",
    "monkey",
    "dragon",
    "football",
    "baseball",
    "sunshine",
    "princess",
    "superman",
    "trustno1",
    "master",
    "starwars",
    "whatever",
    "changeme",
    "1q2w3e4r",
    "zaq12wsx",
    "asdfghjkl",
];

/// Composite password policy.
///
/// The baseline rules (length, common list, numeric-only) run first; the
/// character-class rules follow and append to the same list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    #[must_use]
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Check `password` against every rule and `confirm` for an exact match.
    ///
    /// Violations are returned together under `password` and
    /// `confirm_password`; nothing short-circuits.
    pub fn validate(&self, password: &str, confirm: &str) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for message in self.baseline_violations(password) {
            errors.add(PASSWORD_FIELD, message);
        }
        if password != confirm {
            errors.add(CONFIRM_FIELD, MISMATCH);
        }
        for message in character_class_violations(password) {
            errors.add(PASSWORD_FIELD, message);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// All strength violations of `password` alone, baseline first.
    #[must_use]
    pub fn strength_violations(&self, password: &str) -> Vec<String> {
        let mut messages = self.baseline_violations(password);
        messages.extend(character_class_violations(password).map(str::to_string));
        messages
    }

    fn baseline_violations(&self, password: &str) -> Vec<String> {
        let mut messages = Vec::new();

        if password.chars().count() < self.min_length {
            let unit = if self.min_length == 1 {
                "character"
            } else {
                "characters"
            };
            messages.push(format!(
                "This password is too short. It must contain at least {} {unit}.",
                self.min_length
            ));
        }
        let lowered = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            messages.push(COMMON.to_string());
        }
        if !password.is_empty() && password.chars().all(char::is_numeric) {
            messages.push(NUMERIC.to_string());
        }

        messages
    }
}

fn character_class_violations(password: &str) -> impl Iterator<Item = &'static str> + '_ {
    CHARACTER_CLASSES
        .iter()
        .filter(|(check, _)| !password.chars().any(*check))
        .map(|(_, message)| *message)
}

/// Argon2id hasher with explicit cost parameters.
#[derive(Clone, Debug)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Verified against when the login email is unknown, so both failure
    /// paths pay for one hash verification.
    dummy_hash: String,
}

impl CredentialHasher {
    /// Build a hasher from Argon2 cost parameters (memory in KiB, iterations,
    /// lanes).
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> ResultEngine<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| EngineError::Internal(format!("invalid argon2 params: {err}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "moneta-dummy-credential")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password into a PHC string (salt included).
    pub fn hash(&self, password: &str) -> ResultEngine<String> {
        hash_with(&self.argon2, password)
    }

    /// Returns `true` when `password` matches the stored PHC string. A
    /// malformed stored hash never matches.
    #[must_use]
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Burn one verification without a real account.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        let argon2 = Argon2::default();
        let dummy_hash = hash_with(&argon2, "moneta-dummy-credential").unwrap_or_default();
        Self { argon2, dummy_hash }
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::Internal(format!("credential hashing failed: {err}")))
}
