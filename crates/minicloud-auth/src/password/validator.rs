//! Password policy enforcement for new passwords.

use minicloud_core::error::AppError;

/// Symbols accepted as the required special character.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks new passwords against the account password policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordValidator;

impl PasswordValidator {
    /// Creates a validator.
    pub fn new() -> Self {
        Self
    }

    /// Returns `Ok(())` if the password meets every rule, or an
    /// `InvalidInput` error naming the first unmet rule.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        if !password.chars().any(|c| c.is_uppercase()) {
            return Err(AppError::invalid_input(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_lowercase()) {
            return Err(AppError::invalid_input(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            return Err(AppError::invalid_input(format!(
                "Password must contain at least one special character ({SPECIAL_CHARACTERS})"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table() {
        let cases = [
            ("Ab!defgh", None),
            ("Short!a", Some("at least 8")),
            ("lowercase!only", Some("uppercase")),
            ("UPPERCASE!ONLY", Some("lowercase")),
            ("NoSymbols123", Some("special character")),
            ("Tilde~Only", Some("special character")),
            ("Ünïcödé!x", None),
        ];

        let validator = PasswordValidator::new();
        for (password, expected) in cases {
            match (validator.validate(password), expected) {
                (Ok(()), None) => {}
                (Err(e), Some(fragment)) => {
                    assert_eq!(e.kind, minicloud_core::ErrorKind::InvalidInput);
                    assert!(
                        e.message.contains(fragment),
                        "{password}: '{}' lacks '{fragment}'",
                        e.message
                    );
                }
                (got, want) => panic!("{password}: got {got:?}, want {want:?}"),
            }
        }
    }
}
