//! Login identifier resolution and account field validation.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::roles::Role;

/// Minimum username length.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length of a display name or student identifier.
pub const MAX_NAME_LENGTH: usize = 100;

/// Which `users` column a login identifier is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginIdentifier<'a> {
    Email(&'a str),
    Username(&'a str),
}

/// Classify a login identifier by its shape.
///
/// A well-formed email address is looked up by email only; anything else is
/// treated as a username. Both columns are never tried for one identifier.
pub fn classify_identifier(raw: &str) -> LoginIdentifier<'_> {
    let trimmed = raw.trim();
    if trimmed.validate_email() {
        LoginIdentifier::Email(trimmed)
    } else {
        LoginIdentifier::Username(trimmed)
    }
}

/// Fields of a new account, prior to hashing the password.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub role: &'a str,
    pub full_name: &'a str,
    pub student_id: Option<&'a str>,
}

impl NewAccount<'_> {
    /// Validate every field, reporting all problems in one message.
    ///
    /// Returns the parsed role on success.
    pub fn validate(&self, min_password_length: usize) -> Result<Role, CoreError> {
        let mut errors: Vec<String> = Vec::new();

        if let Err(e) = validate_username(self.username) {
            errors.push(e);
        }

        if self.email.trim().is_empty() {
            errors.push("Email is required".into());
        } else if !self.email.trim().validate_email() {
            errors.push("Invalid email format".into());
        }

        if self.password.is_empty() {
            errors.push("Password is required".into());
        } else if self.password.chars().count() < min_password_length {
            errors.push(format!(
                "Password must be at least {min_password_length} characters long"
            ));
        }

        if self.password != self.confirm_password {
            errors.push("Passwords do not match".into());
        }

        let role = self.role.parse::<Role>().ok();
        if role.is_none() {
            errors.push("Invalid role selected".into());
        }

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push("Full name is required".into());
        } else if full_name.chars().count() > MAX_NAME_LENGTH {
            errors.push(format!(
                "Full name must be at most {MAX_NAME_LENGTH} characters"
            ));
        }

        let student_id = self.student_id.map(str::trim).filter(|s| !s.is_empty());
        if role == Some(Role::Student) && student_id.is_none() {
            errors.push("Student ID is required for student accounts".into());
        }
        if let Some(id) = student_id {
            if id.chars().count() > MAX_NAME_LENGTH {
                errors.push(format!(
                    "Student ID must be at most {MAX_NAME_LENGTH} characters"
                ));
            }
        }

        match role {
            Some(role) if errors.is_empty() => Ok(role),
            _ => Err(CoreError::Validation(errors.join(", "))),
        }
    }
}

/// Validate a username: length bounds and `[A-Za-z0-9_.-]` only.
fn validate_username(username: &str) -> Result<(), String> {
    let username = username.trim();
    if username.is_empty() {
        return Err("Username is required".into());
    }
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("Username may only contain letters, digits, '_', '.' and '-'".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account<'a>(role: &'a str, student_id: Option<&'a str>) -> NewAccount<'a> {
        NewAccount {
            username: "bat.erdene",
            email: "bat@example.edu",
            password: "correct-horse",
            confirm_password: "correct-horse",
            role,
            full_name: "Bat Erdene",
            student_id,
        }
    }

    #[test]
    fn email_shaped_identifiers_resolve_to_email() {
        assert_eq!(
            classify_identifier("teacher@school.edu"),
            LoginIdentifier::Email("teacher@school.edu")
        );
        assert_eq!(
            classify_identifier("  teacher@school.edu "),
            LoginIdentifier::Email("teacher@school.edu")
        );
    }

    #[test]
    fn other_identifiers_resolve_to_username() {
        assert_eq!(classify_identifier("jdoe"), LoginIdentifier::Username("jdoe"));
        assert_eq!(
            classify_identifier("not@an@email"),
            LoginIdentifier::Username("not@an@email")
        );
    }

    #[test]
    fn valid_student_account_passes() {
        assert_eq!(account("student", Some("S100")).validate(8).unwrap(), Role::Student);
    }

    #[test]
    fn valid_teacher_account_needs_no_student_id() {
        assert_eq!(account("teacher", None).validate(8).unwrap(), Role::Teacher);
    }

    #[test]
    fn student_account_without_student_id_fails() {
        let err = account("student", Some("  ")).validate(8).unwrap_err();
        assert!(err.to_string().contains("Student ID is required"));
    }

    #[test]
    fn all_problems_are_reported_together() {
        let bad = NewAccount {
            username: "",
            email: "nope",
            password: "short",
            confirm_password: "different",
            role: "admin",
            full_name: " ",
            student_id: None,
        };
        let msg = bad.validate(8).unwrap_err().to_string();
        for expected in [
            "Username is required",
            "Invalid email format",
            "at least 8 characters",
            "Passwords do not match",
            "Invalid role selected",
            "Full name is required",
        ] {
            assert!(msg.contains(expected), "missing '{expected}' in: {msg}");
        }
    }

    #[test]
    fn username_charset_is_restricted() {
        assert!(validate_username("ok_name-1.x").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }
}
