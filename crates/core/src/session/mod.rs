pub mod storage;

use crate::session::storage::SessionStorage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

/// A form field that failed validation, surfaced inline next to the field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub detail: String,
}

impl ValidationError {
    fn new(field: &'static str, detail: impl Into<String>) -> Self {
        Self {
            field,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed (field={}): {}", self.field, self.detail)
    }
}

impl std::error::Error for ValidationError {}

/// Session context object. All reads and writes go through the injected
/// storage port, so a server-backed store can replace the local file without
/// touching callers. This is a demo identity record, not a security boundary:
/// sign-in never verifies the password against anything.
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn sign_in(&self, email: &str, password: &str) -> anyhow::Result<Session> {
        validate_email(email)?;
        if password.len() < 6 {
            return Err(
                ValidationError::new("password", "Password must be at least 6 characters").into(),
            );
        }

        // Demo rule: the display name is the mailbox part of the address.
        let full_name = email.split('@').next().unwrap_or("").to_string();
        let session = Session {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name,
        };

        self.storage.save(&session)?;
        tracing::info!(email = %session.email, "signed in");
        Ok(session)
    }

    pub fn sign_up(&self, email: &str, password: &str, full_name: &str) -> anyhow::Result<Session> {
        validate_email(email)?;
        validate_sign_up_password(password)?;
        if full_name.trim().chars().count() < 2 {
            return Err(
                ValidationError::new("full_name", "Full name must be at least 2 characters").into(),
            );
        }

        let session = Session {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.trim().to_string(),
        };

        self.storage.save(&session)?;
        tracing::info!(email = %session.email, "signed up");
        Ok(session)
    }

    pub fn sign_out(&self) -> anyhow::Result<()> {
        self.storage.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn current(&self) -> anyhow::Result<Option<Session>> {
        self.storage.load()
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty(),
        None => false,
    };
    if !valid {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

fn validate_sign_up_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::new(
            "password",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            "password",
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::InMemorySessionStorage;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(InMemorySessionStorage::default()))
    }

    #[test]
    fn sign_in_derives_name_and_persists() {
        let m = manager();
        let session = m.sign_in("a@b.com", "hunter22").unwrap();
        assert_eq!(session.full_name, "a");
        assert_eq!(session.email, "a@b.com");

        let current = m.current().unwrap().unwrap();
        assert_eq!(current.id, session.id);
    }

    #[test]
    fn sign_in_rejects_bad_email() {
        let m = manager();
        let err = m.sign_in("not-an-email", "hunter22").unwrap_err();
        let v = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(v.field, "email");
        assert!(m.current().unwrap().is_none());
    }

    #[test]
    fn sign_in_rejects_short_password() {
        let m = manager();
        let err = m.sign_in("a@b.com", "abc").unwrap_err();
        let v = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(v.field, "password");
    }

    #[test]
    fn any_long_enough_password_signs_in() {
        // Mock auth: there is no stored credential to check against.
        let m = manager();
        assert!(m.sign_in("a@b.com", "anything-goes").is_ok());
    }

    #[test]
    fn sign_up_enforces_password_rules() {
        let m = manager();

        let short = m.sign_up("a@b.com", "Abc1", "Ada").unwrap_err();
        assert!(short.to_string().contains("at least 8"));

        let no_upper = m.sign_up("a@b.com", "abcdefg1", "Ada").unwrap_err();
        assert!(no_upper.to_string().contains("uppercase"));

        let no_digit = m.sign_up("a@b.com", "Abcdefgh", "Ada").unwrap_err();
        assert!(no_digit.to_string().contains("number"));

        let session = m.sign_up("a@b.com", "Abcdefg1", "Ada Lovelace").unwrap();
        assert_eq!(session.full_name, "Ada Lovelace");
    }

    #[test]
    fn sign_up_rejects_short_full_name() {
        let m = manager();
        let err = m.sign_up("a@b.com", "Abcdefg1", "A").unwrap_err();
        let v = err.downcast_ref::<ValidationError>().unwrap();
        assert_eq!(v.field, "full_name");
    }

    #[test]
    fn sign_out_clears_the_record() {
        let m = manager();
        m.sign_in("a@b.com", "hunter22").unwrap();
        m.sign_out().unwrap();
        assert!(m.current().unwrap().is_none());
    }
}
