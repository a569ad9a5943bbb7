use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{CompanyId, DomainError, DomainResult, UserId};

use crate::Role;

pub const MIN_PASSWORD_LEN: usize = 6;

/// A user of a company. The password hash is kept by the store, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub company_id: CompanyId,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn roles(&self) -> Vec<Role> {
        Role::for_account(self.is_admin)
    }

    /// Login identifier match: email (case-insensitive) or exact username.
    pub fn matches_login(&self, login: &str) -> bool {
        let login = login.trim();
        self.email.eq_ignore_ascii_case(login) || self.username == login
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    /// Validate and normalize input. Email is lowercased, text fields trimmed.
    pub fn validate(mut self) -> DomainResult<Self> {
        self.email = self.email.trim().to_lowercase();
        self.username = self.username.trim().to_string();
        self.full_name = self.full_name.trim().to_string();

        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        if self.username.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if self.full_name.is_empty() {
            return Err(DomainError::validation("full name cannot be empty"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(self)
    }

    pub fn into_account(self, company_id: CompanyId, now: DateTime<Utc>) -> UserAccount {
        UserAccount {
            id: UserId::new(),
            company_id,
            email: self.email,
            username: self.username,
            full_name: self.full_name,
            is_admin: self.is_admin,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewUser {
        NewUser {
            email: " Ana@Example.com ".into(),
            username: " ana ".into(),
            full_name: "Ana Pérez".into(),
            password: "secreto".into(),
            is_admin: false,
        }
    }

    #[test]
    fn normalizes_valid_input() {
        let user = input().validate().unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.username, "ana");

        let account = user.into_account(CompanyId::new(), Utc::now());
        assert!(account.matches_login("ANA@example.com"));
        assert!(account.matches_login("ana"));
        assert!(!account.matches_login("Ana"));
        assert_eq!(account.roles(), vec![Role::operator()]);
    }

    #[test]
    fn rejects_bad_email_and_short_password() {
        let mut bad = input();
        bad.email = "ana.example.com".into();
        assert!(matches!(bad.validate(), Err(DomainError::Validation(_))));

        let mut short = input();
        short.password = "12345".into();
        assert!(short.validate().is_err());

        let mut blank = input();
        blank.full_name = "  ".into();
        assert!(blank.validate().is_err());
    }
}
