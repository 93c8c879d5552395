//! Password hashing and the account directory

use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::actor::Actor;
use crate::error::{AuthError, Result};

/// Hash a plaintext password into an argon2 PHC string with a random salt
pub fn hash_password(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Check a plaintext password against a PHC string.
///
/// Returns `Ok(false)` on a mismatch and an error only when the stored hash
/// cannot be parsed.
pub fn verify_password(plain: &str, phc: &str) -> Result<bool> {
    let parsed = PasswordHash::new(phc).map_err(|e| AuthError::Hash(e.to_string()))?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

#[derive(Debug, Clone)]
struct Account {
    actor: Actor,
    password_hash: String,
}

/// Known accounts keyed by lower-cased email
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: HashMap<String, Account>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account. Emails are unique regardless of case.
    pub fn insert(&mut self, actor: Actor, password_hash: String) -> Result<()> {
        let key = normalize_email(&actor.email);
        if self.accounts.contains_key(&key) {
            return Err(AuthError::DuplicateAccount(actor.email));
        }
        tracing::debug!("Registered {} account '{}'", actor.role, actor.email);
        self.accounts.insert(
            key,
            Account {
                actor,
                password_hash,
            },
        );
        Ok(())
    }

    /// Authenticate an email/password pair.
    ///
    /// Unknown emails and wrong passwords fail with the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Actor> {
        let Some(account) = self.accounts.get(&normalize_email(email)) else {
            tracing::debug!("Login attempt for unknown account");
            return Err(AuthError::InvalidCredentials);
        };

        if verify_password(password, &account.password_hash)? {
            tracing::info!("{} '{}' logged in", account.actor.role, account.actor.email);
            Ok(account.actor.clone())
        } else {
            tracing::debug!("Wrong password for '{}'", account.actor.email);
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn get(&self, email: &str) -> Option<&Actor> {
        self.accounts
            .get(&normalize_email(email))
            .map(|account| &account.actor)
    }

    /// All actors, sorted by role then name
    pub fn actors(&self) -> Vec<&Actor> {
        let mut actors: Vec<&Actor> = self.accounts.values().map(|a| &a.actor).collect();
        actors.sort_by(|a, b| {
            (a.role as u8, a.name.as_str()).cmp(&(b.role as u8, b.name.as_str()))
        });
        actors
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Role;

    fn actor(email: &str, role: Role) -> Actor {
        Actor {
            id: email.to_string(),
            name: email.split('@').next().unwrap_or_default().to_string(),
            email: email.to_string(),
            role,
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }

    #[test]
    fn authenticate_known_account() {
        let mut directory = AccountDirectory::new();
        directory
            .insert(
                actor("ada@example.org", Role::Admin),
                hash_password("s3cret").unwrap(),
            )
            .unwrap();

        let found = directory.authenticate("ADA@example.org ", "s3cret").unwrap();
        assert_eq!(found.role, Role::Admin);

        let err = directory
            .authenticate("ada@example.org", "wrong")
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn authenticate_unknown_account() {
        let directory = AccountDirectory::new();
        let err = directory
            .authenticate("nobody@example.org", "pw")
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn duplicate_email_rejected() {
        let mut directory = AccountDirectory::new();
        directory
            .insert(actor("t@example.org", Role::Tutor), "x".to_string())
            .unwrap();
        let err = directory
            .insert(actor("T@example.org", Role::Student), "y".to_string())
            .unwrap_err();
        assert!(matches!(err, AuthError::DuplicateAccount(_)));
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn actors_sorted_by_role_then_name() {
        let mut directory = AccountDirectory::new();
        for (email, role) in [
            ("zoe@example.org", Role::Student),
            ("bob@example.org", Role::Tutor),
            ("amy@example.org", Role::Student),
            ("root@example.org", Role::Admin),
        ] {
            directory.insert(actor(email, role), String::new()).unwrap();
        }

        let names: Vec<&str> = directory.actors().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["root", "bob", "amy", "zoe"]);
    }
}
