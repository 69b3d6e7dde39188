use anyhow::Context;
use argon2::{Argon2, PasswordHash, PasswordVerifier};

use crate::application::ports::user_repository::{UserRepository, UserRow};

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// `None` covers every credential mismatch: unknown email, wrong password,
    /// or an account that has no password set.
    pub async fn execute(&self, req: &LoginRequest) -> anyhow::Result<Option<UserRow>> {
        let email = req.email.trim().to_lowercase();
        let Some(mut user) = self.repo.find_by_email(&email).await? else {
            return Ok(None);
        };
        let Some(stored) = user.password_hash.take() else {
            tracing::debug!(user_id = %user.id, "login_without_password_hash");
            return Ok(None);
        };
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| anyhow::anyhow!(e.to_string()))
            .with_context(|| format!("stored password hash for user {} is unreadable", user.id))?;
        let verified = Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_ok();
        Ok(verified.then_some(user))
    }
}
