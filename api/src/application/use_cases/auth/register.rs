use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use regex::Regex;

use crate::application::ports::user_repository::{CreateUserError, UserRepository, UserRow};
use crate::domain::users::Role;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const MIN_PASSWORD_LEN: usize = 8;

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    /// Registrations with this address are granted the admin role.
    pub admin_email: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(thiserror::Error, Debug)]
pub enum RegisterError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Store(anyhow::Error),
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<UserRow, RegisterError> {
        let email = req.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(RegisterError::InvalidEmail);
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(RegisterError::WeakPassword);
        }
        let role = match self.admin_email {
            Some(admin) if admin == email => Role::Admin,
            _ => Role::User,
        };
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| RegisterError::Store(anyhow::anyhow!(e.to_string())))?
            .to_string();
        self.repo
            .create_user(&email, req.name.trim(), role, &hash)
            .await
            .map_err(|e| match e {
                CreateUserError::DuplicateEmail => RegisterError::DuplicateEmail,
                CreateUserError::Store(err) => RegisterError::Store(err),
            })
    }
}
