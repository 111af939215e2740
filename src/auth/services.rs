use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::{
    dto::{LoginRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{check_credentials, hash_password},
    repo::UserRepo,
    repo_types::{NewUser, User},
};
use crate::{db::StoreError, error::AppError};

const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn register(users: &dyn UserRepo, payload: RegisterRequest) -> Result<User, AppError> {
    let email = payload.email.trim().to_string();
    let name = payload.name.trim().to_string();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation("Password too short"));
    }
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }

    let password_hash = hash_password(&payload.password)?;
    let user = users
        .create(NewUser {
            email,
            name,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                warn!("email already registered");
                AppError::Conflict("Email already registered")
            }
            other => AppError::from(other),
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Returns a signed token. Unknown email and wrong password share one error.
pub async fn login(
    users: &dyn UserRepo,
    keys: &JwtKeys,
    payload: LoginRequest,
) -> Result<String, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required"));
    }

    let found = users.find_by_email(email).await?;
    let matched = check_credentials(
        &payload.password,
        found.as_ref().map(|u| u.password_hash.as_str()),
    );
    let user = match found {
        Some(user) if matched => user,
        Some(user) => {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Unauthorized("Invalid email or password"));
        }
        None => {
            warn!(email = %email, "login unknown email");
            return Err(AppError::Unauthorized("Invalid email or password"));
        }
    };

    let token = keys.sign(user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(token)
}
