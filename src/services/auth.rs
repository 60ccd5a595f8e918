//! Authentication and account management

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand::Rng;
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::enums::Role;
use crate::models::user::{CreateUser, UpdateProfile, User, UserClaims, UserPublic};
use crate::repository::Repository;

use super::email::{reset_code_message, send_or_log, Notifier};

const RESET_CODE_TTL_MINUTES: i64 = 15;

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            config,
            notifier,
        }
    }

    /// Register a new account. Self-registration always gets the default
    /// role; privileged roles are assigned through the admin user endpoints.
    pub async fn register(&self, create: &CreateUser) -> AppResult<(String, UserPublic)> {
        create
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.email_exists(&create.email, None).await? {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let hash = hash_password(&create.password)?;
        let user = self
            .repository
            .users
            .create(
                &create.name,
                &create.email,
                &hash,
                create.phone.as_deref(),
                Role::User,
            )
            .await?;

        let token = self.issue_token(&user)?;
        Ok((token, user.into()))
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, UserPublic)> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".into()))?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::Authentication("Invalid credentials".into()));
        }

        let token = self.issue_token(&user)?;
        Ok((token, user.into()))
    }

    pub async fn me(&self, user_id: i32) -> AppResult<UserPublic> {
        Ok(self.repository.users.get(user_id).await?.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        update: &UpdateProfile,
    ) -> AppResult<UserPublic> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .users
            .email_exists(&update.email, Some(user_id))
            .await?
        {
            return Err(AppError::Conflict(
                "Email is already used by another account".into(),
            ));
        }

        self.repository
            .users
            .update_profile(user_id, &update.name, &update.email, update.phone.as_deref())
            .await?;
        self.me(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: i32,
        current: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if new_password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        let user = self.repository.users.get(user_id).await?;
        if !verify_password(&user.password_hash, current)? {
            return Err(AppError::Authentication(
                "Current password is incorrect".into(),
            ));
        }

        let hash = hash_password(new_password)?;
        self.repository.users.update_password(user_id, &hash).await
    }

    /// Generate and store a reset code, then hand it to the notifier.
    ///
    /// Always succeeds from the caller's point of view: an unknown email is
    /// not revealed, and a delivery failure only logs the code so an operator
    /// can pass it along manually.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let user = match self.repository.users.get_by_email(email).await? {
            Some(user) => user,
            None => {
                tracing::debug!(email, "Password reset requested for unknown email");
                return Ok(());
            }
        };

        let code = generate_reset_code();
        let expires = Utc::now() + Duration::minutes(RESET_CODE_TTL_MINUTES);
        self.repository
            .users
            .set_reset_code(user.id, &code, expires)
            .await?;

        let (subject, body) = reset_code_message(&code);
        send_or_log(self.notifier.as_ref(), &user.email, &subject, &body, &code).await;
        Ok(())
    }

    pub async fn reset_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        if new_password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid or expired reset code".into()))?;

        let valid = matches!(
            (&user.reset_code, user.reset_code_expires),
            (Some(stored), Some(expires)) if stored == code && expires > Utc::now()
        );
        if !valid {
            return Err(AppError::Validation("Invalid or expired reset code".into()));
        }

        let hash = hash_password(new_password)?;
        self.repository.users.consume_reset_code(user.id, &hash).await
    }

    fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            role: user.role,
            iat: now,
            exp: now + (self.config.jwt_expiration_hours as i64) * 3600,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn generate_reset_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password(&hash, "hunter22").unwrap());
        assert!(!verify_password(&hash, "hunter23").unwrap());
    }

    #[test]
    fn reset_codes_are_six_digits() {
        for _ in 0..50 {
            let code = generate_reset_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
