//! Admin user management

use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::enums::Role;
use crate::models::history::actions;
use crate::models::user::{CreateUser, UpdateUser, UserPublic};
use crate::repository::Repository;

use super::auth::hash_password;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<UserPublic>> {
        self.repository.users.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<UserPublic> {
        Ok(self.repository.users.get(id).await?.into())
    }

    pub async fn create(&self, admin_id: i32, create: &CreateUser) -> AppResult<UserPublic> {
        create
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if self.repository.users.email_exists(&create.email, None).await? {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let hash = hash_password(&create.password)?;
        let role = create.role.unwrap_or(Role::User);
        let user = self
            .repository
            .users
            .create(&create.name, &create.email, &hash, create.phone.as_deref(), role)
            .await?;

        self.repository
            .history
            .record(
                admin_id,
                actions::CREATE_USER,
                "user",
                user.id,
                Some(&format!("Created account '{}' ({})", user.email, role)),
            )
            .await?;
        Ok(user.into())
    }

    pub async fn update(&self, admin_id: i32, id: i32, update: &UpdateUser) -> AppResult<UserPublic> {
        update
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if update.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }
        if update.role.is_some() && id == admin_id {
            return Err(AppError::Validation(
                "You cannot change your own role".into(),
            ));
        }
        if let Some(email) = &update.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(
                    "Email is already used by another account".into(),
                ));
            }
        }

        let password_hash = match &update.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };
        self.repository
            .users
            .update(id, update, password_hash.as_deref())
            .await?;

        self.repository
            .history
            .record(admin_id, actions::UPDATE_USER, "user", id, None)
            .await?;
        self.get(id).await
    }

    pub async fn set_role(&self, admin_id: i32, id: i32, role: Role) -> AppResult<UserPublic> {
        let update = UpdateUser {
            role: Some(role),
            ..UpdateUser::default()
        };
        self.update(admin_id, id, &update).await
    }

    /// Delete an account. Self-deletion is refused, as is deleting a user
    /// who still holds an active loan.
    pub async fn delete(&self, admin_id: i32, id: i32) -> AppResult<()> {
        if id == admin_id {
            return Err(AppError::Validation(
                "You cannot delete your own account".into(),
            ));
        }
        if self.repository.loans.user_has_active_loans(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete a user with active loans".into(),
            ));
        }
        self.repository.users.delete(id).await
    }
}
