//! User repository

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::enums::Role;
use crate::models::user::{UpdateUser, User, UserPublic};

const USER_SELECT: &str = "SELECT id, name, email, password_hash, role, phone,
            reset_code, reset_code_expires, created_at
     FROM users";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        let sql = format!("{USER_SELECT} WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> AppResult<Vec<UserPublic>> {
        let users = sqlx::query_as::<_, UserPublic>(
            "SELECT id, name, email, role, phone, created_at FROM users ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = match exclude_id {
            Some(id) => {
                sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
                )
                .bind(email)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                    .bind(email)
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(exists)
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        phone: Option<&str>,
        role: Role,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, phone, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, password_hash, role, phone,
                       reset_code, reset_code_expires, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(phone)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Apply a partial update in a fixed column order. The password, when
    /// present, must already be hashed by the caller.
    pub async fn update(
        &self,
        id: i32,
        update: &UpdateUser,
        password_hash: Option<&str>,
    ) -> AppResult<()> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 1;
        macro_rules! set_field {
            ($opt:expr, $col:literal) => {
                if $opt.is_some() {
                    sets.push(format!(concat!($col, " = ${}"), idx));
                    idx += 1;
                }
            };
        }
        set_field!(update.name, "name");
        set_field!(update.email, "email");
        set_field!(password_hash, "password_hash");
        set_field!(update.role, "role");
        set_field!(update.phone, "phone");

        if sets.is_empty() {
            return Err(AppError::Validation("No fields to update".into()));
        }

        let sql = format!("UPDATE users SET {} WHERE id = ${}", sets.join(", "), idx);
        let mut query = sqlx::query(&sql);
        if let Some(v) = &update.name {
            query = query.bind(v);
        }
        if let Some(v) = &update.email {
            query = query.bind(v);
        }
        if let Some(v) = password_hash {
            query = query.bind(v);
        }
        if let Some(v) = update.role {
            query = query.bind(v);
        }
        if let Some(v) = &update.phone {
            query = query.bind(v);
        }
        let result = query.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }

    pub async fn update_profile(
        &self,
        id: i32,
        name: &str,
        email: &str,
        phone: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET name = $1, email = $2, phone = $3 WHERE id = $4")
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_reset_code(
        &self,
        id: i32,
        code: &str,
        expires: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET reset_code = $1, reset_code_expires = $2 WHERE id = $3")
            .bind(code)
            .bind(expires)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set the new password and clear the reset code in one statement.
    pub async fn consume_reset_code(&self, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE users
             SET password_hash = $1, reset_code = NULL, reset_code_expires = NULL
             WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }
        Ok(())
    }
}
