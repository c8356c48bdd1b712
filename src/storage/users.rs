use std::future::Future;

use uuid::Uuid;

use super::{DbPool, UserProfile, UserRecord, UserRole};
use crate::{
    content::NewUser,
    error::{ApiError, Result},
};

const PROFILE_COLUMNS: &str = "id, email, first_name, last_name, phone, organization, role, \
     is_active, email_verified, created_at, updated_at";

/// 用户表操作
pub trait UserRepo: Send + Sync {
    /// 按邮箱查找用户，用于登录
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>>> + Send;

    fn find_user(&self, id: Uuid) -> impl Future<Output = Result<Option<UserProfile>>> + Send;

    /// 创建用户，邮箱已存在时返回 [`ApiError::Conflict`]
    fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
    ) -> impl Future<Output = Result<UserProfile>> + Send;

    /// 是否已经存在管理员
    fn any_admin(&self) -> impl Future<Output = Result<bool>> + Send;

    /// 在还没有管理员时把指定用户设为管理员
    ///
    /// 判断和更新在同一条语句中完成，并发请求中只有一个会成功，其余返回 `None`。
    fn promote_first_admin(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<UserRole>>> + Send;

    fn count_users(&self) -> impl Future<Output = Result<i64>> + Send;
}

impl UserRepo for DbPool {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT password_hash, {PROFILE_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, user: &NewUser, password_hash: &str) -> Result<UserProfile> {
        let result = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, phone, organization)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.organization)
        .fetch_one(self)
        .await;

        match result {
            Ok(profile) => Ok(profile),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::Conflict("Email already in use").into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn any_admin(&self) -> Result<bool> {
        let exists =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'ADMIN')")
                .fetch_one(self)
                .await?;
        Ok(exists)
    }

    async fn promote_first_admin(&self, id: Uuid) -> Result<Option<UserRole>> {
        let user = sqlx::query_as::<_, UserRole>(
            r#"
            UPDATE users
            SET role = 'ADMIN', updated_at = now()
            WHERE id = $1
            AND NOT EXISTS (SELECT 1 FROM users WHERE role = 'ADMIN')
            RETURNING id, email, role
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self)
            .await?;
        Ok(count)
    }
}
