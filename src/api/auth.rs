use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use serde_json::{Value, json};

use super::JsonBody;
use crate::{
    auth::{AuthUser, Claims, Keys, hash_password, verify_password},
    content::{Credentials, Registration},
    error::{ApiError, Result},
    state::AppState,
    storage::{DbPool, UserProfile, UserRepo},
};

/// 配置账户相关路由。
///
/// - `POST /auth/register`：注册
/// - `POST /auth/login`：登录
/// - `GET /auth/me`：当前用户
/// - `POST /auth/logout`：登出
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
}

#[derive(Serialize)]
struct Session {
    user: UserProfile,
    token: String,
}

fn session(keys: &Keys, user: UserProfile) -> Result<Json<Session>> {
    let token = keys.sign(&Claims::new(user.id, &user.email, user.role))?;
    Ok(Json(Session { user, token }))
}

/// 注册新用户并直接返回令牌
async fn register(
    State(pool): State<DbPool>,
    State(keys): State<Keys>,
    JsonBody(registration): JsonBody<Registration>,
) -> Result<Json<Session>> {
    let user = registration.validate()?;
    let password_hash = hash_password(user.password.clone()).await?;
    let profile = pool.create_user(&user, &password_hash).await?;

    tracing::info!(user = %profile.id, "user registered");
    session(&keys, profile)
}

/// 邮箱或密码错误、账户停用都返回相同的 401
async fn login(
    State(pool): State<DbPool>,
    State(keys): State<Keys>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<Json<Session>> {
    let (email, password) = credentials.validate()?;

    let user = pool
        .find_user_by_email(&email)
        .await?
        .filter(|u| u.profile.is_active)
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(password, user.password_hash).await? {
        return Err(ApiError::InvalidCredentials.into());
    }

    session(&keys, user.profile)
}

async fn me(State(pool): State<DbPool>, AuthUser(claims): AuthUser) -> Result<Json<Value>> {
    let user = pool
        .find_user(claims.id)
        .await?
        .ok_or(ApiError::NotFound("Not found"))?;
    Ok(Json(json!({ "user": user })))
}

/// 令牌保存在客户端，服务端无需处理
async fn logout() -> Json<Value> {
    Json(json!({ "success": true, "message": "Logged out successfully" }))
}
