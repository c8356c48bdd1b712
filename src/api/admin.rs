use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch, post},
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{JsonBody, PathId};
use crate::{
    auth::{AuthUser, Staff},
    content::ArticleStatus,
    error::{ApiError, Result},
    state::AppState,
    storage::{
        AdminArticle, ArticleRepo, ContactRepo, ContactSubmission, DashboardStats, DbPool,
        PageInfo, Pagination, RetryPolicy, Review, UserRepo, with_retry,
    },
};

/// 配置后台路由，除 `promote-self` 外都要求编辑部权限。
///
/// - `GET /admin/articles`：稿件列表
/// - `PATCH /admin/articles/{id}/approve|reject|publish`：审核
/// - `GET /admin/stats`：统计
/// - `GET /admin/contacts`：联系表单
/// - `POST /admin/promote-self`：初始化第一个管理员
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/admin/articles", get(articles))
        .route("/admin/articles/{id}/approve", patch(approve))
        .route("/admin/articles/{id}/reject", patch(reject))
        .route("/admin/articles/{id}/publish", patch(publish))
        .route("/admin/stats", get(stats))
        .route("/admin/contacts", get(contacts))
        .route("/admin/promote-self", post(promote_self))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminListParams {
    page: Option<String>,
    limit: Option<String>,
    status: Option<String>,
}

#[derive(Serialize)]
struct AdminArticleList {
    articles: Vec<AdminArticle>,
    pagination: PageInfo,
}

async fn articles(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<AdminArticleList>> {
    let page = Pagination::parse(params.page.as_deref(), params.limit.as_deref());
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            ArticleStatus::parse(s).ok_or_else(|| ApiError::bad_request("Invalid status"))?,
        ),
    };

    let (articles, total) =
        with_retry(RetryPolicy::default(), || pool.list_admin(page, status)).await?;

    Ok(Json(AdminArticleList {
        articles,
        pagination: page.info(total),
    }))
}

async fn review(pool: &DbPool, id: PathId, review: Review) -> Result<Json<Value>> {
    let article = pool
        .review_article(id.0, &review)
        .await?
        .ok_or(ApiError::NotFound("Not found"))?;

    tracing::info!(article = %article.id, status = article.status.as_str(), "article reviewed");
    Ok(Json(json!({ "article": article })))
}

async fn approve(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    id: PathId,
) -> Result<Json<Value>> {
    review(&pool, id, Review::Approve).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RejectBody {
    rejection_reason: Option<String>,
}

async fn reject(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    id: PathId,
    JsonBody(body): JsonBody<RejectBody>,
) -> Result<Json<Value>> {
    let reason = body
        .rejection_reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::bad_request("rejectionReason required"))?;

    review(&pool, id, Review::Reject(reason)).await
}

async fn publish(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    id: PathId,
) -> Result<Json<Value>> {
    review(&pool, id, Review::Publish).await
}

/// 七个计数并发查询，每个都按 [`RetryPolicy::STATS`] 独立重试
async fn stats(Staff(_): Staff, State(pool): State<DbPool>) -> Result<Json<DashboardStats>> {
    let policy = RetryPolicy::STATS;
    let pool = &pool;
    let count = |status: Option<ArticleStatus>| {
        with_retry(policy, move || pool.count_articles(status))
    };

    let (
        total_articles,
        pending_articles,
        approved_articles,
        rejected_articles,
        published_articles,
        total_users,
        total_contacts,
    ) = tokio::try_join!(
        count(None),
        count(Some(ArticleStatus::Pending)),
        count(Some(ArticleStatus::Approved)),
        count(Some(ArticleStatus::Rejected)),
        count(Some(ArticleStatus::Published)),
        with_retry(policy, || pool.count_users()),
        with_retry(policy, || pool.count_contacts()),
    )?;

    Ok(Json(DashboardStats {
        total_articles,
        pending_articles,
        approved_articles,
        rejected_articles,
        published_articles,
        total_users,
        total_contacts,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Serialize)]
struct ContactList {
    contacts: Vec<ContactSubmission>,
    pagination: PageInfo,
}

async fn contacts(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    Query(params): Query<PageParams>,
) -> Result<Json<ContactList>> {
    let page = Pagination::parse(params.page.as_deref(), params.limit.as_deref());
    let (contacts, total) = with_retry(RetryPolicy::default(), || pool.list_contacts(page)).await?;

    Ok(Json(ContactList {
        contacts,
        pagination: page.info(total),
    }))
}

/// 系统中还没有管理员时，把当前用户设为管理员
async fn promote_self(
    AuthUser(claims): AuthUser,
    State(pool): State<DbPool>,
) -> Result<Json<Value>> {
    const ADMIN_EXISTS: ApiError = ApiError::Forbidden("Admin already exists");

    if pool.any_admin().await? {
        return Err(ADMIN_EXISTS.into());
    }
    let Some(user) = pool.promote_first_admin(claims.id).await? else {
        // 条件更新没有命中：期间已有人成为管理员，或令牌对应的用户已不存在
        return Err(if pool.any_admin().await? {
            ADMIN_EXISTS
        } else {
            ApiError::NotFound("Not found")
        }
        .into());
    };

    tracing::warn!(user = %user.id, email = %user.email, "promoted first admin");
    Ok(Json(json!({ "user": user })))
}
