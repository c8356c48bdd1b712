use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::content::{ArticleStatus, Role};

/// 用户表完整记录，包含密码哈希，仅用于登录校验
#[derive(Debug, sqlx::FromRow)]
pub struct UserRecord {
    pub password_hash: String,
    #[sqlx(flatten)]
    pub profile: UserProfile,
}

/// 对外展示的用户信息
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserRole {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// 公开文章列表项
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicArticle {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "abstract")]
    pub summary: String,
    pub keywords: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_affiliation: String,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 后台稿件列表项
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminArticle {
    pub id: Uuid,
    pub title: String,
    pub status: ArticleStatus,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "abstract")]
    pub summary: String,
    pub keywords: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
}

/// 稿件详情
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "abstract")]
    pub summary: String,
    pub keywords: Vec<String>,
    pub author_name: String,
    pub author_email: String,
    pub author_affiliation: String,
    pub docx_url: Option<String>,
    pub pdf_url: Option<String>,
    pub status: ArticleStatus,
    pub submission_date: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// 投稿人，用于判断是否可以查看未公开的稿件
    #[serde(skip)]
    pub user_id: Option<Uuid>,
}

/// 新投稿写入后的回执
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CreatedArticle {
    pub id: Uuid,
    pub title: String,
    pub status: ArticleStatus,
    pub created_at: DateTime<Utc>,
}

/// 审核操作的结果
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedArticle {
    pub id: Uuid,
    pub status: ArticleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
}

/// 编委会成员
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub title: String,
    pub affiliation: String,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 联系表单提交后的回执
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactReceipt {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

/// 后台查看的联系表单
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// 后台统计面板
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_articles: i64,
    pub pending_articles: i64,
    pub approved_articles: i64,
    pub rejected_articles: i64,
    pub published_articles: i64,
    pub total_users: i64,
    pub total_contacts: i64,
}
