use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    AdminArticle, ArticleDetail, CreatedArticle, DbPool, Pagination, PublicArticle,
    ReviewedArticle,
};
use crate::{
    content::{ArticleStatus, Submission},
    error::Result,
};

/// 待写入的新稿件
#[derive(Debug)]
pub struct NewArticle {
    pub submission: Submission,
    pub user_id: Uuid,
    pub docx_url: Option<String>,
    pub pdf_url: Option<String>,
    pub payment_screenshot_url: Option<String>,
}

/// 审核动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Approve,
    Reject(String),
    Publish,
}

impl Review {
    pub fn status(&self) -> ArticleStatus {
        match self {
            Review::Approve => ArticleStatus::Approved,
            Review::Reject(_) => ArticleStatus::Rejected,
            Review::Publish => ArticleStatus::Published,
        }
    }
}

/// 转义 `ILIKE` 中的通配符，生成包含匹配的模式
pub(crate) fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_public_filter(builder: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    builder.push(" WHERE status IN ('APPROVED', 'PUBLISHED')");
    if let Some(p) = pattern {
        builder
            .push(" AND (title ILIKE ")
            .push_bind(p.to_string())
            .push(" OR abstract ILIKE ")
            .push_bind(p.to_string())
            .push(")");
    }
}

fn push_status_filter(builder: &mut QueryBuilder<'_, Postgres>, status: Option<ArticleStatus>) {
    if let Some(status) = status {
        builder.push(" WHERE status = ").push_bind(status);
    }
}

/// 稿件表操作
pub trait ArticleRepo: Send + Sync {
    /// 分页查询公开稿件，可按标题或摘要搜索
    ///
    /// 返回当前页的稿件和符合条件的总数。
    fn list_public(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> impl Future<Output = Result<(Vec<PublicArticle>, i64)>> + Send;

    /// 后台分页查询，可按状态过滤
    fn list_admin(
        &self,
        page: Pagination,
        status: Option<ArticleStatus>,
    ) -> impl Future<Output = Result<(Vec<AdminArticle>, i64)>> + Send;

    fn get_article(&self, id: Uuid)
    -> impl Future<Output = Result<Option<ArticleDetail>>> + Send;

    fn create_article(
        &self,
        article: &NewArticle,
    ) -> impl Future<Output = Result<CreatedArticle>> + Send;

    /// 更新稿件状态，稿件不存在时返回 `None`
    fn review_article(
        &self,
        id: Uuid,
        review: &Review,
    ) -> impl Future<Output = Result<Option<ReviewedArticle>>> + Send;

    fn count_articles(
        &self,
        status: Option<ArticleStatus>,
    ) -> impl Future<Output = Result<i64>> + Send;
}

impl ArticleRepo for DbPool {
    async fn list_public(
        &self,
        page: Pagination,
        search: Option<&str>,
    ) -> Result<(Vec<PublicArticle>, i64)> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let mut list = QueryBuilder::new(
            r#"
            SELECT id, title, abstract, keywords, author_name, author_email,
                author_affiliation, published_date, created_at
            FROM articles
            "#,
        );
        push_public_filter(&mut list, pattern.as_deref());
        list.push(" ORDER BY published_date DESC NULLS LAST, created_at DESC");
        list.push(" LIMIT ").push_bind(page.limit());
        list.push(" OFFSET ").push_bind(page.offset());

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        push_public_filter(&mut count, pattern.as_deref());

        let (rows, total) = tokio::try_join!(
            list.build_query_as::<PublicArticle>().fetch_all(self),
            count.build_query_scalar::<i64>().fetch_one(self),
        )?;
        Ok((rows, total))
    }

    async fn list_admin(
        &self,
        page: Pagination,
        status: Option<ArticleStatus>,
    ) -> Result<(Vec<AdminArticle>, i64)> {
        let mut list = QueryBuilder::new(
            r#"
            SELECT id, title, status, abstract, keywords, author_name, author_email, created_at
            FROM articles
            "#,
        );
        push_status_filter(&mut list, status);
        list.push(" ORDER BY created_at DESC");
        list.push(" LIMIT ").push_bind(page.limit());
        list.push(" OFFSET ").push_bind(page.offset());

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        push_status_filter(&mut count, status);

        let (rows, total) = tokio::try_join!(
            list.build_query_as::<AdminArticle>().fetch_all(self),
            count.build_query_scalar::<i64>().fetch_one(self),
        )?;
        Ok((rows, total))
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<ArticleDetail>> {
        let article = sqlx::query_as::<_, ArticleDetail>(
            r#"
            SELECT id, title, abstract, keywords, author_name, author_email, author_affiliation,
                docx_url, pdf_url, status, submission_date, published_date, created_at, updated_at,
                user_id
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(article)
    }

    async fn create_article(&self, article: &NewArticle) -> Result<CreatedArticle> {
        let s = &article.submission;
        let created = sqlx::query_as::<_, CreatedArticle>(
            r#"
            INSERT INTO articles (
                title, abstract, keywords, author_name, author_email, author_affiliation,
                mobile_number, docx_url, pdf_url, payment_screenshot_url, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, status, created_at
            "#,
        )
        .bind(&s.title)
        .bind(&s.summary)
        .bind(&s.keywords)
        .bind(&s.author_name)
        .bind(&s.author_email)
        .bind(&s.author_affiliation)
        .bind(&s.mobile_number)
        .bind(&article.docx_url)
        .bind(&article.pdf_url)
        .bind(&article.payment_screenshot_url)
        .bind(article.user_id)
        .fetch_one(self)
        .await?;
        Ok(created)
    }

    async fn review_article(&self, id: Uuid, review: &Review) -> Result<Option<ReviewedArticle>> {
        let (reason, published): (Option<&str>, Option<DateTime<Utc>>) = match review {
            Review::Approve => (None, None),
            Review::Reject(reason) => (Some(reason.as_str()), None),
            Review::Publish => (None, Some(Utc::now())),
        };

        let article = sqlx::query_as::<_, ReviewedArticle>(
            r#"
            UPDATE articles
            SET status = $2,
                rejection_reason = $3,
                review_date = now(),
                published_date = COALESCE($4, published_date),
                updated_at = now()
            WHERE id = $1
            RETURNING id, status, rejection_reason, published_date
            "#,
        )
        .bind(id)
        .bind(review.status())
        .bind(reason)
        .bind(published)
        .fetch_optional(self)
        .await?;
        Ok(article)
    }

    async fn count_articles(&self, status: Option<ArticleStatus>) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM articles");
        push_status_filter(&mut builder, status);
        let count = builder.build_query_scalar::<i64>().fetch_one(self).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rivers"), "%rivers%");
        assert_eq!(like_pattern("100%_sure\\"), "%100\\%\\_sure\\\\%");
    }

    #[test]
    fn review_maps_to_status() {
        assert_eq!(Review::Approve.status(), ArticleStatus::Approved);
        assert_eq!(
            Review::Reject("off topic".into()).status(),
            ArticleStatus::Rejected
        );
        assert_eq!(Review::Publish.status(), ArticleStatus::Published);
    }
}
