use std::future::Future;

use super::{ContactReceipt, ContactSubmission, DbPool, Pagination};
use crate::{
    content::ContactMessage,
    error::{Error, Result},
};

/// 联系表单操作
pub trait ContactRepo: Send + Sync {
    fn create_contact(
        &self,
        message: &ContactMessage,
    ) -> impl Future<Output = Result<ContactReceipt>> + Send;

    /// 按提交时间倒序分页
    fn list_contacts(
        &self,
        page: Pagination,
    ) -> impl Future<Output = Result<(Vec<ContactSubmission>, i64)>> + Send;

    fn count_contacts(&self) -> impl Future<Output = Result<i64>> + Send;
}

impl ContactRepo for DbPool {
    async fn create_contact(&self, message: &ContactMessage) -> Result<ContactReceipt> {
        let receipt = sqlx::query_as::<_, ContactReceipt>(
            r#"
            INSERT INTO contact_submissions (name, email, subject, message, phone, organization)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, subject, created_at
            "#,
        )
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .bind(&message.phone)
        .bind(&message.organization)
        .fetch_one(self)
        .await?;
        Ok(receipt)
    }

    async fn list_contacts(&self, page: Pagination) -> Result<(Vec<ContactSubmission>, i64)> {
        let list = sqlx::query_as::<_, ContactSubmission>(
            r#"
            SELECT id, name, email, subject, message, phone, organization, status, created_at
            FROM contact_submissions
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self);

        let (rows, total) = tokio::try_join!(
            async { list.await.map_err(Error::from) },
            self.count_contacts()
        )?;
        Ok((rows, total))
    }

    async fn count_contacts(&self) -> Result<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(self)
            .await?;
        Ok(count)
    }
}
