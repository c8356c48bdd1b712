use std::future::Future;

use super::{DbPool, Member};
use crate::{content::NewMember, error::Result};

const MEMBER_COLUMNS: &str = "id, name, title, affiliation, email, photo_url, bio, is_active, \
     order_index, created_at, updated_at";

/// 编委会成员表操作
pub trait BoardRepo: Send + Sync {
    /// 按 `order_index` 和创建时间排序返回成员，默认只包含在任成员
    fn list_members(
        &self,
        include_inactive: bool,
    ) -> impl Future<Output = Result<Vec<Member>>> + Send;

    fn create_member(&self, member: &NewMember) -> impl Future<Output = Result<Member>> + Send;
}

impl BoardRepo for DbPool {
    async fn list_members(&self, include_inactive: bool) -> Result<Vec<Member>> {
        let mut builder =
            sqlx::QueryBuilder::new(format!("SELECT {MEMBER_COLUMNS} FROM editorial_board"));
        if !include_inactive {
            builder.push(" WHERE is_active = TRUE");
        }
        builder.push(" ORDER BY order_index ASC, created_at ASC");

        let rows = builder.build_query_as::<Member>().fetch_all(self).await?;
        Ok(rows)
    }

    async fn create_member(&self, member: &NewMember) -> Result<Member> {
        let row = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO editorial_board (name, title, affiliation, email, photo_url, bio, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MEMBER_COLUMNS}
            "#
        ))
        .bind(&member.name)
        .bind(&member.title)
        .bind(&member.affiliation)
        .bind(&member.email)
        .bind(&member.photo_url)
        .bind(&member.bio)
        .bind(member.order_index)
        .fetch_one(self)
        .await?;
        Ok(row)
    }
}
