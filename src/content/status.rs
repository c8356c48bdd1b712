use serde::{Deserialize, Serialize};

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    Editor,
    Reviewer,
}

impl Role {
    /// 编辑部成员（管理员和编辑）可以审核稿件、维护编委会
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Editor)
    }
}

/// 稿件状态
///
/// 投稿后为 [`ArticleStatus::Pending`]，审核后变为通过或拒绝，通过的稿件可以发表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "article_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArticleStatus {
    Pending,
    Approved,
    Rejected,
    Published,
}

impl ArticleStatus {
    pub const ALL: [ArticleStatus; 4] = [
        ArticleStatus::Pending,
        ArticleStatus::Approved,
        ArticleStatus::Rejected,
        ArticleStatus::Published,
    ];

    /// 对公众可见的状态
    pub fn is_public(self) -> bool {
        matches!(self, ArticleStatus::Approved | ArticleStatus::Published)
    }

    /// 解析查询参数中的状态，大小写不敏感
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Pending => "PENDING",
            ArticleStatus::Approved => "APPROVED",
            ArticleStatus::Rejected => "REJECTED",
            ArticleStatus::Published => "PUBLISHED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Editor.is_staff());
        assert!(!Role::User.is_staff());
        assert!(!Role::Reviewer.is_staff());
    }

    #[test]
    fn parse_status_ignores_case() {
        assert_eq!(ArticleStatus::parse("pending"), Some(ArticleStatus::Pending));
        assert_eq!(ArticleStatus::parse(" PUBLISHED "), Some(ArticleStatus::Published));
        assert_eq!(ArticleStatus::parse("archived"), None);
    }

    #[test]
    fn role_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"EDITOR\"");
        let role: Role = serde_json::from_str("\"REVIEWER\"").unwrap();
        assert_eq!(role, Role::Reviewer);
    }

    #[test]
    fn public_statuses() {
        let public: Vec<_> = ArticleStatus::ALL
            .into_iter()
            .filter(|s| s.is_public())
            .collect();
        assert_eq!(public, vec![ArticleStatus::Approved, ArticleStatus::Published]);
    }
}
