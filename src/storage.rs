mod articles;
mod board;
mod contacts;
mod models;
mod pagination;
mod postgres;
mod retry;
mod users;

pub use self::{
    articles::{ArticleRepo, NewArticle, Review},
    board::BoardRepo,
    contacts::ContactRepo,
    models::{
        AdminArticle, ArticleDetail, ContactReceipt, ContactSubmission, CreatedArticle,
        DashboardStats, Member, PublicArticle, ReviewedArticle, UserProfile, UserRecord, UserRole,
    },
    pagination::{PageInfo, Pagination},
    postgres::{DbPool, PoolerMode, apply_schema, connect, connect_options, normalize_database_url},
    retry::{RetryPolicy, Retryable, is_prepared_statement_error, with_retry},
    users::UserRepo,
};
