pub mod api;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod files;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use crate::{
    auth::Keys,
    config::Config,
    error::Result,
    files::{BucketPolicies, FileStorage},
    state::AppState,
};

/// 初始化日志，过滤规则来自环境变量 `JOURNAL_LOG`
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("JOURNAL_LOG"))
        .init();
}

/// 读取配置、连接数据库、准备存储后启动 HTTP 服务
pub async fn run() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let policies = BucketPolicies::load(config.buckets_file.as_deref())?;
    let files = FileStorage::from_config(&config.storage, policies)?;

    let pool = storage::connect(&config.database).await?;
    storage::apply_schema(&pool).await?;

    let state = AppState::new(pool, Keys::new(config.jwt_secret.as_bytes()), files);
    api::run_server(state, config.addr).await
}
