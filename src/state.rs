use axum::extract::FromRef;

use crate::{auth::Keys, files::FileStorage, storage::DbPool};

/// 应用程序上下文
///
/// [`AppState`] 封装了数据库连接池、令牌密钥和文件存储，处理函数按需提取其中一项。
#[derive(Clone, FromRef)]
pub struct AppState {
    pool: DbPool,
    keys: Keys,
    files: FileStorage,
}

impl AppState {
    pub fn new(pool: DbPool, keys: Keys, files: FileStorage) -> Self {
        Self { pool, keys, files }
    }
}
