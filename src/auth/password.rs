use crate::error::Result;

const BCRYPT_COST: u32 = 12;

/// 在阻塞线程池中计算 bcrypt 哈希
pub async fn hash_password(password: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??;
    Ok(hash)
}

/// 校验密码，哈希格式错误同样视为校验失败
pub async fn verify_password(password: String, hash: String) -> Result<bool> {
    let ok = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await?;
    Ok(ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        // 测试中使用最低 cost，避免拖慢用例
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(verify_password("hunter2".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("hunter3".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_does_not_match() {
        assert!(!verify_password("x".into(), "not-a-hash".into()).await.unwrap());
    }

    #[tokio::test]
    async fn hash_uses_configured_cost() {
        let hash = hash_password("hunter2".into()).await.unwrap();
        assert!(hash.starts_with("$2b$12$"));
    }
}
