use std::{
    io,
    path::{Component, Path, PathBuf},
};

use axum::body::Bytes;

use super::{Bucket, BucketPolicy, FileStore, StoredFile};
use crate::error::{ApiError, Result};

/// 拒绝任何可能越出根目录的相对路径
pub fn safe_relative(path: &str) -> core::result::Result<PathBuf, ApiError> {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ApiError::Forbidden("Invalid path"));
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(ApiError::Forbidden("Invalid path"));
    }
    Ok(out)
}

/// 本地目录存储，文件位于 `<root>/<bucket>/<name>`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 读取根目录下的相对路径，文件不存在时返回 `None`
    pub async fn read(&self, relative: &str) -> Result<Option<Bytes>> {
        let path = self.root.join(safe_relative(relative)?);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(Some(Bytes::from(content))),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FileStore for LocalStore {
    async fn put(
        &self,
        bucket: Bucket,
        name: &str,
        _content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile> {
        let dir = self.root.join(bucket.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(safe_relative(name)?);
        tokio::fs::write(&path, &bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
        Ok(StoredFile {
            bucket,
            name: name.to_string(),
            url: format!("/api/uploads/{bucket}/{name}"),
        })
    }

    async fn get(&self, bucket: Bucket, name: &str) -> Result<Option<Bytes>> {
        let relative = safe_relative(name)?;
        if relative.components().count() != 1 {
            return Ok(None);
        }
        self.read(&format!("{bucket}/{name}")).await
    }

    async fn ensure_bucket(&self, bucket: Bucket, _policy: &BucketPolicy) -> Result<bool> {
        let dir = self.root.join(bucket.as_str());
        if tokio::fs::try_exists(&dir).await? {
            return Ok(false);
        }
        tokio::fs::create_dir_all(&dir).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_rejected() {
        assert!(safe_relative("documents/a.pdf").is_ok());
        assert!(safe_relative("./documents/a.pdf").is_ok());
        assert!(safe_relative("../secret").is_err());
        assert!(safe_relative("documents/../../secret").is_err());
        assert!(safe_relative("/etc/passwd").is_err());
        assert!(safe_relative("").is_err());
    }

    #[tokio::test]
    async fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let stored = store
            .put(Bucket::Documents, "paper-1.pdf", "application/pdf", Bytes::from_static(b"%PDF"))
            .await
            .unwrap();
        assert_eq!(stored.url, "/api/uploads/documents/paper-1.pdf");
        assert!(dir.path().join("documents/paper-1.pdf").exists());

        let content = store.get(Bucket::Documents, "paper-1.pdf").await.unwrap();
        assert_eq!(content.as_deref(), Some(&b"%PDF"[..]));
        assert!(store.get(Bucket::Payments, "paper-1.pdf").await.unwrap().is_none());
        assert!(store.read("documents").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_bucket_creates_directory_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let policy = BucketPolicy::defaults(Bucket::Payments);

        assert!(store.ensure_bucket(Bucket::Payments, &policy).await.unwrap());
        assert!(!store.ensure_bucket(Bucket::Payments, &policy).await.unwrap());
        assert!(dir.path().join("payments").is_dir());
    }
}
