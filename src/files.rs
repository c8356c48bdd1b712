mod bucket;
mod local;
mod remote;

use std::{future::Future, sync::Arc};

use axum::body::Bytes;
use chrono::Utc;
use serde::Serialize;

pub use self::{
    bucket::{
        Bucket, BucketPolicies, BucketPolicy, DOCX, PDF, PolicyViolation, content_type_for,
        stored_name,
    },
    local::{LocalStore, safe_relative},
    remote::ObjectStore,
};
use crate::{config::StorageConfig, error::Result};

/// 已保存的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub bucket: Bucket,
    pub name: String,
    /// 下载地址（相对于站点根路径）
    pub url: String,
}

/// 文件存储后端
pub trait FileStore: Send + Sync {
    fn put(
        &self,
        bucket: Bucket,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> impl Future<Output = Result<StoredFile>> + Send;

    /// 文件不存在时返回 `None`
    fn get(&self, bucket: Bucket, name: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// 创建缺失的存储桶，返回是否新建
    fn ensure_bucket(
        &self,
        bucket: Bucket,
        policy: &BucketPolicy,
    ) -> impl Future<Output = Result<bool>> + Send;
}

#[derive(Clone)]
enum Backend {
    Local(LocalStore),
    Remote(ObjectStore),
}

/// 应用使用的文件存储，按配置选择本地目录或对象存储
#[derive(Clone)]
pub struct FileStorage {
    backend: Backend,
    policies: Arc<BucketPolicies>,
}

impl FileStorage {
    pub fn new_local(store: LocalStore, policies: BucketPolicies) -> Self {
        Self {
            backend: Backend::Local(store),
            policies: Arc::new(policies),
        }
    }

    pub fn from_config(config: &StorageConfig, policies: BucketPolicies) -> Result<Self> {
        let backend = match config {
            StorageConfig::Local { root } => {
                tracing::info!(root = %root.display(), "storing uploads on local disk");
                Backend::Local(LocalStore::new(root.clone()))
            }
            StorageConfig::Remote {
                base_url,
                service_key,
            } => {
                tracing::info!(%base_url, "storing uploads in object storage");
                Backend::Remote(ObjectStore::new(base_url.clone(), service_key)?)
            }
        };
        Ok(Self {
            backend,
            policies: Arc::new(policies),
        })
    }

    pub fn policy(&self, bucket: Bucket) -> &BucketPolicy {
        self.policies.get(bucket)
    }

    /// 以带时间戳的文件名保存上传文件，调用方需先用 [`BucketPolicy::check`] 校验
    pub async fn store(
        &self,
        bucket: Bucket,
        original_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile> {
        let name = stored_name(original_name, Utc::now());
        self.put(bucket, &name, content_type, bytes).await
    }

    /// 读取 `/api/uploads` 下的本地文件
    ///
    /// 使用对象存储时没有本地文件，总是返回 `None`。
    pub async fn read_upload(&self, path: &str) -> Result<Option<Bytes>> {
        let relative = safe_relative(path)?;
        match &self.backend {
            Backend::Local(store) => store.read(&relative.to_string_lossy()).await,
            Backend::Remote(_) => Ok(None),
        }
    }

    /// 创建所有缺失的存储桶
    pub async fn ensure_buckets(&self) -> Result<Vec<(Bucket, bool)>> {
        let mut result = Vec::with_capacity(Bucket::ALL.len());
        for bucket in Bucket::ALL {
            let created = self.ensure_bucket(bucket, self.policy(bucket)).await?;
            result.push((bucket, created));
        }
        Ok(result)
    }
}

impl FileStore for FileStorage {
    async fn put(
        &self,
        bucket: Bucket,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile> {
        match &self.backend {
            Backend::Local(store) => store.put(bucket, name, content_type, bytes).await,
            Backend::Remote(store) => store.put(bucket, name, content_type, bytes).await,
        }
    }

    async fn get(&self, bucket: Bucket, name: &str) -> Result<Option<Bytes>> {
        match &self.backend {
            Backend::Local(store) => store.get(bucket, name).await,
            Backend::Remote(store) => store.get(bucket, name).await,
        }
    }

    async fn ensure_bucket(&self, bucket: Bucket, policy: &BucketPolicy) -> Result<bool> {
        match &self.backend {
            Backend::Local(store) => store.ensure_bucket(bucket, policy).await,
            Backend::Remote(store) => store.ensure_bucket(bucket, policy).await,
        }
    }
}
