use axum::{
    body::Bytes,
    http::{HeaderMap, HeaderValue},
};
use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};

use super::{Bucket, BucketPolicy, FileStore, StoredFile};
use crate::error::{Error, Result};

/// 托管对象存储（Supabase Storage REST API）
///
/// 使用 service key 访问，私有存储桶中的文件通过 `/api/files/<bucket>/<name>` 代理下载。
#[derive(Clone)]
pub struct ObjectStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct BucketInfo {
    name: String,
}

#[derive(Serialize)]
struct CreateBucket<'a> {
    id: &'a str,
    name: &'a str,
    public: bool,
    allowed_mime_types: &'a [String],
    file_size_limit: u64,
}

impl ObjectStore {
    /// ```ignore
    /// let store = ObjectStore::new("https://xyz.supabase.co", "service-key")?;
    /// ```
    pub fn new(base_url: impl Into<String>, service_key: &str) -> Result<Self> {
        let bearer = HeaderValue::from_str(&format!("Bearer {service_key}"))
            .map_err(|e| Error::Config(format!("invalid STORAGE_SERVICE_KEY: {e}")))?;
        let apikey = HeaderValue::from_str(service_key)
            .map_err(|e| Error::Config(format!("invalid STORAGE_SERVICE_KEY: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers({
                let mut header = HeaderMap::new();
                header.insert(header::AUTHORIZATION, bearer);
                header.insert("apikey", apikey);
                header
            })
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, bucket: Bucket, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{bucket}/{}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/bucket", self.base_url)
    }
}

/// 把非 2xx 响应转换为 [`Error::Storage`]
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(Error::Storage {
        status: status.as_u16(),
        message,
    })
}

impl FileStore for ObjectStore {
    async fn put(
        &self,
        bucket: Bucket,
        name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<StoredFile> {
        let resp = self
            .client
            .post(self.object_url(bucket, name))
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        ensure_success(resp).await?;

        Ok(StoredFile {
            bucket,
            name: name.to_string(),
            url: format!("/api/files/{bucket}/{name}"),
        })
    }

    async fn get(&self, bucket: Bucket, name: &str) -> Result<Option<Bytes>> {
        let resp = self.client.get(self.object_url(bucket, name)).send().await?;
        // 对象不存在时服务端可能返回 400 或 404
        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            return Ok(None);
        }
        let resp = ensure_success(resp).await?;
        Ok(Some(resp.bytes().await?))
    }

    async fn ensure_bucket(&self, bucket: Bucket, policy: &BucketPolicy) -> Result<bool> {
        let resp = self.client.get(self.bucket_url()).send().await?;
        let existing: Vec<BucketInfo> = ensure_success(resp).await?.json().await?;
        if existing.iter().any(|b| b.name == bucket.as_str()) {
            return Ok(false);
        }

        let resp = self
            .client
            .post(self.bucket_url())
            .json(&CreateBucket {
                id: bucket.as_str(),
                name: bucket.as_str(),
                public: policy.public,
                allowed_mime_types: &policy.mime_types,
                file_size_limit: policy.max_bytes,
            })
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_object_urls() {
        let store = ObjectStore::new("https://xyz.supabase.co/", "key").unwrap();
        assert_eq!(
            store.object_url(Bucket::EditorialPhotos, "a b.png"),
            "https://xyz.supabase.co/storage/v1/object/editorial-photos/a%20b.png"
        );
        assert_eq!(store.bucket_url(), "https://xyz.supabase.co/storage/v1/bucket");
    }

    #[test]
    fn rejects_unprintable_key() {
        assert!(matches!(
            ObjectStore::new("https://xyz.supabase.co", "bad\nkey"),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    #[ignore = "需要访问对象存储"]
    async fn ensure_buckets_against_service() {
        let url = std::env::var("STORAGE_URL").expect("STORAGE_URL required");
        let key = std::env::var("STORAGE_SERVICE_KEY").expect("STORAGE_SERVICE_KEY required");
        let store = ObjectStore::new(url, &key).unwrap();
        for bucket in Bucket::ALL {
            store
                .ensure_bucket(bucket, &BucketPolicy::defaults(bucket))
                .await
                .unwrap();
        }
    }
}
