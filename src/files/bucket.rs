use std::{collections::HashMap, fmt, path::Path};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};

const MB: u64 = 1024 * 1024;

pub const PDF: &str = "application/pdf";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOC: &str = "application/msword";
const OCTET_STREAM: &str = "application/octet-stream";
const IMAGES: [&str; 4] = ["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// 存储桶
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    /// 稿件文档（私有）
    Documents,
    /// 付款截图（私有）
    Payments,
    /// 编委会成员照片（公开）
    EditorialPhotos,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Documents, Bucket::Payments, Bucket::EditorialPhotos];

    /// 只接受已知的存储桶名称
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Documents => "documents",
            Bucket::Payments => "payments",
            Bucket::EditorialPhotos => "editorial-photos",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for Bucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 上传文件不满足存储桶策略
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("File type {0} is not allowed")]
    ContentType(String),

    #[error("File size must be less than {}MB", .limit / MB)]
    TooLarge { limit: u64 },
}

/// 存储桶的访问和上传限制
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicy {
    pub public: bool,
    pub max_bytes: u64,
    pub mime_types: Vec<String>,
}

impl BucketPolicy {
    pub fn defaults(bucket: Bucket) -> Self {
        let (public, max_bytes, mime_types): (bool, u64, &[&str]) = match bucket {
            Bucket::Documents => (false, 50 * MB, &[DOCX, PDF]),
            Bucket::Payments => (false, 5 * MB, &IMAGES),
            Bucket::EditorialPhotos => (true, 5 * MB, &IMAGES),
        };
        Self {
            public,
            max_bytes,
            mime_types: mime_types.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 先检查类型再检查大小
    pub fn check(&self, content_type: &str, size: u64) -> core::result::Result<(), PolicyViolation> {
        if !self.mime_types.iter().any(|m| m.eq_ignore_ascii_case(content_type)) {
            return Err(PolicyViolation::ContentType(content_type.to_string()));
        }
        if size > self.max_bytes {
            return Err(PolicyViolation::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicyOverride {
    public: Option<bool>,
    max_size_mb: Option<u64>,
    mime_types: Option<Vec<String>>,
}

/// 所有存储桶的策略
///
/// 可以用 TOML 文件覆盖默认值，每个表名对应一个存储桶：
///
/// ```toml
/// [documents]
/// max_size_mb = 20
///
/// [editorial-photos]
/// mime_types = ["image/png", "image/webp"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPolicies(HashMap<Bucket, BucketPolicy>);

impl Default for BucketPolicies {
    fn default() -> Self {
        Self(
            Bucket::ALL
                .into_iter()
                .map(|b| (b, BucketPolicy::defaults(b)))
                .collect(),
        )
    }
}

impl BucketPolicies {
    pub fn from_toml(content: &str) -> Result<Self> {
        let overrides: HashMap<String, PolicyOverride> = toml::from_str(content)?;
        let mut policies = Self::default();

        for (name, o) in overrides {
            let bucket = Bucket::parse(&name)
                .ok_or_else(|| Error::Config(format!("unknown bucket `{name}`")))?;
            let policy = policies.0.entry(bucket).or_insert_with(|| BucketPolicy::defaults(bucket));
            if let Some(public) = o.public {
                policy.public = public;
            }
            if let Some(mb) = o.max_size_mb {
                policy.max_bytes = mb.checked_mul(MB).ok_or_else(|| {
                    Error::Config(format!("max_size_mb of `{name}` is too large"))
                })?;
            }
            if let Some(mime_types) = o.mime_types {
                policy.mime_types = mime_types;
            }
        }

        Ok(policies)
    }

    /// 没有指定文件时使用默认策略
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                tracing::info!(path = %path.display(), "loaded bucket policies");
                Self::from_toml(&content)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn get(&self, bucket: Bucket) -> &BucketPolicy {
        &self.0[&bucket]
    }
}

/// 生成存储文件名：`<原文件名>-<毫秒时间戳>.<扩展名>`
///
/// `[A-Za-z0-9._-]` 之外的字符替换为 `_`，没有扩展名时使用 `bin`。
pub fn stored_name(original: &str, now: DateTime<Utc>) -> String {
    let file_name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    let (base, ext) = match file_name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (base, ext),
        Some((base, _)) => (base, "bin"),
        None => (file_name, "bin"),
    };

    format!("{base}-{}.{ext}", now.timestamp_millis())
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// 根据扩展名推断内容类型
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => PDF,
        Some("docx") => DOCX,
        Some("doc") => DOC,
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => OCTET_STREAM,
    }
}
