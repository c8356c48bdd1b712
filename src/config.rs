use std::{net::SocketAddr, path::PathBuf};

use crate::error::{Error, Result};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// 数据库连接配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 生产环境下会检查是否使用了直连地址
    pub production: bool,
}

/// 上传文件的存放位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// 本地目录
    Local { root: PathBuf },
    /// 托管的对象存储服务
    Remote { base_url: String, service_key: String },
}

/// 应用配置，来自环境变量
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub storage: StorageConfig,
    /// 存储桶策略覆盖文件（TOML）
    pub buckets_file: Option<PathBuf>,
}

impl Config {
    /// 读取环境变量，存在 `.env` 文件时先加载
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源构建配置
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let production = get("JOURNAL_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let addr = get("JOURNAL_ADDR")
            .as_deref()
            .unwrap_or(DEFAULT_ADDR)
            .parse()
            .map_err(|e| Error::Config(format!("invalid JOURNAL_ADDR: {e}")))?;

        let url = get("DATABASE_URL")
            .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;
        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::Config(format!("invalid DB_MAX_CONNECTIONS: {v}")))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET is not set, using an insecure development secret");
            DEV_JWT_SECRET.to_string()
        });

        let storage = match (get("STORAGE_URL"), get("STORAGE_SERVICE_KEY")) {
            (Some(base_url), Some(service_key)) => StorageConfig::Remote {
                base_url: base_url.trim_end_matches('/').to_string(),
                service_key,
            },
            (Some(_), None) => {
                return Err(Error::Config(
                    "STORAGE_URL is set but STORAGE_SERVICE_KEY is missing".to_string(),
                ));
            }
            _ => StorageConfig::Local {
                root: get("UPLOAD_DIR")
                    .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                    .into(),
            },
        };

        Ok(Self {
            addr,
            database: DatabaseConfig {
                url,
                max_connections,
                production,
            },
            jwt_secret,
            storage,
            buckets_file: get("JOURNAL_BUCKETS").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("DATABASE_URL", "postgres://localhost/journal")]).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.database.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(!config.database.production);
        assert_eq!(
            config.storage,
            StorageConfig::Local {
                root: PathBuf::from(DEFAULT_UPLOAD_DIR)
            }
        );
        assert!(config.buckets_file.is_none());
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(config(&[]), Err(Error::Config(_))));
        assert!(matches!(
            config(&[("DATABASE_URL", "  ")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn remote_storage_needs_service_key() {
        let base = [
            ("DATABASE_URL", "postgres://localhost/journal"),
            ("STORAGE_URL", "https://abc.supabase.co/"),
        ];
        assert!(config(&base).is_err());

        let config = config(&[base[0], base[1], ("STORAGE_SERVICE_KEY", "key")]).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Remote {
                base_url: "https://abc.supabase.co".to_string(),
                service_key: "key".to_string(),
            }
        );
    }

    #[test]
    fn production_and_overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/journal"),
            ("JOURNAL_ENV", "Production"),
            ("JOURNAL_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("JWT_SECRET", "s3cret"),
            ("JOURNAL_BUCKETS", "buckets.toml"),
        ])
        .unwrap();
        assert!(config.database.production);
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.database.max_connections, 4);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.buckets_file, Some(PathBuf::from("buckets.toml")));
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config(&[
            ("DATABASE_URL", "postgres://localhost/journal"),
            ("DB_MAX_CONNECTIONS", "0"),
        ]);
        assert!(matches!(err, Err(Error::Config(_))));
    }
}
