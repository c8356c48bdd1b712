//! 创建缺失的存储桶，已存在的保持不变

use journal::{
    config::Config,
    error::Result,
    files::{BucketPolicies, FileStorage},
};

#[tokio::main]
async fn main() {
    journal::init_tracing();

    if let Err(e) = setup().await {
        tracing::error!(error = %e, "storage setup failed");
        std::process::exit(1);
    }
}

async fn setup() -> Result<()> {
    let config = Config::from_env()?;
    let policies = BucketPolicies::load(config.buckets_file.as_deref())?;
    let files = FileStorage::from_config(&config.storage, policies)?;

    for (bucket, created) in files.ensure_buckets().await? {
        let policy = files.policy(bucket);
        if created {
            tracing::info!(
                %bucket,
                public = policy.public,
                max_mb = policy.max_bytes / (1024 * 1024),
                mime_types = %policy.mime_types.join(", "),
                "created bucket"
            );
        } else {
            tracing::info!(%bucket, "bucket already exists, skipping");
        }
    }

    tracing::info!("storage buckets are ready");
    Ok(())
}
