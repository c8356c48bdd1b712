use axum::{
    Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};

use crate::{
    error::{ApiError, Result},
    files::{Bucket, FileStorage, FileStore, content_type_for},
    state::AppState,
};

/// 配置文件下载路由。
///
/// - `GET /uploads/{*path}`：本地存储的文件
/// - `GET /files/{bucket}/{filename}`：按存储桶读取，适用于两种存储后端
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/uploads/{*path}", get(upload))
        .route("/files/{bucket}/{filename}", get(bucket_file))
}

fn file_response(name: &str, content: Bytes, cache: bool) -> Response {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    let mut resp = (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type_for(name))),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response();

    if cache {
        resp.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        );
    }
    resp
}

async fn upload(State(files): State<FileStorage>, Path(path): Path<String>) -> Result<Response> {
    let content = files
        .read_upload(&path)
        .await?
        .ok_or(ApiError::NotFound("File not found"))?;
    Ok(file_response(&path, content, false))
}

async fn bucket_file(
    State(files): State<FileStorage>,
    Path((bucket, filename)): Path<(String, String)>,
) -> Result<Response> {
    let bucket = Bucket::parse(&bucket).ok_or_else(|| ApiError::bad_request("Invalid bucket"))?;
    let content = files
        .get(bucket, &filename)
        .await?
        .ok_or(ApiError::NotFound("File not found"))?;
    Ok(file_response(&filename, content, true))
}
