use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{JsonBody, upload::Upload};
use crate::{
    auth::Staff,
    content::MemberInput,
    error::{ApiError, Result},
    files::{Bucket, FileStorage, PolicyViolation},
    state::AppState,
    storage::{BoardRepo, DbPool, RetryPolicy, with_retry},
};

const PHOTO_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// 配置编委会路由。
///
/// - `GET /editorial-board`：成员列表
/// - `POST /editorial-board`：新增成员
/// - `POST /editorial-board/upload`：上传成员照片
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route("/editorial-board", get(list).post(create))
        .route(
            "/editorial-board/upload",
            post(upload_photo).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BoardParams {
    include_inactive: Option<String>,
}

async fn list(
    State(pool): State<DbPool>,
    Query(params): Query<BoardParams>,
) -> Result<Json<Value>> {
    let include_inactive = params.include_inactive.as_deref() == Some("true");
    let members = with_retry(RetryPolicy::default(), || pool.list_members(include_inactive)).await?;
    Ok(Json(json!({ "members": members })))
}

async fn create(
    Staff(_): Staff,
    State(pool): State<DbPool>,
    JsonBody(input): JsonBody<MemberInput>,
) -> Result<Json<Value>> {
    let member = pool.create_member(&input.validate()?).await?;

    tracing::info!(member = %member.id, "editorial board member added");
    Ok(Json(json!({
        "success": true,
        "message": "Editorial board member added successfully",
        "member": member,
    })))
}

async fn upload_photo(
    Staff(_): Staff,
    State(files): State<FileStorage>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let mut photo = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            photo = Upload::read(field).await?;
        }
    }
    let photo = photo.ok_or_else(|| ApiError::bad_request("File is required"))?;

    files
        .policy(Bucket::EditorialPhotos)
        .check(&photo.content_type, photo.size())
        .map_err(|v| match v {
            PolicyViolation::ContentType(_) => {
                ApiError::bad_request("Only PNG, JPG, JPEG, or WEBP images are allowed")
            }
            v => ApiError::bad_request(v.to_string()),
        })?;

    let stored = files
        .store(
            Bucket::EditorialPhotos,
            &photo.file_name,
            &photo.content_type,
            photo.bytes,
        )
        .await?;

    Ok(Json(json!({ "success": true, "photo_url": stored.url })))
}
