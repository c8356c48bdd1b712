use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::get,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{PathId, upload::Upload};
use crate::{
    auth::{AuthUser, MaybeAuthUser},
    content::SubmissionFields,
    error::{ApiError, Result},
    files::{Bucket, FileStorage, PDF, PolicyViolation},
    state::AppState,
    storage::{ArticleRepo, CreatedArticle, DbPool, NewArticle, PageInfo, Pagination, PublicArticle},
};

/// 投稿请求体上限，略大于稿件文件的 50MB 限制
const SUBMISSION_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// 配置稿件相关路由。
///
/// - `GET /articles`：公开稿件列表
/// - `POST /articles`：投稿
/// - `GET /articles/{id}`：稿件详情
pub fn setup_route() -> Router<AppState> {
    Router::new()
        .route(
            "/articles",
            get(list)
                .post(submit)
                .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT)),
        )
        .route("/articles/{id}", get(detail))
}

/// 列表查询参数，数字解析失败时使用默认值
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    page: Option<String>,
    limit: Option<String>,
    search: Option<String>,
}

#[derive(Serialize)]
struct ArticleList {
    articles: Vec<PublicArticle>,
    pagination: PageInfo,
}

async fn list(
    State(pool): State<DbPool>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleList>> {
    let page = Pagination::parse(params.page.as_deref(), params.limit.as_deref());
    let (articles, total) = pool.list_public(page, params.search.as_deref()).await?;

    Ok(Json(ArticleList {
        articles,
        pagination: page.info(total),
    }))
}

/// 未公开的稿件只对编辑部和投稿人可见，其他人看到 404
async fn detail(
    State(pool): State<DbPool>,
    MaybeAuthUser(claims): MaybeAuthUser,
    PathId(id): PathId,
) -> Result<Json<Value>> {
    let article = pool
        .get_article(id)
        .await?
        .ok_or(ApiError::NotFound("Not found"))?;

    let visible = article.status.is_public()
        || claims.is_some_and(|c| c.role.is_staff() || article.user_id == Some(c.id));
    if !visible {
        return Err(ApiError::NotFound("Not found").into());
    }

    Ok(Json(json!({ "article": article })))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmittedArticle {
    #[serde(flatten)]
    article: CreatedArticle,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_screenshot_url: Option<String>,
}

/// 投稿
///
/// 表单字段见 [`SubmissionFields`]，`file` 为 PDF 或 DOCX 稿件，
/// `paymentScreenshot` 为可选的付款截图。所有校验通过后才保存文件。
async fn submit(
    State(pool): State<DbPool>,
    State(files): State<FileStorage>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    let mut fields = SubmissionFields::default();
    let mut document = None;
    let mut payment = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => document = Upload::read(field).await?,
            "paymentScreenshot" => payment = Upload::read(field).await?,
            _ => fields.set(&name, field.text().await?),
        }
    }

    let submission = fields.validate(document.is_some())?;
    let Some(document) = document else {
        return Err(ApiError::bad_request("Missing required fields").into());
    };

    files
        .policy(Bucket::Documents)
        .check(&document.content_type, document.size())
        .map_err(|v| match v {
            PolicyViolation::ContentType(_) => ApiError::bad_request("Only DOCX or PDF allowed"),
            v => ApiError::bad_request(v.to_string()),
        })?;
    if let Some(payment) = &payment {
        files
            .policy(Bucket::Payments)
            .check(&payment.content_type, payment.size())
            .map_err(|v| match v {
                PolicyViolation::ContentType(_) => {
                    ApiError::bad_request("Payment screenshot must be an image")
                }
                v => ApiError::bad_request(v.to_string()),
            })?;
    }

    let is_pdf = document.content_type.eq_ignore_ascii_case(PDF);
    let stored = files
        .store(
            Bucket::Documents,
            &document.file_name,
            &document.content_type,
            document.bytes,
        )
        .await?;

    let payment_screenshot_url = match payment {
        Some(p) => Some(
            files
                .store(Bucket::Payments, &p.file_name, &p.content_type, p.bytes)
                .await?
                .url,
        ),
        None => None,
    };

    let (pdf_url, docx_url) = if is_pdf {
        (Some(stored.url), None)
    } else {
        (None, Some(stored.url))
    };

    let article = pool
        .create_article(&NewArticle {
            submission,
            user_id: claims.id,
            docx_url,
            pdf_url,
            payment_screenshot_url: payment_screenshot_url.clone(),
        })
        .await?;

    tracing::info!(article = %article.id, user = %claims.id, "article submitted");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "article": SubmittedArticle {
                article,
                payment_screenshot_url,
            },
        })),
    ))
}
