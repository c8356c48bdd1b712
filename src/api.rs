mod admin;
mod articles;
mod auth;
mod board;
mod contact;
mod files;
mod upload;

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::{ApiError, Error, Result},
    state::AppState,
};

/// 设置应用的路由。
///
/// 所有接口都挂在 `/api` 下，并绑定应用状态。
pub fn setup_route(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(auth::setup_route())
        .merge(articles::setup_route())
        .merge(admin::setup_route())
        .merge(board::setup_route())
        .merge(contact::setup_route())
        .merge(files::setup_route());

    Router::new().nest("/api", api).with_state(state)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
///
/// 收到 Ctrl+C 或 SIGTERM 后等待进行中的请求结束再退出。
#[instrument(name = "http server", skip_all)]
pub async fn run_server_with_router(router: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
pub async fn run_server(state: AppState, addr: SocketAddr) -> Result<()> {
    let router = setup_route(state);
    let router = add_middlewares(router);
    run_server_with_router(router, addr).await
}

/// 为路由添加中间件，包括请求追踪和失败日志记录。
///
/// 日志记录会在请求失败时输出错误信息。
pub fn add_middlewares(router: Router) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(%e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(%e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// JSON 请求体，解析失败时返回统一格式的 400 错误
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// 路径中的 UUID，格式错误视为资源不存在
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> core::result::Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Not found"))?;

        Uuid::parse_str(&id)
            .map(PathId)
            .map_err(|_| ApiError::NotFound("Not found").into())
    }
}
