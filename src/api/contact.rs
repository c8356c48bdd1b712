use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};

use super::JsonBody;
use crate::{
    content::ContactInput,
    error::Result,
    state::AppState,
    storage::{ContactRepo, DbPool},
};

pub fn setup_route() -> Router<AppState> {
    Router::new().route("/contact", post(submit))
}

/// 提交联系表单
async fn submit(
    State(pool): State<DbPool>,
    JsonBody(input): JsonBody<ContactInput>,
) -> Result<Json<Value>> {
    let contact = pool.create_contact(&input.validate()?).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Thank you for your message!",
        "contact": contact,
    })))
}
