use axum::{body::Bytes, extract::multipart::Field};

use crate::error::Result;

/// 表单中上传的文件
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Upload {
    /// 读取文件字段，浏览器提交的空文件输入框（无文件名且无内容）视为未上传
    pub async fn read(field: Field<'_>) -> Result<Option<Self>> {
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            file_name,
            content_type,
            bytes,
        }))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
