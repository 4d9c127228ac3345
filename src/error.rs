use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 未上传 `image` 字段时返回给调用方的固定文案
pub const NO_IMAGE_UPLOADED: &str = "No image uploaded";
/// multipart 流本身损坏（边界错误、提前截断等）
pub const MALFORMED_MULTIPART: &str = "Malformed multipart body";

const INVALID_IMAGE_DATA: &str = "Invalid image data";
const PAYLOAD_TOO_LARGE: &str = "Payload too large";
const REQUEST_TIMEOUT: &str = "Request timeout";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 参数校验错误（消息原样返回给调用方）
    #[error("{0}")]
    Validation(String),

    /// 上传内容无法解码为图片
    #[error("图片解码失败: {0}")]
    Decode(String),

    /// 请求体超过 `image.max_body_size_mb`
    #[error("请求体超过上限")]
    PayloadTooLarge,

    /// 请求处理超过 `server.request_timeout_secs`
    #[error("请求处理超时")]
    Timeout,

    /// 内部服务器错误（细节只写日志）
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误响应体：`{"error": "..."}`
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "No image uploaded")]
    pub error: String,
}

impl AppError {
    pub fn no_image() -> Self {
        AppError::Validation(NO_IMAGE_UPLOADED.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对外可见的错误文案，不包含解码器或内部实现细节
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::Decode(_) => INVALID_IMAGE_DATA,
            AppError::PayloadTooLarge => PAYLOAD_TOO_LARGE,
            AppError::Timeout => REQUEST_TIMEOUT,
            AppError::Internal(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = crate::request_id::current_request_id();
        let request_id = request_id.as_deref().unwrap_or("-");
        if status.is_server_error() {
            tracing::error!(request_id, status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(request_id, status = status.as_u16(), "{}", self);
        }

        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Limits(e) => AppError::Decode(format!("超出解码限制: {e}")),
            other => AppError::Decode(other.to_string()),
        }
    }
}

impl From<png::EncodingError> for AppError {
    fn from(err: png::EncodingError) -> Self {
        AppError::Internal(format!("PNG 编码失败: {err}"))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("阻塞滤波任务执行失败: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, ErrorBody};
    use axum::{http::StatusCode, response::IntoResponse};

    async fn render(err: AppError) -> (StatusCode, ErrorBody) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("parse body"))
    }

    #[tokio::test]
    async fn missing_image_is_bad_request_with_fixed_message() {
        let (status, body) = render(AppError::no_image()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "No image uploaded");
    }

    #[tokio::test]
    async fn internal_details_are_not_exposed() {
        let (status, body) = render(AppError::Internal("secret stack".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
    }

    #[tokio::test]
    async fn decode_errors_use_generic_message() {
        let (status, body) = render(AppError::Decode("unexpected EOF".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Invalid image data");
    }

    #[tokio::test]
    async fn timeout_is_rendered_as_json() {
        let (status, body) = render(AppError::Timeout).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body.error, "Request timeout");
    }
}
