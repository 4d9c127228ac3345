use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求上下文中的 request_id（写入 request extensions，TraceLayer 建 span 时读取）。
#[derive(Debug, Clone)]
pub struct RequestId(String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 优先沿用客户端传入的合法 `X-Request-Id`，否则生成新的。
    pub fn resolve(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| is_valid_request_id(v))
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(Self::generate)
    }

    fn generate() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }
}

tokio::task_local! {
    /// 当前请求任务绑定的 request_id，错误日志据此关联请求。
    static TASK_REQUEST_ID: String;
}

/// 获取当前请求上下文中的 request_id（不在请求任务内时为 None）。
pub fn current_request_id() -> Option<String> {
    TASK_REQUEST_ID.try_with(|v| v.clone()).ok()
}

fn is_valid_request_id(v: &str) -> bool {
    !v.is_empty()
        && v.len() <= 128
        && v.bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

/// 全局 request_id 中间件，放在最外层：其余 layer 与 handler 都能看到同一个 id，
/// 并在响应头中回写。
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::resolve(req.headers());
    let value = request_id.as_str().to_string();
    req.extensions_mut().insert(request_id);

    let mut res = TASK_REQUEST_ID
        .scope(value.clone(), next.run(req))
        .await;

    if let Ok(header) = HeaderValue::from_str(&value) {
        res.headers_mut().insert(REQUEST_ID_HEADER, header);
    }
    res
}
