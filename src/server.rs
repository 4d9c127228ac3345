use std::any::Any;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::features::{filter, health};
use crate::openapi::ApiDoc;
use crate::request_id::{RequestId, request_id_middleware};
use crate::shutdown::{self, ShutdownReason};
use crate::state::AppState;

/// handler 内 panic 统一转为 500 JSON，进程不退出
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}

/// 超时层只返回空 body 的 408，这里换成统一的 JSON 错误体
async fn render_timeout(resp: Response) -> Response {
    if resp.status() == StatusCode::REQUEST_TIMEOUT
        && !resp.headers().contains_key(header::CONTENT_TYPE)
    {
        return AppError::Timeout.into_response();
    }
    resp
}

fn make_request_span(req: &Request<Body>) -> tracing::Span {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(RequestId::as_str)
        .unwrap_or("-");
    tracing::info_span!(
        "http",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}

/// 挂载中间件：由内到外为 body 上限 → 超时 → CORS → panic 捕获 → 访问日志 → request_id
pub fn apply_layers(mut app: Router, config: &AppConfig) -> Router {
    app = app.layer(DefaultBodyLimit::max(config.image.max_body_bytes()));

    if let Some(timeout) = config.server.request_timeout() {
        app = app
            .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
            .layer(axum::middleware::map_response(render_timeout));
    }

    if let Some(cors) = crate::cors::build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(axum::middleware::from_fn(request_id_middleware))
}

/// 由显式配置构建完整路由（无全局状态）
pub fn build_router(config: &AppConfig) -> Router {
    let mut app = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .merge(filter::create_filter_router());

    if config.api.enable_docs {
        app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let app = app.with_state(AppState::from_config(config));
    apply_layers(app, config)
}

/// 已绑定端口、尚未开始服务的 HTTP 服务器
pub struct Server {
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
}

impl Server {
    /// 按配置绑定监听地址并构建路由
    pub async fn bind(config: &AppConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind(config.server_addr()).await?;
        Ok(Self::from_parts(listener, build_router(config), config.shutdown.timeout_duration()))
    }

    pub fn from_parts(listener: TcpListener, router: Router, shutdown_timeout: Duration) -> Self {
        Self {
            listener,
            router,
            shutdown_timeout,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 运行直到收到 SIGINT/SIGTERM
    pub async fn run(self) -> std::io::Result<()> {
        self.run_until(shutdown::wait_for_signal()).await
    }

    /// 运行直到 `signal` 完成；之后最多等待 `shutdown_timeout` 让在途请求结束。
    pub async fn run_until<F>(self, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ShutdownReason> + Send + 'static,
    {
        let (notify_tx, notify_rx) = tokio::sync::oneshot::channel::<ShutdownReason>();
        let graceful = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = signal.await;
                let _ = notify_tx.send(reason);
            })
            .into_future();
        let mut graceful = std::pin::pin!(graceful);

        tokio::select! {
            biased;
            res = &mut graceful => return res,
            reason = notify_rx => {
                if let Ok(reason) = reason {
                    info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
                }
            }
        }

        match tokio::time::timeout(self.shutdown_timeout, graceful).await {
            Ok(res) => {
                info!("服务器已优雅关闭");
                res
            }
            Err(_) => {
                warn!(
                    "优雅退出超时（{}秒），放弃等待在途请求",
                    self.shutdown_timeout.as_secs()
                );
                Ok(())
            }
        }
    }
}
