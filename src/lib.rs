/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// CORS 中间件构建
pub mod cors;

/// 请求 ID 中间件
pub mod request_id;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 退出信号
pub mod shutdown;

/// OpenAPI 文档
pub mod openapi;

/// 路由装配与 HTTP 服务器
pub mod server;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::AppError;
pub use server::{Server, build_router};
pub use shutdown::ShutdownReason;
