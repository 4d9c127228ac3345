use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::{AppConfig, PngCompression};

/// 聚合的应用共享状态（不含任何请求数据）
#[derive(Clone)]
pub struct AppState {
    /// 控制并发滤波的信号量（限制 CPU 密集型任务数量）
    pub filter_semaphore: Arc<Semaphore>,
    /// 输出 PNG 的压缩级别
    pub png_compression: PngCompression,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            filter_semaphore: Arc::new(Semaphore::new(config.image.parallelism().max(1))),
            png_compression: config.image.png_compression,
        }
    }
}
