//! 优雅退出信号
//!
//! Linux/macOS 监听 SIGINT 与 SIGTERM，Windows 监听 Ctrl+C。

use tracing::{error, info};

/// 退出原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// 用户中断信号 (Ctrl+C)
    Interrupt,
    /// 终止信号 (SIGTERM)
    Terminate,
    /// 由调用方主动触发（测试或嵌入式使用）
    Application,
}

/// 等待进程退出信号。信号处理器安装失败时只记录日志并永久挂起，
/// 服务继续运行，由外部强制结束。
pub async fn wait_for_signal() -> ShutdownReason {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(i), Ok(t)) => (i, t),
                (Err(e), _) | (_, Err(e)) => {
                    error!("安装 Unix 信号处理器失败: {}", e);
                    return std::future::pending().await;
                }
            };

        tokio::select! {
            _ = sigint.recv() => {
                info!("接收到SIGINT信号 (Ctrl+C)");
                ShutdownReason::Interrupt
            }
            _ = sigterm.recv() => {
                info!("接收到SIGTERM信号");
                ShutdownReason::Terminate
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("监听Ctrl+C信号失败: {}", e);
            return std::future::pending().await;
        }
        info!("接收到Ctrl+C信号");
        ShutdownReason::Interrupt
    }
}
