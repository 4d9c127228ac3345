use image_filter_backend::config::{LogFormat, LoggingConfig};
use image_filter_backend::{AppConfig, Server};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

#[tokio::main]
async fn main() {
    // Load config
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config init failed: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);
    tracing::debug!("配置加载完成: {:?}", config);

    let addr = config.server_addr();
    let server = Server::bind(&config).await.unwrap_or_else(|e| {
        tracing::error!("Bind address failed {}: {}", addr, e);
        std::process::exit(1);
    });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Filter API: POST http://{}/process-image", addr);
    tracing::info!("Health: http://{}/health", addr);
    if config.api.enable_docs {
        tracing::info!("Docs: http://{}/docs", addr);
    }

    if let Err(e) = server.run().await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }
}
