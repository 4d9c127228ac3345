use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 默认配置文件路径（相对工作目录，缺失时全部使用默认值）
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// 单个请求的超时时间（秒，0 表示不限制）
    #[serde(default = "ServerConfig::default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        5000
    }
    fn default_request_timeout() -> u64 {
        60
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            request_timeout_secs: Self::default_request_timeout(),
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
    Pretty,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法，RUST_LOG 优先）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// 日志格式
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }

    /// 未设置 RUST_LOG 时使用的过滤指令
    pub fn filter_directive(&self) -> String {
        format!("{level},tower_http={level}", level = self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: LogFormat::default(),
        }
    }
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// 是否挂载 Swagger UI（/docs）与 OpenAPI JSON
    #[serde(default)]
    pub enable_docs: bool,
}

/// CORS 配置（默认允许任意来源）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// 是否启用 CORS
    #[serde(default = "CorsConfig::default_enabled")]
    pub enabled: bool,
    /// 允许的 Origin 列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_any")]
    pub allowed_origins: Vec<String>,
    /// 允许的方法列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_methods")]
    pub allowed_methods: Vec<String>,
    /// 允许的请求头列表（支持 "*" 表示任意）
    #[serde(default = "CorsConfig::default_any")]
    pub allowed_headers: Vec<String>,
    /// 暴露的响应头列表
    #[serde(default = "CorsConfig::default_expose_headers")]
    pub expose_headers: Vec<String>,
    /// 是否允许携带凭证（不能与 "*" 同时使用）
    #[serde(default)]
    pub allow_credentials: bool,
    /// 预检缓存时间（秒）
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

impl CorsConfig {
    fn default_enabled() -> bool {
        true
    }
    fn default_any() -> Vec<String> {
        vec!["*".to_string()]
    }
    fn default_methods() -> Vec<String> {
        vec!["GET".to_string(), "POST".to_string(), "OPTIONS".to_string()]
    }
    fn default_expose_headers() -> Vec<String> {
        vec!["x-request-id".to_string()]
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            allowed_origins: Self::default_any(),
            allowed_methods: Self::default_methods(),
            allowed_headers: Self::default_any(),
            expose_headers: Self::default_expose_headers(),
            allow_credentials: false,
            max_age_secs: None,
        }
    }
}

/// PNG 压缩级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// 图片处理配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// 上传请求体上限（MB）
    #[serde(default = "ImageConfig::default_max_body_size_mb")]
    pub max_body_size_mb: usize,
    /// 并发滤波任务许可数（0=自动，取 CPU 核心数）
    #[serde(default)]
    pub max_parallel: u32,
    /// 输出 PNG 的压缩级别
    #[serde(default)]
    pub png_compression: PngCompression,
}

impl ImageConfig {
    fn default_max_body_size_mb() -> usize {
        20
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn parallelism(&self) -> usize {
        match self.max_parallel {
            0 => num_cpus::get(),
            n => n as usize,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_body_size_mb: Self::default_max_body_size_mb(),
            max_parallel: 0,
            png_compression: PngCompression::default(),
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 收到退出信号后等待在途请求完成的最长时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        30
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从默认路径加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::get_config_path())
    }

    /// 从指定文件加载配置（文件可缺失），环境变量覆盖，例如：
    /// `APP_SERVER__PORT=8080`、`APP_CORS__ALLOWED_ORIGINS=https://a.com,https://b.com`
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let builder = ConfigBuilder::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .with_list_parse_key("cors.allowed_methods")
                    .with_list_parse_key("cors.allowed_headers")
                    .with_list_parse_key("cors.expose_headers")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    fn get_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
