/// 图片滤波（`POST /process-image`）
pub mod filter;
/// 健康检查
pub mod health;
