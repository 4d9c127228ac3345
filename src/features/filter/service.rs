use std::time::Instant;

use crate::config::PngCompression;
use crate::error::AppError;

use super::codec;
use super::types::FilterKind;

/// 一次滤波任务的产物
#[derive(Debug)]
pub struct FilteredImage {
    pub width: u32,
    pub height: u32,
    /// PNG 字节的 Base64 文本
    pub png_base64: String,
}

/// 解码 → 滤波 → PNG 编码 → Base64。CPU 密集，调用方应放在阻塞线程中执行。
pub fn run_filter(
    data: &[u8],
    kind: FilterKind,
    compression: PngCompression,
) -> Result<FilteredImage, AppError> {
    let t0 = Instant::now();
    let decoded = codec::decode_image(data)?;
    let t_decode = t0.elapsed();

    let filtered = kind.apply(&decoded);
    let t_filter = t0.elapsed();

    let png_bytes = codec::encode_png(&filtered, compression)?;
    let png_base64 = codec::encode_base64(&png_bytes);
    let t_encode = t0.elapsed();

    tracing::debug!(
        target: "image_filter_backend::filter",
        "滤波内部分段: 解码={:?}, 滤波={:?}, 编码={:?}, 总计={:?}",
        t_decode,
        t_filter - t_decode,
        t_encode - t_filter,
        t_encode
    );

    let (width, height) = filtered.dimensions();
    Ok(FilteredImage {
        width,
        height,
        png_base64,
    })
}
