use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage};

use crate::config::PngCompression;
use crate::error::AppError;

/// 自动识别容器格式并解码为 3 通道 RGB 像素网格（alpha 丢弃，灰度展开）。
///
/// EXIF Orientation 会在转换前应用，输出始终是"正向"的像素。
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Decode("上传内容为空".to_string()));
    }
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Decode(format!("识别图片格式失败: {e}")))?
        .into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut decoded = DynamicImage::from_decoder(decoder)?;
    decoded.apply_orientation(orientation);
    Ok(decoded.to_rgb8())
}

/// 8-bit RGB PNG 编码
pub fn encode_png(img: &RgbImage, compression: PngCompression) -> Result<Vec<u8>, AppError> {
    let (width, height) = img.dimensions();
    let mut out = Vec::with_capacity(img.as_raw().len() / 2);
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        match compression {
            PngCompression::Fast => {
                encoder.set_compression(png::Compression::Fast);
                encoder.set_filter(png::FilterType::NoFilter);
            }
            PngCompression::Default => {
                encoder.set_compression(png::Compression::Default);
                encoder.set_filter(png::FilterType::Paeth);
            }
            PngCompression::Best => {
                encoder.set_compression(png::Compression::Best);
                encoder.set_filter(png::FilterType::Paeth);
            }
        }
        let mut writer = encoder.write_header()?;
        writer.write_image_data(img.as_raw())?;
        writer.finish()?;
    }
    Ok(out)
}

/// 标准字母表、带填充
pub fn encode_base64(bytes: &[u8]) -> String {
    base64_engine.encode(bytes)
}
