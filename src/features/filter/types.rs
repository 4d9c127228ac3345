use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::kernels;

/// 可选滤波类型。名称解析是全函数：无法识别的名称一律视为 `Identity`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// 5×5 均值模糊（未传 filter 时的默认值）
    #[default]
    Mean,
    /// 5×5 高斯模糊，σ 自动
    Gaussian,
    /// 5×5 中值滤波
    Median,
    /// 逐通道取反
    Negative,
    /// 原样返回
    Identity,
}

impl FilterKind {
    /// 精确、区分大小写地匹配名称
    pub fn from_name(name: &str) -> Self {
        match name {
            "mean" => FilterKind::Mean,
            "gaussian" => FilterKind::Gaussian,
            "median" => FilterKind::Median,
            "negative" => FilterKind::Negative,
            _ => FilterKind::Identity,
        }
    }

    /// 表单字段缺省时取默认滤波
    pub fn from_field(field: Option<&str>) -> Self {
        field.map_or_else(Self::default, Self::from_name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Mean => "mean",
            FilterKind::Gaussian => "gaussian",
            FilterKind::Median => "median",
            FilterKind::Negative => "negative",
            FilterKind::Identity => "identity",
        }
    }

    /// 纯函数：输入像素网格 → 同尺寸的新像素网格
    pub fn apply(self, img: &RgbImage) -> RgbImage {
        match self {
            FilterKind::Mean => kernels::mean_blur(img),
            FilterKind::Gaussian => kernels::gaussian_blur(img),
            FilterKind::Median => kernels::median_blur(img),
            FilterKind::Negative => kernels::negative(img),
            FilterKind::Identity => img.clone(),
        }
    }
}

/// 处理成功的响应体
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProcessImageResponse {
    /// PNG 字节的 Base64（标准字母表，带填充）
    #[schema(example = "iVBORw0KGgoAAAANSUhEUgAA...")]
    pub processed_image: String,
}

/// `POST /process-image` 的 multipart 表单（仅用于 OpenAPI 描述）
#[derive(Debug, utoipa::ToSchema)]
pub struct ProcessImageForm {
    /// 待处理的图片文件（PNG/JPEG/GIF/BMP/WebP/TIFF 等）
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
    /// mean | gaussian | median | negative；其他值原样返回，缺省为 mean
    #[schema(example = "mean")]
    pub filter: Option<String>,
}
