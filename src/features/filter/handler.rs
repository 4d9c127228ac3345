use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        State,
        multipart::{Multipart, MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::post,
};
use std::time::Instant;

use crate::error::{AppError, ErrorBody, MALFORMED_MULTIPART};
use crate::state::AppState;

use super::service;
use super::types::{FilterKind, ProcessImageForm, ProcessImageResponse};

const IMAGE_FIELD: &str = "image";
const FILTER_FIELD: &str = "filter";

/// 从 multipart 中取出的原始表单内容；同名字段重复时保留第一个。
/// 不带 filename 的 `image` 部分是普通文本字段，会被忽略。
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<Bytes>,
    filter: Option<String>,
}

fn map_multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        tracing::debug!("multipart 解析失败: {}", err.body_text());
        AppError::Validation(MALFORMED_MULTIPART.to_string())
    }
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            // 只有带 filename 的部分才算上传的文件
            IMAGE_FIELD if field.file_name().is_some() => {
                let bytes = field.bytes().await.map_err(map_multipart_error)?;
                form.image.get_or_insert(bytes);
            }
            FILTER_FIELD => {
                let text = field.text().await.map_err(map_multipart_error)?;
                form.filter.get_or_insert(text);
            }
            _ => {}
        }
    }
    Ok(form)
}

#[utoipa::path(
    post,
    path = "/process-image",
    summary = "对上传图片应用滤波",
    description = "上传图片并选择 mean / gaussian / median / negative 之一（缺省 mean，未知名称原样返回），返回 PNG 结果的 Base64。",
    request_body(content = ProcessImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "处理成功", body = ProcessImageResponse),
        (status = 400, description = "未上传图片 / 图片无法解码 / 表单损坏", body = ErrorBody),
        (status = 413, description = "请求体过大", body = ErrorBody),
        (status = 500, description = "内部错误", body = ErrorBody)
    ),
    tag = "Filter"
)]
pub async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessImageResponse>, AppError> {
    let t_total = Instant::now();
    // 非 multipart 请求不可能携带文件，与缺少 image 字段同等对待
    let Ok(mut multipart) = multipart else {
        return Err(AppError::no_image());
    };

    let form = read_upload_form(&mut multipart).await?;
    let image = form.image.ok_or_else(AppError::no_image)?;
    let kind = FilterKind::from_field(form.filter.as_deref());
    let upload_len = image.len();

    let permit = state
        .filter_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("获取滤波信号量失败: {e}")))?;
    let wait = t_total.elapsed();

    let compression = state.png_compression;
    let output = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        service::run_filter(&image, kind, compression)
    })
    .await??;

    tracing::info!(
        filter = kind.as_str(),
        upload_bytes = upload_len,
        width = output.width,
        height = output.height,
        "滤波完成，等待许可: {:?}ms, 总耗时: {:?}ms",
        wait.as_millis(),
        t_total.elapsed().as_millis()
    );

    Ok(Json(ProcessImageResponse {
        processed_image: output.png_base64,
    }))
}

pub fn create_filter_router() -> Router<AppState> {
    Router::new().route("/process-image", post(process_image))
}
