use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::filter::handler::process_image,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::features::health::HealthResponse,
            crate::features::filter::FilterKind,
            crate::features::filter::ProcessImageForm,
            crate::features::filter::ProcessImageResponse,
        )
    ),
    tags(
        (
            name = "Filter",
            description = "图片滤波：mean / gaussian / median / negative，结果为 Base64 PNG。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Image Filter API",
        version = env!("CARGO_PKG_VERSION"),
        description = "上传图片并应用固定参数的 5×5 滤波（Axum + utoipa）。"
    )
)]
pub struct ApiDoc;
