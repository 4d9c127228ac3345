use axum::http::{HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer, ExposeHeaders};

use crate::config::CorsConfig;

/// 配置列表解析结果：`*` 表示任意，否则为显式白名单。
#[derive(Debug, PartialEq)]
enum AllowList<T> {
    Any,
    Only(Vec<T>),
}

impl<T> AllowList<T> {
    fn is_any(&self) -> bool {
        matches!(self, AllowList::Any)
    }

    fn is_empty(&self) -> bool {
        matches!(self, AllowList::Only(v) if v.is_empty())
    }
}

fn parse_list<T>(
    label: &str,
    values: &[String],
    parse: impl Fn(&str) -> Option<T>,
) -> AllowList<T> {
    let mut items = Vec::new();
    for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if value == "*" {
            return AllowList::Any;
        }
        match parse(value) {
            Some(item) => items.push(item),
            None => tracing::warn!("CORS {} 含无效值: {}", label, value),
        }
    }
    AllowList::Only(items)
}

fn parse_origin(value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(value).ok()
}

fn parse_method(value: &str) -> Option<Method> {
    Method::from_bytes(value.to_ascii_uppercase().as_bytes()).ok()
}

fn parse_header(value: &str) -> Option<HeaderName> {
    HeaderName::from_bytes(value.to_ascii_lowercase().as_bytes()).ok()
}

/// 根据配置构建 CORS 中间件；配置无效或未启用时返回 None。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins = parse_list("allowed_origins", &cors.allowed_origins, parse_origin);
    if origins.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }
    let methods = parse_list("allowed_methods", &cors.allowed_methods, parse_method);
    let headers = parse_list("allowed_headers", &cors.allowed_headers, parse_header);
    let expose = parse_list("expose_headers", &cors.expose_headers, parse_header);

    // tower-http 在 credentials 与通配符同时出现时会直接 panic
    if cors.allow_credentials
        && (origins.is_any() || methods.is_any() || headers.is_any() || expose.is_any())
    {
        tracing::error!("CORS 配置无效：allow_credentials=true 不能与 \"*\" 同时使用，已跳过启用");
        return None;
    }

    let mut layer = CorsLayer::new()
        .allow_origin(match origins {
            AllowList::Any => AllowOrigin::from(Any),
            AllowList::Only(list) => AllowOrigin::list(list),
        })
        .allow_methods(match methods {
            AllowList::Any => AllowMethods::from(Any),
            AllowList::Only(list) => AllowMethods::list(list),
        })
        .allow_headers(match headers {
            AllowList::Any => AllowHeaders::from(Any),
            AllowList::Only(list) => AllowHeaders::list(list),
        })
        .expose_headers(match expose {
            AllowList::Any => ExposeHeaders::from(Any),
            AllowList::Only(list) => ExposeHeaders::list(list),
        });

    if cors.allow_credentials {
        layer = layer.allow_credentials(true);
    }
    if let Some(secs) = cors.max_age_secs.filter(|s| *s > 0) {
        layer = layer.max_age(Duration::from_secs(secs));
    }

    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::{AllowList, build_cors_layer, parse_list, parse_method};
    use crate::config::CorsConfig;
    use axum::http::Method;

    #[test]
    fn default_config_allows_any_origin() {
        assert!(build_cors_layer(&CorsConfig::default()).is_some());
    }

    #[test]
    fn disabled_config_yields_no_layer() {
        let cors = CorsConfig {
            enabled: false,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn build_cors_layer_skips_when_origins_empty() {
        let cors = CorsConfig {
            allowed_origins: Vec::new(),
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn build_cors_layer_rejects_credentials_with_wildcard() {
        let cors = CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn parse_methods_normalizes_case_and_skips_invalid() {
        let input = vec!["get".to_string(), " POST ".to_string(), "bad method".to_string()];
        let parsed = parse_list("allowed_methods", &input, parse_method);
        assert_eq!(parsed, AllowList::Only(vec![Method::GET, Method::POST]));
    }
}
