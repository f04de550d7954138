//! # API 统一错误处理
//!
//! 将下层各 crate 的错误类型统一映射到 HTTP 状态码与 JSON 响应体。
//! 所有失败响应都是 `{status: "error", message}`。

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use visiontrade_core::cache::error::CacheError;
use visiontrade_core::market::error::MarketError;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 资源未找到 (404)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 请求参数错误 (400)
    #[error("请求参数错误: {0}")]
    BadRequest(String),

    /// 缓存为空且重建失败 (500)
    #[error("行情数据不可用: {0}")]
    Unavailable(String),

    /// 下层业务错误 (500)
    #[error("内部服务错误: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => {
                tracing::warn!("Market data unavailable: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Internal(msg) => {
                // 内部错误只记录日志，不向客户端透传细节
                tracing::error!("内部服务错误: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiErrorResponse::from_msg(message))).into_response()
    }
}

/// 从 `CacheError` 转换
impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::Unavailable(err.to_string())
    }
}

/// 路径参数无法解析 (例如非 UTF-8) 时返回 400
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// 查询参数无法解析 (例如重复字段) 时返回 400
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// 从 `MarketError` 转换：单只标的查询失败一律视为不存在
impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::NotFound(symbol) => {
                ApiError::NotFound(format!("Stock {} not found or data unavailable", symbol))
            }
            MarketError::Network(_) | MarketError::Timeout(_) | MarketError::Parse(_) => {
                ApiError::NotFound(err.to_string())
            }
            MarketError::Build(_) | MarketError::Unknown(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_error_mapping() {
        assert!(matches!(
            ApiError::from(MarketError::NotFound("X.NS".into())),
            ApiError::NotFound(m) if m.contains("X.NS")
        ));
        assert!(matches!(
            ApiError::from(MarketError::Timeout("slow".into())),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from(MarketError::Build("x".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_bad_request_is_json() {
        let resp = ApiError::BadRequest("duplicate field `period`".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_unavailable_keeps_message() {
        let err = ApiError::from(CacheError::Unavailable("every source failed".into()));
        assert_eq!(err.to_string(), "行情数据不可用: Market data unavailable: every source failed");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
