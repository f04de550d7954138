//! # 系统路由控制器
//!
//! 服务目录、健康检查以及未知路由的兜底响应。

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use visiontrade_core::cache::port::SnapshotCache;

use crate::server::AppState;
use crate::types::{HealthResponse, IndexResponse, NotFoundResponse, STATUS_ERROR};

const ENDPOINTS: [(&str, &str); 8] = [
    ("/api/health", "Check API health"),
    ("/api/market-data", "Get all market data"),
    ("/api/stock/{symbol}", "Get specific stock data"),
    ("/api/search/{query}", "Search for stocks"),
    ("/api/predict", "Predict stock price (POST)"),
    ("/api/history/{symbol}", "Get historical closes (?period=1d|1m|6m|1y|5y)"),
    ("/api/sector-performance", "Get sector performance"),
    ("/swagger-ui", "Interactive API documentation"),
];

/// 服务目录
#[utoipa::path(
    get,
    path = "/",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务名称、版本与接口列表", body = IndexResponse)
    )
)]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "VisionTrade Stock Market API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: ENDPOINTS
            .iter()
            .map(|(path, desc)| (path.to_string(), desc.to_string()))
            .collect::<BTreeMap<_, _>>(),
    })
}

/// 健康检查
///
/// `cache_age` 为当前快照的年龄 (整秒)，缓存尚未填充时为 null。
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_age = state
        .market
        .age()
        .map(|age| u64::try_from(age.num_seconds()).unwrap_or(0));

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: state.clock.now(),
        cache_age,
    })
}

/// 未知路由兜底：返回 JSON 404 与可用接口列表
pub async fn not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            status: STATUS_ERROR.to_string(),
            message: "Endpoint not found".to_string(),
            available_endpoints: ENDPOINTS.iter().map(|(path, _)| path.to_string()).collect(),
        }),
    )
}
