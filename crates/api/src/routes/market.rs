//! # 聚合行情路由控制器
//!
//! 实现 `/api/market-data` 与 `/api/sector-performance`。
//! 首页仪表盘的全部数据都来自刷新协调器维护的同一份快照。

use axum::Json;
use axum::extract::State;

use visiontrade_core::cache::port::SnapshotCache;
use visiontrade_market::catalog::sector_performance;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    ApiErrorResponse, MarketDataResponse, STATUS_SUCCESS, SectorResponse, SnapshotResponse,
};

/// 获取聚合行情快照
///
/// 快照新鲜时直接返回缓存；过期或为空时同步重建。
/// 重建失败但存在旧快照时返回旧快照。
#[utoipa::path(
    get,
    path = "/api/market-data",
    tag = "行情 (Market)",
    responses(
        (status = 200, description = "成功获取行情快照", body = MarketDataResponse),
        (status = 500, description = "缓存为空且重建失败", body = ApiErrorResponse)
    )
)]
pub async fn get_market_data(
    State(state): State<AppState>,
) -> Result<Json<MarketDataResponse>, ApiError> {
    let served = state.market.get().await?;

    Ok(Json(MarketDataResponse {
        status: STATUS_SUCCESS.to_string(),
        data: SnapshotResponse::from(served.snapshot.as_ref()),
        source: served.origin.as_str().to_string(),
    }))
}

/// 获取行业板块表现 (静态数据)
#[utoipa::path(
    get,
    path = "/api/sector-performance",
    tag = "行情 (Market)",
    responses(
        (status = 200, description = "板块表现列表", body = SectorResponse)
    )
)]
pub async fn get_sector_performance(State(state): State<AppState>) -> Json<SectorResponse> {
    Json(SectorResponse {
        status: STATUS_SUCCESS.to_string(),
        sectors: sector_performance(),
        timestamp: state.clock.now(),
    })
}
