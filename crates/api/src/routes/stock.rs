//! # 个股路由控制器
//!
//! 单只股票的详情、历史、搜索与预测。这些接口绕过聚合缓存，
//! 直接通过 `StockService` 访问行情提供者。

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};

use visiontrade_core::common::{HistoryRange, display_symbol};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{
    ApiErrorResponse, HistoryQuery, HistoryResponse, PredictRequest, PredictResponse,
    STATUS_SUCCESS, SearchResponse, StockPrediction, StockResponse,
};

/// 获取单只股票详情
///
/// 未带交易所后缀的代码默认补全为 NSE (`.NS`)。
#[utoipa::path(
    get,
    path = "/api/stock/{symbol}",
    tag = "个股 (Stock)",
    params(
        ("symbol" = String, Path, description = "股票代码，例如 TCS 或 AAPL.US")
    ),
    responses(
        (status = 200, description = "股票详情", body = StockResponse),
        (status = 400, description = "路径参数无法解析", body = ApiErrorResponse),
        (status = 404, description = "股票不存在或无数据", body = ApiErrorResponse)
    )
)]
pub async fn get_stock(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<StockResponse>, ApiError> {
    let Path(symbol) = path?;
    let detail = state.stocks.lookup(&symbol).await?;
    Ok(Json(StockResponse::from(&detail)))
}

/// 按代码或名称搜索股票
#[utoipa::path(
    get,
    path = "/api/search/{query}",
    tag = "个股 (Stock)",
    params(
        ("query" = String, Path, description = "搜索关键字，不区分大小写")
    ),
    responses(
        (status = 200, description = "至多 10 条匹配结果", body = SearchResponse),
        (status = 400, description = "路径参数无法解析", body = ApiErrorResponse)
    )
)]
pub async fn search_stocks(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Path(query) = path?;
    Ok(Json(SearchResponse {
        status: STATUS_SUCCESS.to_string(),
        query: query.trim().to_uppercase(),
        results: state.stocks.search(&query),
    }))
}

/// 预测股票价格
///
/// 结果由占位预测器生成，仅供演示。
#[utoipa::path(
    post,
    path = "/api/predict",
    tag = "个股 (Stock)",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "预测结果", body = PredictResponse),
        (status = 400, description = "缺少 symbol", body = ApiErrorResponse),
        (status = 404, description = "股票不存在或无数据", body = ApiErrorResponse)
    )
)]
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let symbol = payload
        .ok()
        .and_then(|Json(req)| req.symbol)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Symbol required".to_string()))?;

    let (record, prediction) = state.stocks.predict(&symbol).await.map_err(|e| {
        tracing::debug!("Prediction for {} failed: {}", symbol, e);
        ApiError::NotFound(format!("Cannot predict for {}, data unavailable", symbol))
    })?;

    Ok(Json(PredictResponse {
        status: STATUS_SUCCESS.to_string(),
        prediction: StockPrediction::new(&record, &prediction),
        timestamp: state.clock.now(),
    }))
}

/// 获取历史收盘价序列
#[utoipa::path(
    get,
    path = "/api/history/{symbol}",
    tag = "个股 (Stock)",
    params(
        ("symbol" = String, Path, description = "股票代码"),
        ("period" = Option<String>, Query, description = "1d | 1m | 6m | 1y | 5y，默认 1y")
    ),
    responses(
        (status = 200, description = "收盘价序列", body = HistoryResponse),
        (status = 400, description = "路径或查询参数无法解析", body = ApiErrorResponse),
        (status = 404, description = "股票不存在或无数据", body = ApiErrorResponse)
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Path(symbol) = path?;
    let Query(query) = query?;
    let period = HistoryRange::parse_or_default(query.period.as_deref());
    let stock = state.stocks.resolve(&symbol)?;
    let data = state.stocks.history(&symbol, period).await?;

    Ok(Json(HistoryResponse {
        status: STATUS_SUCCESS.to_string(),
        symbol: display_symbol(&stock.qualified()).to_string(),
        period,
        data,
    }))
}
