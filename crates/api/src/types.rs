//! # DTO (Data Transfer Object) 层
//!
//! 将内部领域模型转化为面向前端 JSON 输出的轻量结构体。
//! 所有 DTO 必须派生 `utoipa::ToSchema` 以自动进入 Swagger 文档。
//! 领域内部使用带交易所后缀的完整代码，在这里统一去掉后缀。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use visiontrade_core::common::{HistoryRange, display_symbol, round_to};
use visiontrade_core::market::entity::{
    CatalogEntry, FlowEntry, IndexReading, InstrumentRecord, MarketStatus, NewsItem, Prediction,
    PricePoint, Recommendation, RiskLevel, Section, SectorPerformance, Snapshot, StockDetail,
    TechnicalIndicators,
};

/// 成功响应的固定状态值。
pub const STATUS_SUCCESS: &str = "success";
/// 失败响应的固定状态值。
pub const STATUS_ERROR: &str = "error";

// ============================================================
//  行情快照 DTO
// ============================================================

/// 排行榜中的个股条目
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResponse {
    /// 去掉交易所后缀的代码
    #[schema(example = "TCS")]
    pub symbol: String,
    #[schema(example = "Tata Consultancy Services")]
    pub name: String,
    #[schema(example = 3890.25)]
    pub price: f64,
    #[schema(example = 12.4)]
    pub change: f64,
    /// 相对前收的百分比变化
    #[schema(example = 0.32)]
    pub change_pct: f64,
    pub volume: u64,
}

impl From<&InstrumentRecord> for InstrumentResponse {
    fn from(r: &InstrumentRecord) -> Self {
        Self {
            symbol: display_symbol(&r.symbol).to_string(),
            name: r.name.clone(),
            price: round_to(r.price, 2),
            change: round_to(r.change, 2),
            change_pct: round_to(r.change_pct, 2),
            volume: r.volume,
        }
    }
}

fn instruments(records: &[InstrumentRecord]) -> Vec<InstrumentResponse> {
    records.iter().map(InstrumentResponse::from).collect()
}

/// 聚合行情快照 DTO - 对应首页仪表盘的全部数据
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub market_status: MarketStatus,
    pub indices: Vec<IndexReading>,
    pub top_gainers: Vec<InstrumentResponse>,
    pub top_losers: Vec<InstrumentResponse>,
    pub most_active: Vec<InstrumentResponse>,
    pub market_news: Vec<NewsItem>,
    pub technical_indicators: TechnicalIndicators,
    pub fii_dii_data: Vec<FlowEntry>,
    /// 本次构建中失败并以空值替代的分区
    pub degraded: Vec<Section>,
    /// 快照构建时间
    pub timestamp: DateTime<Utc>,
}

impl From<&Snapshot> for SnapshotResponse {
    fn from(s: &Snapshot) -> Self {
        Self {
            market_status: s.market_status,
            indices: s.indices.clone(),
            top_gainers: instruments(&s.top_gainers),
            top_losers: instruments(&s.top_losers),
            most_active: instruments(&s.most_active),
            market_news: s.news.clone(),
            technical_indicators: s.technical.clone(),
            fii_dii_data: s.flows.clone(),
            degraded: s.degraded.clone(),
            timestamp: s.created_at,
        }
    }
}

/// `/api/market-data` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarketDataResponse {
    #[schema(example = "success")]
    pub status: String,
    pub data: SnapshotResponse,
    /// 命中缓存为 `cache`，本次请求实时构建为 `live`
    #[schema(example = "cache")]
    pub source: String,
}

/// `/api/sector-performance` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SectorResponse {
    pub status: String,
    pub sectors: Vec<SectorPerformance>,
    pub timestamp: DateTime<Utc>,
}

// ============================================================
//  个股 DTO
// ============================================================

/// 图表数据：日期与收盘价一一对应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartData {
    #[schema(example = json!(["2024-03-01"]))]
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
}

impl From<&[PricePoint]> for ChartData {
    fn from(points: &[PricePoint]) -> Self {
        Self {
            dates: points
                .iter()
                .map(|p| p.time.format("%Y-%m-%d").to_string())
                .collect(),
            prices: points.iter().map(|p| p.close).collect(),
        }
    }
}

/// 预测结果 DTO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    #[schema(example = 3950.1)]
    pub predicted_price: f64,
    #[schema(example = 78.5)]
    pub confidence: f64,
    pub recommendation: Recommendation,
    #[schema(example = "1 week")]
    pub timeframe: String,
    pub target: f64,
    pub stop_loss: f64,
    pub risk_level: RiskLevel,
    pub volatility: f64,
}

impl From<&Prediction> for PredictionResponse {
    fn from(p: &Prediction) -> Self {
        Self {
            predicted_price: p.predicted_price,
            confidence: p.confidence,
            recommendation: p.recommendation,
            timeframe: p.timeframe.clone(),
            target: p.target,
            stop_loss: p.stop_loss,
            risk_level: p.risk_level,
            volatility: p.volatility,
        }
    }
}

/// `/api/stock/{symbol}` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub status: String,
    #[schema(example = "TCS")]
    pub symbol: String,
    #[schema(example = "Tata Consultancy Services")]
    pub company_name: String,
    pub current_price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub chart_data: ChartData,
    pub prediction: PredictionResponse,
    pub technical_indicators: TechnicalIndicators,
}

impl From<&StockDetail> for StockResponse {
    fn from(d: &StockDetail) -> Self {
        let r = &d.record;
        Self {
            status: STATUS_SUCCESS.to_string(),
            symbol: display_symbol(&r.symbol).to_string(),
            company_name: r.name.clone(),
            current_price: round_to(r.price, 2),
            change: round_to(r.change, 2),
            change_percent: round_to(r.change_pct, 2),
            volume: r.volume,
            chart_data: ChartData::from(d.chart.as_slice()),
            prediction: PredictionResponse::from(&d.prediction),
            technical_indicators: d.technical.clone(),
        }
    }
}

/// `/api/search/{query}` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub status: String,
    /// 规范化 (大写) 后的查询词
    #[schema(example = "TATA")]
    pub query: String,
    pub results: Vec<CatalogEntry>,
}

/// `/api/predict` 请求体
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictRequest {
    #[schema(example = "INFY")]
    pub symbol: Option<String>,
}

/// 预测接口中的单只股票结果
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockPrediction {
    #[schema(example = "INFY")]
    pub symbol: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub timeframe: String,
    pub target: f64,
    pub stop_loss: f64,
    pub risk_level: RiskLevel,
    pub volatility: f64,
}

impl StockPrediction {
    pub fn new(record: &InstrumentRecord, p: &Prediction) -> Self {
        Self {
            symbol: display_symbol(&record.symbol).to_string(),
            current_price: round_to(record.price, 2),
            predicted_price: p.predicted_price,
            confidence: p.confidence,
            recommendation: p.recommendation,
            timeframe: p.timeframe.clone(),
            target: p.target,
            stop_loss: p.stop_loss,
            risk_level: p.risk_level,
            volatility: p.volatility,
        }
    }
}

/// `/api/predict` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictResponse {
    pub status: String,
    pub prediction: StockPrediction,
    pub timestamp: DateTime<Utc>,
}

/// `/api/history/{symbol}` 查询参数
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// 1d | 1m | 6m | 1y | 5y，缺省或无法识别时为 1y
    pub period: Option<String>,
}

/// `/api/history/{symbol}` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryResponse {
    pub status: String,
    #[schema(example = "TCS")]
    pub symbol: String,
    pub period: HistoryRange,
    pub data: Vec<PricePoint>,
}

// ============================================================
//  系统 DTO
// ============================================================

/// `/api/health` 响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
    /// 当前快照的年龄 (秒)，缓存为空时为 null
    #[schema(example = 12)]
    pub cache_age: Option<u64>,
}

/// `/` 目录响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    pub message: String,
    pub version: String,
    /// 路径 -> 说明
    pub endpoints: BTreeMap<String, String>,
}

/// 通用失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 固定为 `error`
    #[schema(example = "error")]
    pub status: String,
    /// 错误描述信息
    pub message: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            message: msg.into(),
        }
    }
}

/// 未知路由的失败响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotFoundResponse {
    pub status: String,
    pub message: String,
    pub available_endpoints: Vec<String>,
}
