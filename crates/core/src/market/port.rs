use crate::common::{Stock, TimeFrame};
use crate::market::entity::{
    Candle, FlowEntry, IndexReading, InstrumentRecord, NewsItem, Prediction, Snapshot,
    TechnicalIndicators,
};
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// # Summary
/// 市场行情数据提供者接口（原始数据源）。
///
/// # Invariants
/// - 实现者必须自行约束单次请求耗时 (例如 HTTP 客户端超时)。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取特定证券在指定时间范围内的 K 线数据。
    ///
    /// # Logic
    /// 1. 构建数据源请求。
    /// 2. 执行网络请求并解析响应数据。
    ///
    /// # Arguments
    /// * `stock`: 证券身份。
    /// * `timeframe`: K 线周期。
    /// * `start`: 开始时间。
    /// * `end`: 结束时间。
    ///
    /// # Returns
    /// 成功返回按时间升序排列的 K 线列表。
    async fn fetch_candles(
        &self,
        stock: &Stock,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MarketError>;
}

/// 指数分区数据源。
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_indices(&self) -> Result<Vec<IndexReading>, MarketError>;
}

/// # Summary
/// 排行分区数据源，返回一组未排序的个股记录。
///
/// # Invariants
/// - 返回的记录顺序即排行时的并列顺序。
#[async_trait]
pub trait InstrumentSource: Send + Sync {
    async fn fetch_instruments(&self) -> Result<Vec<InstrumentRecord>, MarketError>;
}

/// 新闻分区数据源。
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketError>;
}

/// 技术指标数据源。
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    async fn fetch_indicators(&self) -> Result<TechnicalIndicators, MarketError>;
}

/// 机构资金流向数据源。
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn fetch_flows(&self) -> Result<Vec<FlowEntry>, MarketError>;
}

/// 单只股票的价格预测器。
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, record: &InstrumentRecord) -> Result<Prediction, MarketError>;
}

/// # Summary
/// 快照构建契约，刷新协调器只依赖此接口。
///
/// # Invariants
/// - 单个分区失败时仍返回可用快照，失败分区记录在 `Snapshot::degraded`。
/// - 不修改任何共享状态。
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// # Summary
    /// 调用全部分区数据源并组装一份不可变快照。
    ///
    /// # Returns
    /// 全部分区失败时返回 `MarketError::Build`。
    async fn build(&self) -> Result<Snapshot, MarketError>;
}
