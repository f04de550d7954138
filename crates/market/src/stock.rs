use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};
use visiontrade_core::common::{HistoryRange, Stock, TimeFrame, TimeProvider, round_to};
use visiontrade_core::market::entity::{
    CatalogEntry, InstrumentRecord, Prediction, PricePoint, StockDetail,
};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::{IndicatorSource, MarketDataProvider, Predictor};

use crate::catalog::{Catalog, SEARCH_LIMIT};

/// 股票详情中保留的图表点数。
const CHART_POINTS: usize = 30;

/// # Summary
/// 单只股票查询服务，绕过聚合缓存直接访问行情提供者。
///
/// # Invariants
/// - 调用方传入的代码在此处统一补全交易所后缀。
/// - 任何无法解析出有效价格的情况都以 `MarketError::NotFound` 返回。
pub struct StockService {
    provider: Arc<dyn MarketDataProvider>,
    indicators: Arc<dyn IndicatorSource>,
    predictor: Arc<dyn Predictor>,
    catalog: Arc<Catalog>,
    clock: Arc<dyn TimeProvider>,
    default_exchange: String,
}

impl StockService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        indicators: Arc<dyn IndicatorSource>,
        predictor: Arc<dyn Predictor>,
        catalog: Arc<Catalog>,
        clock: Arc<dyn TimeProvider>,
        default_exchange: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            indicators,
            predictor,
            catalog,
            clock,
            default_exchange: default_exchange.into(),
        }
    }

    /// 解析代码，空代码视为不存在。
    pub fn resolve(&self, raw: &str) -> Result<Stock, MarketError> {
        Stock::parse(raw, &self.default_exchange)
            .ok_or_else(|| MarketError::NotFound(raw.to_string()))
    }

    /// # Summary
    /// 获取最近一个月日线并推导行情记录。
    ///
    /// # Logic
    /// 1. 抓取近 30 天日线。
    /// 2. 上游任何失败都记录日志并折算为 NotFound。
    /// 3. 价格非正视为无数据。
    async fn month(
        &self,
        stock: &Stock,
    ) -> Result<(InstrumentRecord, Vec<PricePoint>), MarketError> {
        let end = self.clock.now();
        let start = end - Duration::days(30);
        let candles = self
            .provider
            .fetch_candles(stock, TimeFrame::Day1, start, end)
            .await
            .map_err(|e| {
                warn!("Lookup {} failed: {}", stock, e);
                MarketError::NotFound(stock.qualified())
            })?;

        let record = InstrumentRecord::from_candles(
            stock.qualified(),
            self.catalog.name_of(stock),
            &candles,
        )
        .filter(|r| r.price > 0.0)
        .ok_or_else(|| MarketError::NotFound(stock.qualified()))?;

        let skip = candles.len().saturating_sub(CHART_POINTS);
        let chart = candles
            .iter()
            .skip(skip)
            .map(|c| PricePoint {
                time: c.time,
                close: round_to(c.close, 2),
            })
            .collect();
        Ok((record, chart))
    }

    /// # Summary
    /// 查询单只股票详情：行情记录、图表、预测与技术指标。
    ///
    /// # Returns
    /// 代码无法解析或上游无数据时返回 `MarketError::NotFound`。
    pub async fn lookup(&self, raw: &str) -> Result<StockDetail, MarketError> {
        let stock = self.resolve(raw)?;
        let (record, chart) = self.month(&stock).await?;
        let prediction = self.predictor.predict(&record).await?;
        let technical = match self.indicators.fetch_indicators().await {
            Ok(block) => block,
            Err(e) => {
                warn!("Indicators for {} unavailable: {}", stock, e);
                Default::default()
            }
        };
        debug!("Lookup {} -> {}", stock, record.price);
        Ok(StockDetail {
            record,
            chart,
            prediction,
            technical,
        })
    }

    /// 仅返回行情记录与预测，供预测接口使用。
    pub async fn predict(&self, raw: &str) -> Result<(InstrumentRecord, Prediction), MarketError> {
        let stock = self.resolve(raw)?;
        let (record, _) = self.month(&stock).await?;
        let prediction = self.predictor.predict(&record).await?;
        Ok((record, prediction))
    }

    /// # Summary
    /// 按区间获取收盘价序列。
    ///
    /// # Logic
    /// 1. 区间映射为 (周期, 回溯天数)。
    /// 2. 抓取后仅保留收盘价。
    pub async fn history(
        &self,
        raw: &str,
        range: HistoryRange,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let stock = self.resolve(raw)?;
        let (timeframe, days) = range.window();
        let end = self.clock.now();
        let candles = self
            .provider
            .fetch_candles(&stock, timeframe, end - Duration::days(days), end)
            .await?;
        Ok(candles
            .into_iter()
            .map(|c| PricePoint {
                time: c.time,
                close: c.close,
            })
            .collect())
    }

    pub fn search(&self, query: &str) -> Vec<CatalogEntry> {
        self.catalog.search(query, SEARCH_LIMIT)
    }
}
