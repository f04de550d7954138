//! # 基于行情提供者的分区数据源
//!
//! 指数分区与排行分区都只是对 `MarketDataProvider` 的批量调用，
//! 因此这里把它们实现为提供者之上的薄适配层。

use async_trait::async_trait;
use chrono::Duration;
use futures::future::join_all;
use std::sync::Arc;
use tracing::warn;
use visiontrade_core::common::{Stock, TimeFrame, TimeProvider, round_to};
use visiontrade_core::market::entity::{
    IndexReading, InstrumentRecord, last_two_closes, percent_change,
};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::{IndexSource, InstrumentSource, MarketDataProvider};

use crate::catalog::Catalog;

/// 指数的展示名称与上游代码。
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: String,
    pub symbol: String,
}

impl IndexSpec {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
        }
    }

    /// 默认跟踪的四个印度市场指数。
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("NIFTY 50", "^NSEI"),
            Self::new("SENSEX", "^BSESN"),
            Self::new("NIFTY BANK", "^NSEBANK"),
            Self::new("NIFTY IT", "^CNXIT"),
        ]
    }
}

/// # Summary
/// 指数分区数据源。
///
/// # Invariants
/// - 单个指数抓取失败时该指数以零值读数保留在列表中。
/// - 全部指数都失败时整体返回错误，由构建器降级为空分区。
pub struct ProviderIndexSource {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
    indices: Vec<IndexSpec>,
}

impl ProviderIndexSource {
    // 覆盖周末与短假期，保证至少拿到两个交易日
    const LOOKBACK_DAYS: i64 = 7;

    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        indices: Vec<IndexSpec>,
    ) -> Self {
        Self {
            provider,
            clock,
            indices,
        }
    }

    async fn read(&self, spec: &IndexSpec) -> Result<IndexReading, MarketError> {
        let stock = Stock {
            symbol: spec.symbol.clone(),
            exchange: None,
        };
        let end = self.clock.now();
        let start = end - Duration::days(Self::LOOKBACK_DAYS);
        let candles = self
            .provider
            .fetch_candles(&stock, TimeFrame::Day1, start, end)
            .await?;
        let (value, previous) = last_two_closes(&candles)
            .ok_or_else(|| MarketError::NotFound(spec.symbol.clone()))?;
        Ok(IndexReading {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            value: round_to(value, 2),
            change_pct: round_to(percent_change(value, previous), 2),
        })
    }
}

#[async_trait]
impl IndexSource for ProviderIndexSource {
    /// # Logic
    /// 1. 并发抓取全部指数的近期日线。
    /// 2. 失败的指数记录告警并以零值读数占位。
    async fn fetch_indices(&self) -> Result<Vec<IndexReading>, MarketError> {
        let results = join_all(self.indices.iter().map(|spec| self.read(spec))).await;

        let mut readings = Vec::with_capacity(results.len());
        let mut succeeded = 0usize;
        let mut last_error = None;
        for (spec, result) in self.indices.iter().zip(results) {
            match result {
                Ok(reading) => {
                    succeeded += 1;
                    readings.push(reading);
                }
                Err(e) => {
                    warn!("Index {} unavailable: {}", spec.name, e);
                    readings.push(IndexReading {
                        name: spec.name.clone(),
                        symbol: spec.symbol.clone(),
                        value: 0.0,
                        change_pct: 0.0,
                    });
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(readings),
        }
    }
}

/// # Summary
/// 排行分区数据源：抓取自选列表中每只股票的近一个月日线。
///
/// # Invariants
/// - 输出顺序与自选列表一致，抓取失败或价格非正的标的被跳过。
pub struct WatchlistSource {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
    catalog: Arc<Catalog>,
    watchlist: Vec<Stock>,
}

impl WatchlistSource {
    const LOOKBACK_DAYS: i64 = 30;

    /// 列表中无法解析的代码会被忽略。
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        catalog: Arc<Catalog>,
        symbols: &[String],
        default_exchange: &str,
    ) -> Self {
        Self {
            provider,
            clock,
            catalog,
            watchlist: symbols
                .iter()
                .filter_map(|s| Stock::parse(s, default_exchange))
                .collect(),
        }
    }

    async fn record(&self, stock: &Stock) -> Result<InstrumentRecord, MarketError> {
        let end = self.clock.now();
        let start = end - Duration::days(Self::LOOKBACK_DAYS);
        let candles = self
            .provider
            .fetch_candles(stock, TimeFrame::Day1, start, end)
            .await?;
        InstrumentRecord::from_candles(stock.qualified(), self.catalog.name_of(stock), &candles)
            .filter(|r| r.price > 0.0)
            .ok_or_else(|| MarketError::NotFound(stock.qualified()))
    }
}

#[async_trait]
impl InstrumentSource for WatchlistSource {
    async fn fetch_instruments(&self) -> Result<Vec<InstrumentRecord>, MarketError> {
        let results = join_all(self.watchlist.iter().map(|stock| self.record(stock))).await;

        let mut records = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (stock, result) in self.watchlist.iter().zip(results) {
            match result {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping {}: {}", stock, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if records.is_empty() => Err(e),
            _ => Ok(records),
        }
    }
}
