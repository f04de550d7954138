use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use visiontrade_core::common::TimeProvider;
use visiontrade_core::market::entity::{Section, Snapshot};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::{
    FlowSource, IndexSource, IndicatorSource, InstrumentSource, NewsSource, SnapshotSource,
};

use crate::ranking::{RANKING_DEPTH, rank};
use crate::session::market_status;

/// 快照构建所需的全部分区数据源。
#[derive(Clone)]
pub struct SnapshotSources {
    pub indices: Arc<dyn IndexSource>,
    pub instruments: Arc<dyn InstrumentSource>,
    pub news: Arc<dyn NewsSource>,
    pub indicators: Arc<dyn IndicatorSource>,
    pub flows: Arc<dyn FlowSource>,
}

/// # Summary
/// 快照构建器：并发调用各分区数据源并组装一份不可变快照。
///
/// # Invariants
/// - 不持有任何缓存或调度状态。
/// - 每个分区的抓取都受 `source_timeout` 约束。
/// - 单个分区失败只会让该分区为空，并记录到 `Snapshot::degraded`。
/// - 所有上游分区 (指数、个股、新闻) 都失败时整体失败，本地生成的分区不足以构成快照。
pub struct SnapshotBuilder {
    sources: SnapshotSources,
    clock: Arc<dyn TimeProvider>,
    source_timeout: Duration,
}

impl SnapshotBuilder {
    pub fn new(
        sources: SnapshotSources,
        clock: Arc<dyn TimeProvider>,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            clock,
            source_timeout,
        }
    }

    /// 为单个分区的抓取加上超时，超时映射为 `MarketError::Timeout`。
    async fn bounded<T>(
        &self,
        section: Section,
        fut: impl Future<Output = Result<T, MarketError>>,
    ) -> Result<T, MarketError> {
        match tokio::time::timeout(self.source_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(MarketError::Timeout(format!(
                "{:?} source exceeded {:?}",
                section, self.source_timeout
            ))),
        }
    }
}

/// 失败分区以默认值替代，并记入降级列表。
fn settle<T: Default>(
    section: Section,
    result: Result<T, MarketError>,
    degraded: &mut Vec<Section>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("Section {:?} degraded: {}", section, e);
            degraded.push(section);
            T::default()
        }
    }
}

#[async_trait]
impl SnapshotSource for SnapshotBuilder {
    /// # Summary
    /// 构建一份完整快照。
    ///
    /// # Logic
    /// 1. 使用 `tokio::join!` 并发抓取五个分区，每个分区独立超时。
    /// 2. 失败分区替换为空列表或零值指标块。
    /// 3. 从同一批个股记录派生涨幅榜、跌幅榜、活跃榜。
    /// 4. 根据当前时间计算市场状态并打上创建时间戳。
    ///
    /// # Returns
    /// 全部上游分区都失败时返回 `MarketError::Build`。
    async fn build(&self) -> Result<Snapshot, MarketError> {
        let (indices, instruments, news, technical, flows) = tokio::join!(
            self.bounded(Section::Indices, self.sources.indices.fetch_indices()),
            self.bounded(Section::Instruments, self.sources.instruments.fetch_instruments()),
            self.bounded(Section::News, self.sources.news.fetch_news()),
            self.bounded(Section::Indicators, self.sources.indicators.fetch_indicators()),
            self.bounded(Section::Flows, self.sources.flows.fetch_flows()),
        );

        let mut degraded = Vec::new();
        let indices = settle(Section::Indices, indices, &mut degraded);
        let instruments = settle(Section::Instruments, instruments, &mut degraded);
        let news = settle(Section::News, news, &mut degraded);
        let technical = settle(Section::Indicators, technical, &mut degraded);
        let flows = settle(Section::Flows, flows, &mut degraded);

        let upstream_failed = Section::ALL
            .into_iter()
            .filter(|s| s.is_upstream())
            .all(|s| degraded.contains(&s));
        if upstream_failed {
            return Err(MarketError::Build(format!(
                "every upstream source failed, degraded={:?}",
                degraded
            )));
        }

        let rankings = rank(&instruments, RANKING_DEPTH);
        let now = self.clock.now();

        info!(
            "Snapshot built: {} indices, {} instruments, {} news, degraded={:?}",
            indices.len(),
            instruments.len(),
            news.len(),
            degraded
        );

        Ok(Snapshot {
            market_status: market_status(now),
            indices,
            top_gainers: rankings.top_gainers,
            top_losers: rankings.top_losers,
            most_active: rankings.most_active,
            news,
            technical,
            flows,
            degraded,
            created_at: now,
        })
    }
}
