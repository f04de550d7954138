use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use visiontrade_core::common::FakeClockProvider;
use visiontrade_core::market::entity::{
    FlowEntry, IndexReading, InstrumentRecord, MarketStatus, NewsItem, Section,
    TechnicalIndicators,
};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::{
    FlowSource, IndexSource, IndicatorSource, InstrumentSource, NewsSource, SnapshotSource,
};
use visiontrade_market::builder::{SnapshotBuilder, SnapshotSources};

/// # Summary
/// 可配置成功、失败或超时的模拟分区数据源。
#[derive(Clone, Copy)]
enum Behaviour {
    Ok,
    Fail,
    Hang,
}

struct MockSource {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl MockSource {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    async fn run<T>(&self, value: T) -> Result<T, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Ok => Ok(value),
            Behaviour::Fail => Err(MarketError::Network("connection refused".into())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(value)
            }
        }
    }
}

#[async_trait]
impl IndexSource for MockSource {
    async fn fetch_indices(&self) -> Result<Vec<IndexReading>, MarketError> {
        self.run(vec![IndexReading {
            name: "NIFTY 50".into(),
            symbol: "^NSEI".into(),
            value: 22045.5,
            change_pct: 0.42,
        }])
        .await
    }
}

#[async_trait]
impl InstrumentSource for MockSource {
    async fn fetch_instruments(&self) -> Result<Vec<InstrumentRecord>, MarketError> {
        self.run(vec![
            InstrumentRecord::new("TCS.NS", "TCS", 110.0, 100.0, 500),
            InstrumentRecord::new("INFY.NS", "Infosys", 95.0, 100.0, 900),
            InstrumentRecord::new("LT.NS", "L&T", 101.0, 100.0, 100),
        ])
        .await
    }
}

#[async_trait]
impl NewsSource for MockSource {
    async fn fetch_news(&self) -> Result<Vec<NewsItem>, MarketError> {
        self.run(vec![NewsItem {
            title: "Markets rally".into(),
            link: "https://example.com/a".into(),
            source: "Yahoo Finance".into(),
            published_at: None,
        }])
        .await
    }
}

#[async_trait]
impl IndicatorSource for MockSource {
    async fn fetch_indicators(&self) -> Result<TechnicalIndicators, MarketError> {
        self.run(TechnicalIndicators {
            rsi: 55.0,
            ..Default::default()
        })
        .await
    }
}

#[async_trait]
impl FlowSource for MockSource {
    async fn fetch_flows(&self) -> Result<Vec<FlowEntry>, MarketError> {
        self.run(vec![FlowEntry {
            date: "Feb 29".into(),
            fii: 1250.5,
            dii: -800.2,
        }])
        .await
    }
}

fn sources(
    indices: Behaviour,
    instruments: Behaviour,
    news: Behaviour,
    indicators: Behaviour,
    flows: Behaviour,
) -> SnapshotSources {
    SnapshotSources {
        indices: MockSource::new(indices),
        instruments: MockSource::new(instruments),
        news: MockSource::new(news),
        indicators: MockSource::new(indicators),
        flows: MockSource::new(flows),
    }
}

fn builder(sources: SnapshotSources) -> SnapshotBuilder {
    // 2024-03-01 (周五) 11:30 IST，处于交易时段
    let clock = Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap(),
    ));
    SnapshotBuilder::new(sources, clock, Duration::from_millis(100))
}

#[tokio::test]
async fn test_build_all_sections() -> anyhow::Result<()> {
    use Behaviour::Ok as O;
    let snapshot = builder(sources(O, O, O, O, O)).build().await?;

    assert!(snapshot.degraded.is_empty());
    assert_eq!(snapshot.market_status, MarketStatus::Open);
    assert_eq!(snapshot.indices.len(), 1);
    assert_eq!(snapshot.news.len(), 1);
    assert_eq!(snapshot.flows.len(), 1);
    assert_eq!(snapshot.technical.rsi, 55.0);
    assert_eq!(snapshot.created_at, Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap());

    assert_eq!(snapshot.top_gainers[0].symbol, "TCS.NS");
    assert_eq!(snapshot.top_losers[0].symbol, "INFY.NS");
    assert_eq!(snapshot.most_active[0].symbol, "INFY.NS");
    assert_eq!(snapshot.top_gainers.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_failed_source_degrades_only_its_section() -> anyhow::Result<()> {
    use Behaviour::{Fail as F, Ok as O};
    let snapshot = builder(sources(O, O, F, O, O)).build().await?;

    assert_eq!(snapshot.degraded, vec![Section::News]);
    assert!(snapshot.news.is_empty());
    assert_eq!(snapshot.indices.len(), 1);
    assert_eq!(snapshot.top_gainers.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_failed_instruments_empty_all_rankings() -> anyhow::Result<()> {
    use Behaviour::{Fail as F, Ok as O};
    let snapshot = builder(sources(O, F, O, F, O)).build().await?;

    assert_eq!(snapshot.degraded, vec![Section::Instruments, Section::Indicators]);
    assert!(snapshot.top_gainers.is_empty());
    assert!(snapshot.top_losers.is_empty());
    assert!(snapshot.most_active.is_empty());
    assert_eq!(snapshot.technical, TechnicalIndicators::default());
    Ok(())
}

#[tokio::test]
async fn test_hanging_source_times_out() -> anyhow::Result<()> {
    use Behaviour::{Hang as H, Ok as O};
    let started = std::time::Instant::now();
    let snapshot = builder(sources(H, O, O, O, O)).build().await?;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(snapshot.degraded, vec![Section::Indices]);
    assert!(snapshot.indices.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_every_source_failing_is_build_error() {
    use Behaviour::Fail as F;
    let result = builder(sources(F, F, F, F, F)).build().await;
    assert!(matches!(result, Err(MarketError::Build(_))));
}

#[tokio::test]
async fn test_every_upstream_failing_is_build_error() {
    use Behaviour::{Fail as F, Ok as O};
    // 本地生成的指标与资金流向仍然成功
    let result = builder(sources(F, F, F, O, O)).build().await;
    assert!(matches!(result, Err(MarketError::Build(_))));
}

#[tokio::test]
async fn test_single_upstream_section_is_enough() -> anyhow::Result<()> {
    use Behaviour::{Fail as F, Ok as O};
    let snapshot = builder(sources(F, F, O, F, F)).build().await?;
    assert_eq!(
        snapshot.degraded,
        vec![Section::Indices, Section::Instruments, Section::Indicators, Section::Flows]
    );
    assert_eq!(snapshot.news.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_each_build_calls_every_source_once() -> anyhow::Result<()> {
    let news = MockSource::new(Behaviour::Ok);
    let mut s = sources(
        Behaviour::Ok,
        Behaviour::Ok,
        Behaviour::Ok,
        Behaviour::Ok,
        Behaviour::Ok,
    );
    s.news = news.clone();
    let b = builder(s);
    b.build().await?;
    b.build().await?;
    assert_eq!(news.calls.load(Ordering::SeqCst), 2);
    Ok(())
}
