use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use visiontrade_cache::coordinator::RefreshCoordinator;
use visiontrade_core::cache::error::CacheError;
use visiontrade_core::cache::port::{Origin, SnapshotCache};
use visiontrade_core::common::FakeClockProvider;
use visiontrade_core::market::entity::{IndexReading, MarketStatus, Snapshot};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::SnapshotSource;

/// # Summary
/// 模拟快照构建器：返回可调整的 NIFTY 读数，并统计调用次数。
struct ScriptedSource {
    nifty: Mutex<f64>,
    failing: AtomicBool,
    delay: std::time::Duration,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(nifty: f64) -> Arc<Self> {
        Self::with_delay(nifty, std::time::Duration::ZERO)
    }

    fn with_delay(nifty: f64, delay: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            nifty: Mutex::new(nifty),
            failing: AtomicBool::new(false),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn set_nifty(&self, value: f64) {
        *self.nifty.lock().unwrap() = value;
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn build(&self) -> Result<Snapshot, MarketError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(MarketError::Build("every source failed".into()));
        }
        let value = *self.nifty.lock().unwrap();
        Ok(Snapshot {
            market_status: MarketStatus::Open,
            indices: vec![IndexReading {
                name: "NIFTY 50".into(),
                symbol: "^NSEI".into(),
                value,
                change_pct: 0.0,
            }],
            top_gainers: vec![],
            top_losers: vec![],
            most_active: vec![],
            news: vec![],
            technical: Default::default(),
            flows: vec![],
            degraded: vec![],
            created_at: Utc::now(),
        })
    }
}

fn clock() -> Arc<FakeClockProvider> {
    Arc::new(FakeClockProvider::new(
        Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap(),
    ))
}

fn coordinator(
    source: Arc<ScriptedSource>,
    clock: Arc<FakeClockProvider>,
) -> Arc<RefreshCoordinator> {
    Arc::new(RefreshCoordinator::new(source, clock, Duration::seconds(60)))
}

fn nifty(snapshot: &Snapshot) -> f64 {
    snapshot.indices[0].value
}

#[tokio::test]
async fn test_fresh_snapshot_served_without_rebuild() {
    let source = ScriptedSource::new(22045.50);
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    // t=0：空槽，同步构建
    let first = cache.get().await.unwrap();
    assert_eq!(first.origin, Origin::Live);
    assert_eq!(nifty(&first.snapshot), 22045.50);
    assert_eq!(source.calls(), 1);

    // t=30：仍然新鲜
    source.set_nifty(22100.00);
    clock.advance(Duration::seconds(30));
    let second = cache.get().await.unwrap();
    assert_eq!(second.origin, Origin::Cache);
    assert!(Arc::ptr_eq(&first.snapshot, &second.snapshot));
    assert_eq!(source.calls(), 1);

    // t=61：过期，重建一次
    clock.advance(Duration::seconds(31));
    let third = cache.get().await.unwrap();
    assert_eq!(third.origin, Origin::Live);
    assert_eq!(nifty(&third.snapshot), 22100.00);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_age_equal_to_threshold_is_stale() {
    let source = ScriptedSource::new(1.0);
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    cache.get().await.unwrap();
    clock.advance(Duration::seconds(60));
    cache.get().await.unwrap();
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_failed_rebuild_serves_stale_snapshot() {
    let source = ScriptedSource::new(22045.50);
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    let installed = cache.get().await.unwrap().installed_at;
    source.set_failing(true);
    clock.advance(Duration::seconds(120));

    let served = cache.get().await.unwrap();
    assert_eq!(served.origin, Origin::Cache);
    assert_eq!(served.installed_at, installed);
    assert_eq!(nifty(&served.snapshot), 22045.50);
    assert_eq!(source.calls(), 2);
    assert_eq!(cache.age(), Some(Duration::seconds(120)));
}

#[tokio::test]
async fn test_empty_cache_and_failed_build_is_unavailable() {
    let source = ScriptedSource::new(0.0);
    source.set_failing(true);
    let cache = coordinator(source.clone(), clock());

    let result = cache.get().await;
    assert!(matches!(result, Err(CacheError::Unavailable(_))));
    assert_eq!(cache.age(), None);

    // 数据源恢复后下一次读取即可成功
    source.set_failing(false);
    assert_eq!(cache.get().await.unwrap().origin, Origin::Live);
}

#[tokio::test]
async fn test_concurrent_stale_reads_coalesce_into_one_rebuild() {
    let source = ScriptedSource::with_delay(1.0, std::time::Duration::from_millis(50));
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    cache.get().await.unwrap();
    clock.advance(Duration::seconds(61));
    source.set_nifty(2.0);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.get().await }));
    }

    let mut live = 0;
    for handle in handles {
        let served = handle.await.unwrap().unwrap();
        assert_eq!(nifty(&served.snapshot), 2.0);
        if served.origin == Origin::Live {
            live += 1;
        }
    }

    assert_eq!(source.calls(), 2);
    assert_eq!(live, 1);
}

#[tokio::test]
async fn test_concurrent_stale_reads_share_one_failed_rebuild() {
    let source = ScriptedSource::with_delay(1.0, std::time::Duration::from_millis(50));
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    let installed = cache.get().await.unwrap().installed_at;
    clock.advance(Duration::seconds(61));
    source.set_failing(true);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.get().await }));
    }

    for handle in handles {
        let served = handle.await.unwrap().unwrap();
        assert_eq!(served.origin, Origin::Cache);
        assert_eq!(served.installed_at, installed);
        assert_eq!(nifty(&served.snapshot), 1.0);
    }

    // 等待者共享同一次失败的重建
    assert_eq!(source.calls(), 2);

    // 之后到达的请求重新尝试
    assert_eq!(cache.get().await.unwrap().origin, Origin::Cache);
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_concurrent_reads_on_empty_cache_share_one_failure() {
    let source = ScriptedSource::with_delay(1.0, std::time::Duration::from_millis(50));
    source.set_failing(true);
    let cache = coordinator(source.clone(), clock());

    let mut handles = Vec::new();
    for _ in 0..5 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move { cache.get().await }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(
            &result,
            Err(CacheError::Unavailable(message)) if message.contains("every source failed")
        ));
    }
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_refresh_replaces_snapshot_and_resets_age() {
    let source = ScriptedSource::new(1.0);
    let clock = clock();
    let cache = coordinator(source.clone(), clock.clone());

    assert_eq!(cache.age(), None);
    cache.refresh().await.unwrap();
    clock.advance(Duration::seconds(45));
    assert_eq!(cache.age(), Some(Duration::seconds(45)));

    source.set_nifty(3.0);
    cache.refresh().await.unwrap();
    assert_eq!(cache.age(), Some(Duration::zero()));
    assert_eq!(nifty(&cache.get().await.unwrap().snapshot), 3.0);
}

#[tokio::test]
async fn test_refresh_loop_survives_failures_and_stops_on_shutdown() {
    let source = ScriptedSource::new(1.0);
    source.set_failing(true);
    let cache = coordinator(source.clone(), clock());

    let handle = cache.spawn_refresh_loop(std::time::Duration::from_millis(20));
    tokio::time::sleep(std::time::Duration::from_millis(110)).await;
    assert!(source.calls() >= 3);
    assert_eq!(cache.age(), None);

    // 数据源恢复后，下一次 tick 填充缓存
    source.set_failing(false);
    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert!(cache.age().is_some());

    handle.shutdown().await;
    let after = source.calls();
    tokio::time::sleep(std::time::Duration::from_millis(60)).await;
    assert_eq!(source.calls(), after);
}

#[tokio::test]
async fn test_dropping_handle_stops_loop() {
    let source = ScriptedSource::new(1.0);
    let cache = coordinator(source.clone(), clock());

    let handle = cache.spawn_refresh_loop(std::time::Duration::from_millis(20));
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    drop(handle);
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    let after = source.calls();
    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
    assert_eq!(source.calls(), after);
}
