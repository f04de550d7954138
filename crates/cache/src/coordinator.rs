use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use visiontrade_core::cache::error::CacheError;
use visiontrade_core::cache::port::{Origin, Served, SnapshotCache};
use visiontrade_core::common::TimeProvider;
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::SnapshotSource;

use crate::slot::{CachedSnapshot, SnapshotSlot};

/// # Summary
/// 刷新协调器：持有唯一的快照槽，决定读请求是直接命中还是同步重建。
///
/// # Invariants
/// - 槽只在 `rebuild` 中被写入，且写入时必须持有 `refresh_lock`。
/// - 并发的重建请求被合并：等待期间若已有一次重建结束 (无论成败)，
///   等待者直接共享该结果，不再发起新的构建。
/// - `attempts` 只在持有 `refresh_lock` 时递增。
/// - 重建失败不会清空已有快照。
pub struct RefreshCoordinator {
    source: Arc<dyn SnapshotSource>,
    clock: Arc<dyn TimeProvider>,
    staleness: Duration,
    slot: SnapshotSlot,
    refresh_lock: Mutex<LastAttempt>,
    attempts: AtomicU64,
}

/// 最近一次重建的失败信息，由 `refresh_lock` 保护。
#[derive(Default)]
struct LastAttempt {
    failure: Option<String>,
}

impl RefreshCoordinator {
    /// # Arguments
    /// * `source`: 快照构建器。
    /// * `clock`: 新鲜度判断使用的时钟。
    /// * `staleness`: 快照在该年龄及以上视为过期。
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        clock: Arc<dyn TimeProvider>,
        staleness: Duration,
    ) -> Self {
        Self {
            source,
            clock,
            staleness,
            slot: SnapshotSlot::new(),
            refresh_lock: Mutex::new(LastAttempt::default()),
            attempts: AtomicU64::new(0),
        }
    }

    fn is_fresh(&self, cached: &CachedSnapshot) -> bool {
        self.clock.now() - cached.installed_at < self.staleness
    }

    fn served(cached: &CachedSnapshot, origin: Origin) -> Served {
        Served {
            snapshot: Arc::clone(&cached.snapshot),
            origin,
            installed_at: cached.installed_at,
        }
    }

    /// 调用方必须已持有 `refresh_lock`，并传入其保护的 `LastAttempt`。
    async fn rebuild(&self, last: &mut LastAttempt) -> Result<Arc<CachedSnapshot>, MarketError> {
        let result = self
            .source
            .build()
            .await
            .map(|snapshot| self.slot.install(snapshot, self.clock.now()));
        last.failure = result.as_ref().err().map(ToString::to_string);
        self.attempts.fetch_add(1, Ordering::AcqRel);
        result
    }

    /// # Summary
    /// 无条件重建一次快照，供后台循环调用。
    ///
    /// # Returns
    /// 构建失败时返回错误，槽保持原状。
    pub async fn refresh(&self) -> Result<(), MarketError> {
        let mut last = self.refresh_lock.lock().await;
        self.rebuild(&mut last).await.map(|_| ())
    }

    /// # Summary
    /// 启动后台周期刷新任务。
    ///
    /// # Logic
    /// 1. 首个 tick 立即触发，用于启动时预热缓存。
    /// 2. 每个 tick 调用 `refresh`，失败只记录日志，等待下一个 tick。
    /// 3. 收到关闭信号或句柄被丢弃时退出循环。
    ///
    /// # Arguments
    /// * `period`: 刷新周期。
    ///
    /// # Returns
    /// 控制该任务生命周期的 `RefreshHandle`。
    pub fn spawn_refresh_loop(self: &Arc<Self>, period: std::time::Duration) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let coordinator = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Refresh loop started, period {:?}", period);

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        // 发送端被丢弃同样视为关闭
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        match coordinator.refresh().await {
                            Ok(()) => debug!("Scheduled refresh installed a new snapshot"),
                            Err(e) => error!("Scheduled refresh failed: {}", e),
                        }
                    }
                }
            }

            info!("Refresh loop stopped");
        });

        RefreshHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

#[async_trait]
impl SnapshotCache for RefreshCoordinator {
    /// # Summary
    /// 读取快照，必要时同步重建。
    ///
    /// # Logic
    /// 1. 槽中快照新鲜：直接返回，不加锁。
    /// 2. 否则记下当前重建次数并获取刷新锁；拿到锁后若快照已被其他任务刷新则直接返回。
    /// 3. 等待期间已有重建失败：共享该结果，返回旧快照或 `Unavailable`。
    /// 4. 仍然过期或为空：调用构建器重建。
    /// 5. 重建失败：有旧快照则返回旧快照，否则返回 `Unavailable`。
    async fn get(&self) -> Result<Served, CacheError> {
        if let Some(cached) = self.slot.load().filter(|c| self.is_fresh(c)) {
            debug!("Cache hit, snapshot from {}", cached.installed_at);
            return Ok(Self::served(&cached, Origin::Cache));
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last = self.refresh_lock.lock().await;
        let current = self.slot.load();
        if let Some(cached) = current.as_ref().filter(|c| self.is_fresh(c)) {
            debug!("Snapshot refreshed while waiting for the refresh lock");
            return Ok(Self::served(cached, Origin::Cache));
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            return match current {
                Some(stale) => {
                    debug!(
                        "Rebuild attempt finished while waiting, serving snapshot from {}",
                        stale.installed_at
                    );
                    Ok(Self::served(&stale, Origin::Cache))
                }
                None => Err(CacheError::Unavailable(
                    last.failure
                        .clone()
                        .unwrap_or_else(|| "snapshot rebuild failed".to_string()),
                )),
            };
        }

        match self.rebuild(&mut last).await {
            Ok(fresh) => {
                info!("On-demand rebuild installed a new snapshot");
                Ok(Self::served(&fresh, Origin::Live))
            }
            Err(e) => match current {
                Some(stale) => {
                    warn!(
                        "On-demand rebuild failed, serving snapshot from {}: {}",
                        stale.installed_at, e
                    );
                    Ok(Self::served(&stale, Origin::Cache))
                }
                None => {
                    error!("On-demand rebuild failed with an empty cache: {}", e);
                    Err(CacheError::Unavailable(e.to_string()))
                }
            },
        }
    }

    fn age(&self) -> Option<Duration> {
        self.slot
            .load()
            .map(|cached| self.clock.now() - cached.installed_at)
    }
}

/// # Summary
/// 后台刷新任务的句柄。
///
/// 丢弃句柄会关闭信号通道，循环在下一次检查时退出。
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// 发送关闭信号并等待循环退出。
    pub async fn shutdown(self) {
        if self.shutdown.send(true).is_err() {
            debug!("Refresh loop already stopped");
        }
        if let Err(e) = self.task.await {
            error!("Refresh loop terminated abnormally: {}", e);
        }
    }
}
