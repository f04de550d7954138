use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use visiontrade_core::market::entity::Snapshot;

/// 槽中保存的快照及其写入时间。
#[derive(Debug)]
pub struct CachedSnapshot {
    pub snapshot: Arc<Snapshot>,
    pub installed_at: DateTime<Utc>,
}

/// # Summary
/// 单条目快照缓存槽。
///
/// # Invariants
/// - 至多保存一份快照，整体替换，不做原地修改。
/// - 读者拿到的是 `Arc` 克隆，写入期间不会观察到半成品。
/// - 写入只发生在 crate 内部的刷新协调器中。
#[derive(Default)]
pub struct SnapshotSlot {
    current: RwLock<Option<Arc<CachedSnapshot>>>,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取当前快照，槽为空时返回 None。
    pub fn load(&self) -> Option<Arc<CachedSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// # Summary
    /// 用新快照替换槽中内容。
    ///
    /// # Returns
    /// 刚写入的条目，供调用方直接返回给请求者。
    pub(crate) fn install(&self, snapshot: Snapshot, at: DateTime<Utc>) -> Arc<CachedSnapshot> {
        let entry = Arc::new(CachedSnapshot {
            snapshot: Arc::new(snapshot),
            installed_at: at,
        });
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Some(Arc::clone(&entry));
        entry
    }
}
