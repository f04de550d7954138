use crate::cache::error::CacheError;
use crate::market::entity::Snapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 快照的来源：命中缓存或本次请求实时构建。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Live,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cache => "cache",
            Origin::Live => "live",
        }
    }
}

/// 一次读取返回的快照及其元数据。
#[derive(Debug, Clone)]
pub struct Served {
    pub snapshot: Arc<Snapshot>,
    pub origin: Origin,
    // 快照写入缓存槽的时间
    pub installed_at: DateTime<Utc>,
}

/// # Summary
/// 聚合快照缓存接口 (Port)，供 HTTP 层读取。
///
/// # Invariants
/// - `get` 不会因为单次刷新失败而丢弃已有快照。
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    /// # Summary
    /// 读取当前快照，过期或为空时同步重建。
    ///
    /// # Returns
    /// 缓存为空且重建失败时返回 `CacheError::Unavailable`。
    async fn get(&self) -> Result<Served, CacheError>;

    /// 当前快照的年龄，缓存为空时返回 None。
    fn age(&self) -> Option<chrono::Duration>;
}
