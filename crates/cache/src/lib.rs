//! # `visiontrade-cache` - 聚合快照缓存
//!
//! 单槽快照缓存与刷新协调器：后台周期刷新，读请求在缓存过期时同步重建。

pub mod coordinator;
pub mod slot;
