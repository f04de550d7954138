use thiserror::Error;

/// # Summary
/// 聚合缓存错误枚举。
///
/// # Invariants
/// - 只有在缓存槽为空且同步重建也失败时才会产生。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    // 缓存为空且同步重建失败
    #[error("Market data unavailable: {0}")]
    Unavailable(String),
}
