use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理网络、解析、超时及数据缺失等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 单个数据源的失败由快照构建器就地降级，不直接透传给请求方。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 数据解析错误，如 JSON / XML 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 请求的数据未找到 (404 或内容为空)
    #[error("Data not found: {0}")]
    NotFound(String),
    // 数据源在限定时间内未返回
    #[error("Source timed out: {0}")]
    Timeout(String),
    // 所有分区均构建失败，快照不可用
    #[error("Snapshot build failed: {0}")]
    Build(String),
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}
