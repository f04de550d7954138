use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// # Summary
/// 聚合缓存参数。
///
/// # Invariants
/// - `staleness_secs` 决定请求路径是否同步重建快照。
/// - `source_timeout_secs` 约束单个数据源的一次抓取耗时。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub refresh_interval_secs: u64,
    pub staleness_secs: u64,
    pub source_timeout_secs: u64,
}

impl CacheConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.staleness_secs).unwrap_or(i64::MAX))
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    // 未带后缀的代码默认归属的交易所
    pub default_exchange: String,
    pub news_url: String,
    pub news_source: String,
    pub news_limit: usize,
    // 参与涨跌幅排行的标的 (裸代码)
    pub watchlist: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5001,
            },
            cache: CacheConfig {
                refresh_interval_secs: 60,
                staleness_secs: 60,
                source_timeout_secs: 10,
            },
            feed: FeedConfig {
                default_exchange: "NS".to_string(),
                news_url: "https://finance.yahoo.com/rss/topstories".to_string(),
                news_source: "Yahoo Finance".to_string(),
                news_limit: 8,
                watchlist: [
                    "TCS",
                    "INFY",
                    "RELIANCE",
                    "ICICIBANK",
                    "HDFCBANK",
                    "SBIN",
                    "ITC",
                    "HCLTECH",
                    "WIPRO",
                    "TATAMOTORS",
                    "BHARTIARTL",
                    "LT",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
        }
    }
}
