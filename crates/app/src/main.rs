use std::sync::Arc;

use config::{Config, ConfigError, Environment, File};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use visiontrade_api::server::{AppState, start_server};
use visiontrade_cache::coordinator::RefreshCoordinator;
use visiontrade_core::common::{RealTimeProvider, TimeProvider};
use visiontrade_core::config::AppConfig;
use visiontrade_core::market::port::MarketDataProvider;
use visiontrade_feed::news::RssNewsSource;
use visiontrade_feed::synthetic::{RandomPredictor, SyntheticFlows, SyntheticIndicators};
use visiontrade_feed::yahoo::YahooProvider;
use visiontrade_market::builder::{SnapshotBuilder, SnapshotSources};
use visiontrade_market::catalog::Catalog;
use visiontrade_market::sources::{IndexSpec, ProviderIndexSource, WatchlistSource};
use visiontrade_market::stock::StockService;

/// 可选配置文件 (不含扩展名时按 toml/yaml/json 依次查找)。
const CONFIG_FILE: &str = "config/visiontrade";

/// # Summary
/// 分层加载配置。
///
/// # Logic
/// 1. 以 `AppConfig::default()` 为底。
/// 2. 叠加可选的配置文件。
/// 3. 叠加 `VISIONTRADE__` 前缀的环境变量，例如 `VISIONTRADE__SERVER__PORT=8080`。
///    `VISIONTRADE__FEED__WATCHLIST` 以逗号分隔。
fn load_config(file: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        .add_source(File::with_name(file).required(false))
        .add_source(
            Environment::with_prefix("VISIONTRADE")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("feed.watchlist")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体实现组件并通过 Arc<dyn Trait> 注入到协调器与 HTTP 层。
///
/// # Logic
/// 1. 初始化全局日志与 TLS 加密后端。
/// 2. 加载配置。
/// 3. 实例化基础设施层（Yahoo 行情、RSS 新闻、占位数据源）。
/// 4. 实例化领域实现层（分区数据源、快照构建器、股票服务）。
/// 5. 构造刷新协调器并启动后台刷新循环。
/// 6. 启动 HTTP 服务，收到 Ctrl-C 后依次关闭服务与刷新循环。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 初始化日志
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        info!("TLS crypto provider already installed");
    }

    // 2. 加载配置
    let config = load_config(CONFIG_FILE)?;
    info!("VisionTrade starting with {:?}", config);

    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let timeout = config.cache.source_timeout();

    // 3. 实例化基础设施层
    let provider: Arc<dyn MarketDataProvider> = Arc::new(YahooProvider::new(timeout)?);
    let news = Arc::new(RssNewsSource::new(
        config.feed.news_url.clone(),
        config.feed.news_source.clone(),
        config.feed.news_limit,
        timeout,
    )?);
    let indicators = Arc::new(SyntheticIndicators::new(None));
    let catalog = Arc::new(Catalog::builtin());

    // 4. 实例化领域实现层
    let sources = SnapshotSources {
        indices: Arc::new(ProviderIndexSource::new(
            provider.clone(),
            clock.clone(),
            IndexSpec::defaults(),
        )),
        instruments: Arc::new(WatchlistSource::new(
            provider.clone(),
            clock.clone(),
            catalog.clone(),
            &config.feed.watchlist,
            &config.feed.default_exchange,
        )),
        news,
        indicators: indicators.clone(),
        flows: Arc::new(SyntheticFlows::new(clock.clone())),
    };
    let builder = Arc::new(SnapshotBuilder::new(sources, clock.clone(), timeout));
    let stocks = Arc::new(StockService::new(
        provider,
        indicators,
        Arc::new(RandomPredictor::new(None)),
        catalog,
        clock.clone(),
        config.feed.default_exchange.clone(),
    ));

    // 5. 刷新协调器与后台循环
    let coordinator = Arc::new(RefreshCoordinator::new(
        builder,
        clock.clone(),
        config.cache.staleness(),
    ));
    let refresh = coordinator.spawn_refresh_loop(config.cache.refresh_interval());

    // 6. 启动 HTTP 服务，挂起直到外部退出信号
    let state = AppState {
        market: coordinator,
        stocks,
        clock,
    };
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let served = start_server(state, &bind_addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received. Exiting...");
    })
    .await;

    refresh.shutdown().await;
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config("does/not/exist/visiontrade").unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.cache.staleness_secs, 60);
        assert_eq!(config.feed.watchlist.len(), 12);
    }

    #[test]
    fn test_file_overrides_only_given_keys() {
        let path = std::env::temp_dir().join(format!("visiontrade-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nport = 6001\n\n[cache]\nstaleness_secs = 30\n").unwrap();

        let config = load_config(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 6001);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.staleness_secs, 30);
        assert_eq!(config.cache.refresh_interval_secs, 60);
    }
}
