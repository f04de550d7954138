use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use visiontrade_core::common::{Stock, TimeFrame};
use visiontrade_core::market::port::{MarketDataProvider, NewsSource};
use visiontrade_feed::news::RssNewsSource;
use visiontrade_feed::yahoo::YahooProvider;

fn install_crypto() {
    // 同一进程内重复安装会返回 Err
    let _installed = rustls::crypto::ring::default_provider().install_default();
}

/// # Summary
/// 雅虎财经行情获取的集成测试 (需要外网)。
///
/// # Logic
/// 1. 初始化 YahooProvider。
/// 2. 抓取 TCS.NS 过去 7 天的日线数据。
/// 3. 断言数据非空且返回成功。
#[tokio::test]
#[ignore = "requires network access to Yahoo Finance"]
async fn test_yahoo_real_fetch() -> anyhow::Result<()> {
    install_crypto();
    let provider = YahooProvider::new(Duration::from_secs(10))?;
    let stock = Stock::parse("TCS", "NS").ok_or_else(|| anyhow::anyhow!("bad symbol"))?;
    let end = Utc::now();
    let start = end - ChronoDuration::days(7);

    let candles = provider
        .fetch_candles(&stock, TimeFrame::Day1, start, end)
        .await?;
    assert!(!candles.is_empty(), "Candles list should not be empty");

    println!("Successfully fetched {} candles for {}", candles.len(), stock);
    Ok(())
}

#[tokio::test]
#[ignore = "requires network access to Yahoo Finance"]
async fn test_yahoo_rss_fetch() -> anyhow::Result<()> {
    install_crypto();
    let source = RssNewsSource::new(
        "https://finance.yahoo.com/rss/topstories",
        "Yahoo Finance",
        8,
        Duration::from_secs(10),
    )?;
    let items = source.fetch_news().await?;
    assert!(items.len() <= 8);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() -> anyhow::Result<()> {
    install_crypto();
    // 端口 9 (discard) 在本机通常无人监听，连接会被立即拒绝
    let provider =
        YahooProvider::with_base_url("http://127.0.0.1:9/chart", Duration::from_secs(2))?;
    let stock = Stock::parse("TCS", "NS").ok_or_else(|| anyhow::anyhow!("bad symbol"))?;
    let end = Utc::now();
    let result = provider
        .fetch_candles(&stock, TimeFrame::Day1, end - ChronoDuration::days(7), end)
        .await;
    assert!(result.is_err());
    Ok(())
}
