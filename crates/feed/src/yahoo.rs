use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use visiontrade_core::common::{Stock, TimeFrame};
use visiontrade_core::market::entity::Candle;
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::MarketDataProvider;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// # Summary
/// Yahoo Finance 行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，单次请求带超时。
#[derive(Clone)]
pub struct YahooProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// # Summary
    /// 创建一个新的 YahooProvider 实例。
    ///
    /// # Logic
    /// 1. 配置请求超时。
    /// 2. 设置伪装浏览器 Header (User-Agent) 以减少被拦截风险。
    /// 3. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `timeout`: 单次 HTTP 请求超时。
    ///
    /// # Returns
    /// 客户端构建失败时返回 `MarketError::Network`。
    pub fn new(timeout: Duration) -> Result<Self, MarketError> {
        Self::with_base_url(CHART_URL, timeout)
    }

    /// 指定 chart 接口地址，便于测试替换上游。
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, MarketError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
            ),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// # Summary
/// Yahoo API 响应顶层结构。
///
/// # Invariants
/// - 映射自 Yahoo v8 chart 接口。
#[derive(Deserialize, Debug)]
pub(crate) struct YahooResponse {
    chart: YahooChart,
}

#[derive(Deserialize, Debug)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Deserialize, Debug)]
struct YahooError {
    description: String,
}

#[derive(Deserialize, Debug)]
struct YahooResult {
    // 无成交的区间 Yahoo 不返回 timestamp 字段
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Deserialize, Debug)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

/// # Summary
/// Yahoo API 原始报价数据，缺失值以 null 表示。
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct YahooQuote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

/// # Summary
/// 将 chart 响应转换为 K 线列表。
///
/// # Logic
/// 1. 上游返回 error 对象时映射为 `MarketError::NotFound`。
/// 2. 逐个时间戳对齐 OHLC，收盘价缺失的点被跳过。
/// 3. 开高低缺失时以收盘价补齐，成交量缺失按 0 处理。
pub(crate) fn parse_chart(symbol: &str, json: YahooResponse) -> Result<Vec<Candle>, MarketError> {
    if let Some(err) = json.chart.error {
        return Err(MarketError::NotFound(format!("{}: {}", symbol, err.description)));
    }

    let result = json
        .chart
        .result
        .and_then(|mut r| r.pop())
        .ok_or_else(|| MarketError::NotFound(symbol.to_string()))?;

    let quote = result
        .indicators
        .quote
        .first()
        .ok_or_else(|| MarketError::Parse(format!("{}: no quote data", symbol)))?;

    let pick = |list: &[Option<f64>], i: usize| list.get(i).copied().flatten();

    let mut candles = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = pick(&quote.close, i) else {
            continue;
        };
        let Some(time) = Utc.timestamp_opt(ts, 0).single() else {
            continue;
        };
        candles.push(Candle {
            time,
            open: pick(&quote.open, i).unwrap_or(close),
            high: pick(&quote.high, i).unwrap_or(close),
            low: pick(&quote.low, i).unwrap_or(close),
            close,
            volume: pick(&quote.volume, i).unwrap_or(0.0),
        });
    }

    if candles.is_empty() {
        return Err(MarketError::NotFound(symbol.to_string()));
    }
    Ok(candles)
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    /// # Summary
    /// 从 Yahoo Finance 抓取 K 线历史数据。
    ///
    /// # Logic
    /// 1. 使用完整代码 (含交易所后缀) 构建 chart URL。
    /// 2. 以 period1 / period2 / interval 发起请求。
    /// 3. 非 2xx 状态码：404 映射为 NotFound，其余为 Network。
    /// 4. 解析嵌套 JSON 并交给 `parse_chart`。
    async fn fetch_candles(
        &self,
        stock: &Stock,
        timeframe: TimeFrame,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, MarketError> {
        let symbol = stock.qualified();
        let url = format!("{}/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", start.timestamp().to_string()),
                ("period2", end.timestamp().to_string()),
                ("interval", timeframe.interval().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketError::Timeout(format!("{}: {}", symbol, e))
                } else {
                    MarketError::Network(e.to_string())
                }
            })?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketError::NotFound(symbol));
        }
        if !resp.status().is_success() {
            return Err(MarketError::Network(format!("HTTP {}", resp.status())));
        }

        let json: YahooResponse = resp
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        parse_chart(&symbol, json)
    }
}
