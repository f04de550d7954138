use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `high` 必须大于或等于 `low`, `open`, `close`。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    // K 线开始时间
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    // 成交量
    pub volume: f64,
}

/// 单个收盘价点，用于图表数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PricePoint {
    pub time: DateTime<Utc>,
    pub close: f64,
}

/// 市场交易状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    Open,
    Closed,
}

/// 指数读数。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexReading {
    #[schema(example = "NIFTY 50")]
    pub name: String,
    #[schema(example = "^NSEI")]
    pub symbol: String,
    #[schema(example = 22045.5)]
    pub value: f64,
    // 相对前一交易日的百分比变化
    #[schema(example = 0.42)]
    pub change_pct: f64,
}

/// # Summary
/// 参与排行的个股行情记录。
///
/// # Invariants
/// - `change == price - previous_price`。
/// - `previous_price == 0` 时 `change_pct == 0`，否则为 `change / previous_price * 100`。
/// - `symbol` 为带交易所后缀的完整代码。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub previous_price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub volume: u64,
}

impl InstrumentRecord {
    /// # Summary
    /// 根据最新价与前收价构造记录，并派生涨跌额与涨跌幅。
    ///
    /// # Arguments
    /// * `symbol`: 完整代码。
    /// * `name`: 展示名称。
    /// * `price`: 最新价。
    /// * `previous_price`: 前收价。
    /// * `volume`: 成交量。
    ///
    /// # Returns
    /// 满足派生不变量的记录。
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        previous_price: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            price,
            previous_price,
            change: price - previous_price,
            change_pct: percent_change(price, previous_price),
            volume,
        }
    }

    /// # Summary
    /// 从日线序列推导记录。
    ///
    /// # Logic
    /// 1. 最新价取最后一根 K 线收盘价。
    /// 2. 前收价取倒数第二根，不足两根时等于最新价。
    /// 3. 成交量取最后一根 K 线。
    ///
    /// # Returns
    /// 序列为空时返回 None。
    pub fn from_candles(
        symbol: impl Into<String>,
        name: impl Into<String>,
        candles: &[Candle],
    ) -> Option<Self> {
        let last = candles.last()?;
        let (price, previous) = last_two_closes(candles)?;
        Some(Self::new(
            symbol,
            name,
            price,
            previous,
            volume_to_u64(last.volume),
        ))
    }
}

/// 相对前值的百分比变化，前值为 0 时返回 0。
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

/// # Summary
/// 取序列的最新收盘价与前一收盘价。
///
/// # Returns
/// `(最新, 前一)`；只有一根 K 线时前一收盘价等于最新价，序列为空时返回 None。
pub fn last_two_closes(candles: &[Candle]) -> Option<(f64, f64)> {
    let current = candles.last()?.close;
    let previous = candles
        .len()
        .checked_sub(2)
        .and_then(|i| candles.get(i))
        .map_or(current, |c| c.close);
    Some((current, previous))
}

/// 上游成交量为浮点数，非法值按 0 处理。
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn volume_to_u64(volume: f64) -> u64 {
    if volume.is_finite() && volume > 0.0 {
        volume.round().min(u64::MAX as f64) as u64
    } else {
        0
    }
}

/// 新闻条目。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    #[schema(example = "Yahoo Finance")]
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MacdSignal {
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

/// # Summary
/// 技术指标块。
///
/// # Invariants
/// - `Default` 为全零值块，数据源失败时以此替代。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: Option<MacdSignal>,
    pub sma_50: f64,
    pub sma_200: f64,
    pub support: f64,
    pub resistance: f64,
    pub prediction: Option<Direction>,
    pub confidence: f64,
    pub volatility: f64,
}

/// 外资 (FII) 与内资机构 (DII) 单日净流入，单位千万卢比。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FlowEntry {
    #[schema(example = "Mar 01")]
    pub date: String,
    #[serde(rename = "FII")]
    pub fii: f64,
    #[serde(rename = "DII")]
    pub dii: f64,
}

/// 快照中的各个分区，用于标记降级情况。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Indices,
    Instruments,
    News,
    Indicators,
    Flows,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Indices,
        Section::Instruments,
        Section::News,
        Section::Indicators,
        Section::Flows,
    ];

    /// 数据来自外部网络上游 (而非本地生成) 的分区。
    pub fn is_upstream(self) -> bool {
        matches!(self, Section::Indices | Section::Instruments | Section::News)
    }
}

/// # Summary
/// 一次完整聚合的不可变行情快照。
///
/// # Invariants
/// - 构造后不再修改，只会被整体替换。
/// - `degraded` 中列出的分区为空列表或零值块。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub market_status: MarketStatus,
    pub indices: Vec<IndexReading>,
    pub top_gainers: Vec<InstrumentRecord>,
    pub top_losers: Vec<InstrumentRecord>,
    pub most_active: Vec<InstrumentRecord>,
    pub news: Vec<NewsItem>,
    pub technical: TechnicalIndicators,
    pub flows: Vec<FlowEntry>,
    pub degraded: Vec<Section>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Hold,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Medium,
    High,
}

/// 价格预测结果 (占位数据源生成，不保证准确性)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub predicted_price: f64,
    pub confidence: f64,
    pub recommendation: Recommendation,
    pub timeframe: String,
    pub target: f64,
    pub stop_loss: f64,
    pub risk_level: RiskLevel,
    pub volatility: f64,
}

/// 单只股票的详情，供 `/api/stock/{symbol}` 使用。
#[derive(Debug, Clone)]
pub struct StockDetail {
    pub record: InstrumentRecord,
    pub chart: Vec<PricePoint>,
    pub prediction: Prediction,
    pub technical: TechnicalIndicators,
}

/// 目录中的可检索标的。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    #[schema(example = "TCS")]
    pub symbol: String,
    #[schema(example = "Tata Consultancy Services")]
    pub name: String,
    #[schema(example = "NSE")]
    pub exchange: String,
}

/// 行业板块表现。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SectorPerformance {
    pub name: String,
    pub value: f64,
    pub change: f64,
}
