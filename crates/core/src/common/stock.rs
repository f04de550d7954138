use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// # Summary
/// 证券标的实体，代表系统关注的特定股票或指数。
///
/// # Invariants
/// - `symbol` 为不含交易所后缀的裸代码 (例如: TCS, ^NSEI)。
/// - `exchange` 为 Yahoo 风格的交易所后缀 (例如: NS, BO)，指数没有后缀。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stock {
    // 裸代码
    pub symbol: String,
    // 交易所后缀 (可选)
    pub exchange: Option<String>,
}

impl Stock {
    /// # Summary
    /// 解析调用方传入的代码，必要时补全默认交易所后缀。
    ///
    /// # Logic
    /// 1. 去除首尾空白并转为大写。
    /// 2. 以 `^` 开头的指数代码不追加后缀。
    /// 3. 已包含 `.` 的代码按最后一个 `.` 拆分出交易所。
    /// 4. 其余情况追加 `default_exchange`。
    ///
    /// # Arguments
    /// * `raw`: 调用方传入的代码。
    /// * `default_exchange`: 默认交易所后缀，例如 `NS`。
    ///
    /// # Returns
    /// 代码为空时返回 None。
    pub fn parse(raw: &str, default_exchange: &str) -> Option<Self> {
        let raw = raw.trim().to_uppercase();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('^') {
            return Some(Self {
                symbol: raw,
                exchange: None,
            });
        }
        match raw.rsplit_once('.') {
            Some((symbol, exchange)) if !symbol.is_empty() && !exchange.is_empty() => {
                Some(Self {
                    symbol: symbol.to_string(),
                    exchange: Some(exchange.to_string()),
                })
            }
            Some(_) => None,
            None => Some(Self {
                symbol: raw,
                exchange: Some(default_exchange.to_uppercase()),
            }),
        }
    }

    /// 返回带交易所后缀的完整代码，用于请求上游数据源。
    pub fn qualified(&self) -> String {
        match &self.exchange {
            Some(exchange) => format!("{}.{}", self.symbol, exchange),
            None => self.symbol.clone(),
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

/// 去掉完整代码中的交易所后缀，用于对外响应。
pub fn display_symbol(qualified: &str) -> &str {
    if qualified.starts_with('^') {
        return qualified;
    }
    match qualified.rsplit_once('.') {
        Some((symbol, _)) if !symbol.is_empty() => symbol,
        _ => qualified,
    }
}

/// # Summary
/// 交易时间周期枚举，定义 K 线的时间跨度。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 5分钟
    Minute5,
    // 1日
    Day1,
    // 1周
    Week1,
}

impl TimeFrame {
    /// Yahoo chart 接口识别的 interval 参数。
    pub fn interval(&self) -> &'static str {
        match self {
            TimeFrame::Minute5 => "5m",
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1wk",
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" | "minute5" => Ok(TimeFrame::Minute5),
            "1d" | "day1" => Ok(TimeFrame::Day1),
            "1wk" | "week1" => Ok(TimeFrame::Week1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interval())
    }
}

/// # Summary
/// 历史行情查询区间，决定 K 线周期与回溯天数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub enum HistoryRange {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "1m")]
    Month,
    #[serde(rename = "6m")]
    HalfYear,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "5y")]
    FiveYears,
}

impl HistoryRange {
    /// 解析查询参数，未知取值回落到一年。
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("1d") => HistoryRange::Day,
            Some("1m") => HistoryRange::Month,
            Some("6m") => HistoryRange::HalfYear,
            Some("5y") => HistoryRange::FiveYears,
            _ => HistoryRange::Year,
        }
    }

    /// 返回 (K 线周期, 回溯天数)。
    pub fn window(&self) -> (TimeFrame, i64) {
        match self {
            HistoryRange::Day => (TimeFrame::Minute5, 60),
            HistoryRange::Month => (TimeFrame::Day1, 30),
            HistoryRange::HalfYear => (TimeFrame::Day1, 180),
            HistoryRange::Year => (TimeFrame::Day1, 365),
            HistoryRange::FiveYears => (TimeFrame::Week1, 5 * 365),
        }
    }
}
