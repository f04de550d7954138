use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Utc, Weekday};
use visiontrade_core::market::entity::MarketStatus;

// IST = UTC+05:30
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// # Summary
/// 根据 NSE 常规交易时段判断市场状态。
///
/// # Logic
/// 1. 将时间换算为印度标准时间。
/// 2. 周六、周日休市。
/// 3. 工作日 09:15 (含) 至 15:30 (不含) 为开市。
///
/// 不考虑交易所节假日。
pub fn market_status(now: DateTime<Utc>) -> MarketStatus {
    let Some(ist) = FixedOffset::east_opt(IST_OFFSET_SECS) else {
        return MarketStatus::Closed;
    };
    let local = now.with_timezone(&ist);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return MarketStatus::Closed;
    }

    let (Some(open), Some(close)) = (
        NaiveTime::from_hms_opt(9, 15, 0),
        NaiveTime::from_hms_opt(15, 30, 0),
    ) else {
        return MarketStatus::Closed;
    };
    let time = local.time();
    if time >= open && time < close {
        MarketStatus::Open
    } else {
        MarketStatus::Closed
    }
}
