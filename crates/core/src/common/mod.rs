pub mod stock;
pub mod time;

pub use stock::{HistoryRange, Stock, TimeFrame, display_symbol};
pub use time::{FakeClockProvider, RealTimeProvider, TimeProvider};

/// 按指定小数位四舍五入，行情展示统一保留两位。
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
