//! # 占位数据源
//!
//! 技术指标、机构资金流向与价格预测目前没有真实上游，
//! 这里用随机数与固定数据生成，满足与真实数据源相同的端口契约。

use async_trait::async_trait;
use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use visiontrade_core::common::{TimeProvider, round_to};
use visiontrade_core::market::entity::{
    Direction, FlowEntry, InstrumentRecord, MacdSignal, Prediction, Recommendation, RiskLevel,
    TechnicalIndicators,
};
use visiontrade_core::market::error::MarketError;
use visiontrade_core::market::port::{FlowSource, IndicatorSource, Predictor};

fn seeded(seed: Option<u64>) -> Mutex<StdRng> {
    Mutex::new(match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    })
}

/// # Summary
/// 随机技术指标生成器。
///
/// # Invariants
/// - RSI ∈ [60, 80)，置信度 ∈ [70, 90)，波动率 ∈ [0, 5)。
pub struct SyntheticIndicators {
    rng: Mutex<StdRng>,
}

impl SyntheticIndicators {
    /// `seed` 为 None 时使用系统熵源。
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded(seed) }
    }

    /// 同步生成一组指标，供股票详情复用。
    pub fn generate(&self) -> TechnicalIndicators {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        TechnicalIndicators {
            rsi: round_to(60.0 + rng.r#gen::<f64>() * 20.0, 1),
            macd: Some(if rng.r#gen::<f64>() > 0.4 {
                MacdSignal::Bullish
            } else {
                MacdSignal::Bearish
            }),
            sma_50: round_to(18000.0 + rng.r#gen::<f64>() * 1000.0, 2),
            sma_200: round_to(17500.0 + rng.r#gen::<f64>() * 1000.0, 2),
            support: round_to(17800.0 + rng.r#gen::<f64>() * 200.0, 2),
            resistance: round_to(18500.0 + rng.r#gen::<f64>() * 200.0, 2),
            prediction: Some(if rng.r#gen::<f64>() > 0.3 {
                Direction::Up
            } else {
                Direction::Down
            }),
            confidence: round_to(70.0 + rng.r#gen::<f64>() * 20.0, 1),
            volatility: round_to(rng.r#gen::<f64>() * 5.0, 2),
        }
    }
}

#[async_trait]
impl IndicatorSource for SyntheticIndicators {
    async fn fetch_indicators(&self) -> Result<TechnicalIndicators, MarketError> {
        Ok(self.generate())
    }
}

/// # Summary
/// 固定的 FII/DII 资金流向表，日期为最近六天。
pub struct SyntheticFlows {
    clock: Arc<dyn TimeProvider>,
}

impl SyntheticFlows {
    const TABLE: [(f64, f64); 6] = [
        (1250.0, -850.0),
        (-980.0, 1420.0),
        (2100.0, 680.0),
        (-1560.0, 2340.0),
        (1890.0, -450.0),
        (2340.0, 1120.0),
    ];

    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl FlowSource for SyntheticFlows {
    /// # Logic
    /// 第 i 条 (0..6) 的日期为 `now - (6 - i)` 天，格式 `%b %d`。
    async fn fetch_flows(&self) -> Result<Vec<FlowEntry>, MarketError> {
        let now = self.clock.now();
        Ok(Self::TABLE
            .iter()
            .zip((1..=6i64).rev())
            .map(|(&(fii, dii), days_ago)| FlowEntry {
                date: (now - Duration::days(days_ago)).format("%b %d").to_string(),
                fii,
                dii,
            })
            .collect())
    }
}

/// # Summary
/// 随机价格预测器。
///
/// # Invariants
/// - 预测价 ∈ price × [0.97, 1.06)，目标价 ∈ price × [1.02, 1.10)，止损价 ∈ price × (0.93, 0.97]。
/// - 波动率 < 3% 为 Medium，否则为 High。
pub struct RandomPredictor {
    rng: Mutex<StdRng>,
}

impl RandomPredictor {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded(seed) }
    }
}

#[async_trait]
impl Predictor for RandomPredictor {
    async fn predict(&self, record: &InstrumentRecord) -> Result<Prediction, MarketError> {
        if record.price <= 0.0 {
            return Err(MarketError::NotFound(record.symbol.clone()));
        }
        let price = record.price;
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        let volatility: f64 = rng.gen_range(0.01..0.05);
        let recommendation = if rng.r#gen::<f64>() > 0.4 {
            Recommendation::Buy
        } else if rng.r#gen::<f64>() > 0.3 {
            Recommendation::Hold
        } else {
            Recommendation::Sell
        };

        Ok(Prediction {
            predicted_price: round_to(price * (1.0 + rng.gen_range(-0.03..0.06)), 2),
            confidence: round_to(65.0 + rng.r#gen::<f64>() * 25.0, 1),
            recommendation,
            timeframe: "1 week".to_string(),
            target: round_to(price * (1.0 + rng.gen_range(0.02..0.1)), 2),
            stop_loss: round_to(price * (1.0 - rng.gen_range(0.03..0.07)), 2),
            risk_level: if volatility < 0.03 {
                RiskLevel::Medium
            } else {
                RiskLevel::High
            },
            volatility: round_to(volatility * 100.0, 2),
        })
    }
}
