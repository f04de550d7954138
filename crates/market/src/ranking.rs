use visiontrade_core::market::entity::InstrumentRecord;

/// 每个排行榜保留的条数。
pub const RANKING_DEPTH: usize = 6;

/// 同一批记录派生出的三张排行榜。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rankings {
    pub top_gainers: Vec<InstrumentRecord>,
    pub top_losers: Vec<InstrumentRecord>,
    pub most_active: Vec<InstrumentRecord>,
}

/// # Summary
/// 将一批个股记录排成涨幅榜、跌幅榜与成交活跃榜。
///
/// # Logic
/// 1. 涨幅榜：按 `change_pct` 降序。
/// 2. 跌幅榜：按 `change_pct` 升序。
/// 3. 活跃榜：按 `volume` 降序。
/// 4. 均为稳定排序，并列时保持输入顺序，最后截断到 `depth`。
///
/// # Arguments
/// * `records`: 未排序的记录。
/// * `depth`: 每个榜单的最大条数。
pub fn rank(records: &[InstrumentRecord], depth: usize) -> Rankings {
    let mut gainers = records.to_vec();
    gainers.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
    gainers.truncate(depth);

    let mut losers = records.to_vec();
    losers.sort_by(|a, b| a.change_pct.total_cmp(&b.change_pct));
    losers.truncate(depth);

    let mut active = records.to_vec();
    active.sort_by(|a, b| b.volume.cmp(&a.volume));
    active.truncate(depth);

    Rankings {
        top_gainers: gainers,
        top_losers: losers,
        most_active: active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, previous: f64, price: f64, volume: u64) -> InstrumentRecord {
        InstrumentRecord::new(format!("{}.NS", symbol), symbol, price, previous, volume)
    }

    fn symbols(list: &[InstrumentRecord]) -> Vec<&str> {
        list.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_rankings() {
        let rankings = rank(&[], RANKING_DEPTH);
        assert_eq!(rankings, Rankings::default());
    }

    #[test]
    fn test_orderings_and_depth() {
        let records: Vec<_> = (0..10u32)
            .map(|i| {
                let pct = f64::from(i) - 4.0;
                record(&format!("S{}", i), 100.0, 100.0 + pct, u64::from(10 - i) * 100)
            })
            .collect();
        let rankings = rank(&records, RANKING_DEPTH);

        assert_eq!(rankings.top_gainers.len(), RANKING_DEPTH);
        assert_eq!(rankings.top_losers.len(), RANKING_DEPTH);
        assert_eq!(rankings.most_active.len(), RANKING_DEPTH);

        let gainers = &rankings.top_gainers;
        let losers = &rankings.top_losers;
        let active = &rankings.most_active;
        assert!(gainers.windows(2).all(|w| w[0].change_pct >= w[1].change_pct));
        assert!(losers.windows(2).all(|w| w[0].change_pct <= w[1].change_pct));
        assert!(active.windows(2).all(|w| w[0].volume >= w[1].volume));

        assert_eq!(rankings.top_gainers[0].name, "S9");
        assert_eq!(rankings.top_losers[0].name, "S0");
        assert_eq!(rankings.most_active[0].name, "S0");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            record("A", 100.0, 101.0, 50),
            record("B", 100.0, 101.0, 50),
            record("C", 100.0, 99.0, 70),
        ];
        let rankings = rank(&records, RANKING_DEPTH);
        assert_eq!(symbols(&rankings.top_gainers), vec!["A", "B", "C"]);
        assert_eq!(symbols(&rankings.top_losers), vec!["C", "A", "B"]);
        assert_eq!(symbols(&rankings.most_active), vec!["C", "A", "B"]);
    }

    #[test]
    fn test_zero_previous_price_ranks_as_flat() {
        let records = vec![record("Z", 0.0, 50.0, 1), record("U", 100.0, 110.0, 2)];
        let rankings = rank(&records, 1);
        assert_eq!(symbols(&rankings.top_gainers), vec!["U"]);
        assert_eq!(symbols(&rankings.top_losers), vec!["Z"]);
    }
}
