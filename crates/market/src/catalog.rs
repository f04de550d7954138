use visiontrade_core::common::Stock;
use visiontrade_core::market::entity::{CatalogEntry, SectorPerformance};

/// 搜索接口的默认结果上限。
pub const SEARCH_LIMIT: usize = 10;

/// # Summary
/// 可检索标的目录，同时提供代码到展示名称的映射。
///
/// # Invariants
/// - `symbol` 均为大写裸代码，`exchange` 为交易所名称 (NSE / NASDAQ)。
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// # Summary
    /// 内置目录：NSE 大盘股与少量 NASDAQ 标的。
    pub fn builtin() -> Self {
        const ENTRIES: [(&str, &str, &str); 16] = [
            ("TCS", "Tata Consultancy Services", "NSE"),
            ("INFY", "Infosys", "NSE"),
            ("RELIANCE", "Reliance Industries", "NSE"),
            ("ICICIBANK", "ICICI Bank", "NSE"),
            ("HDFCBANK", "HDFC Bank", "NSE"),
            ("SBIN", "State Bank of India", "NSE"),
            ("ITC", "ITC Limited", "NSE"),
            ("HCLTECH", "HCL Technologies", "NSE"),
            ("WIPRO", "Wipro", "NSE"),
            ("TATAMOTORS", "Tata Motors", "NSE"),
            ("BHARTIARTL", "Bharti Airtel", "NSE"),
            ("LT", "Larsen & Toubro", "NSE"),
            ("AAPL", "Apple Inc", "NASDAQ"),
            ("GOOGL", "Alphabet Inc", "NASDAQ"),
            ("MSFT", "Microsoft", "NASDAQ"),
            ("TSLA", "Tesla Inc", "NASDAQ"),
        ];
        Self::new(
            ENTRIES
                .iter()
                .map(|(symbol, name, exchange)| CatalogEntry {
                    symbol: symbol.to_string(),
                    name: name.to_string(),
                    exchange: exchange.to_string(),
                })
                .collect(),
        )
    }

    /// 返回展示名称，目录中没有时回落为裸代码。
    pub fn name_of(&self, stock: &Stock) -> String {
        self.entries
            .iter()
            .find(|e| e.symbol == stock.symbol)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| stock.symbol.clone())
    }

    /// # Summary
    /// 按代码或名称做不区分大小写的子串匹配。
    ///
    /// # Returns
    /// 至多 `limit` 条，保持目录顺序。
    pub fn search(&self, query: &str, limit: usize) -> Vec<CatalogEntry> {
        let query = query.trim().to_uppercase();
        self.entries
            .iter()
            .filter(|e| e.symbol.contains(&query) || e.name.to_uppercase().contains(&query))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// 行业板块表现 (静态数据)。
pub fn sector_performance() -> Vec<SectorPerformance> {
    [
        ("Technology", 8.5, 2.3),
        ("Healthcare", 3.2, 1.1),
        ("Finance", -2.1, -0.8),
        ("Energy", -4.3, -1.5),
        ("Consumer", 2.8, 0.9),
        ("Industrial", 1.5, 0.4),
    ]
    .iter()
    .map(|&(name, value, change)| SectorPerformance {
        name: name.to_string(),
        value,
        change,
    })
    .collect()
}
