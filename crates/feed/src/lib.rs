//! # `visiontrade-feed` - 上游数据源
//!
//! 行情 (Yahoo chart)、新闻 (RSS) 与占位数据源的具体实现。

pub mod news;
pub mod synthetic;
pub mod yahoo;
