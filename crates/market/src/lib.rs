//! # `visiontrade-market` - 行情领域实现
//!
//! 快照构建器、排行、标的目录与单只股票查询服务。
//! 只依赖 `visiontrade-core` 中的端口，具体数据源由 app 层注入。

pub mod builder;
pub mod catalog;
pub mod ranking;
pub mod session;
pub mod sources;
pub mod stock;
