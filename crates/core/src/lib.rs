//! # `visiontrade-core` - 领域核心
//!
//! 定义行情聚合服务的实体、错误与端口 (Trait)。
//! 本 crate 不包含任何网络或调度实现，所有具体实现由上层 crate 注入。

pub mod cache;
pub mod common;
pub mod config;
pub mod market;
