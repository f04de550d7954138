//! # `visiontrade-api` - HTTP API 网关
//!
//! 本 crate 是 VisionTrade 行情聚合服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由与控制器，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 接收来自前端仪表盘或浏览器的 HTTP 请求
//! - 从刷新协调器读取聚合快照，或调用 `StockService` 查询单只股票
//! - 将领域模型转换为 DTO 返回给前端，失败统一为 `{status: "error", message}`

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
