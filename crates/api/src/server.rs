//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 并绑定 TCP 端口对外提供服务。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 的 DI 容器持有并调用。

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use visiontrade_core::cache::port::SnapshotCache;
use visiontrade_core::common::TimeProvider;
use visiontrade_market::stock::StockService;

use crate::routes::{market, stock, system};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - 所有字段在服务启动前由 DI 容器注入，生命周期与进程等同。
#[derive(Clone)]
pub struct AppState {
    /// 聚合快照缓存 (刷新协调器)
    pub market: Arc<dyn SnapshotCache>,
    /// 单只股票查询服务
    pub stocks: Arc<StockService>,
    /// 响应时间戳使用的时钟
    pub clock: Arc<dyn TimeProvider>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VisionTrade Stock Market API",
        version = "0.1.0",
        description = "VisionTrade 行情聚合服务的 RESTful API。提供带缓存的市场快照、个股详情、搜索与预测接口。",
        license(name = "MIT")
    ),
    tags(
        (name = "行情 (Market)", description = "聚合行情快照与板块表现"),
        (name = "个股 (Stock)", description = "单只股票详情、历史、搜索与预测"),
        (name = "系统 (System)", description = "服务目录与健康检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树。
///
/// # Logic
/// 1. 通过 `OpenApiRouter` 注册全部接口并收集 OpenAPI 文档。
/// 2. 挂载 Swagger UI 与 JSON 404 兜底。
/// 3. 配置 CORS (允许所有来源)。
pub fn build_router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(system::index))
        .routes(routes!(system::health))
        .routes(routes!(market::get_market_data))
        .routes(routes!(market::get_sector_performance))
        .routes(routes!(stock::get_stock))
        .routes(routes!(stock::search_stocks))
        .routes(routes!(stock::predict))
        .routes(routes!(stock::get_history))
        .with_state(state)
        .split_for_parts();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .fallback(system::not_found)
        .layer(cors)
}

/// # Summary
/// 在已绑定的监听器上提供服务，直到 `shutdown` 完成。
///
/// # Arguments
/// * `listener` - 已绑定的 TCP 监听器 (测试中可使用随机端口)。
/// * `state` - 由外部 DI 容器注入的共享状态。
/// * `shutdown` - 完成时触发优雅关闭的信号。
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// # Summary
/// 绑定端口并启动 HTTP 服务。
///
/// # Arguments
/// * `state` - 由外部 DI 容器注入的共享状态。
/// * `bind_addr` - 监听的地址与端口，如 `"0.0.0.0:5001"`。
/// * `shutdown` - 完成时触发优雅关闭的信号。
///
/// # Returns
/// 端口绑定失败或服务异常退出时返回错误。
pub async fn start_server(
    state: AppState,
    bind_addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(bind_addr).await?;

    tracing::info!("VisionTrade API Server listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    serve(listener, state, shutdown).await?;
    tracing::info!("VisionTrade API Server stopped");
    Ok(())
}
