use hoai_cost_rust::{api, AppConfig, MemoryRepository, ProjectService};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置 (默认值 + HOAI_ 环境变量)
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    let repo = Arc::new(MemoryRepository::new());
    let service = Arc::new(ProjectService::new(
        repo,
        config.pricing.clone(),
        config.payment.clone(),
    ));

    let app = api::router(service);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints (header x-role, optional x-vendor-id):");
    info!("  GET   /api/projects/:project_id/items");
    info!("  POST  /api/projects/:project_id/items");
    info!("  PATCH /api/projects/:project_id/items/:item_id");
    info!("  POST  /api/projects/:project_id/items/:item_id/approve");
    info!("  POST  /api/projects/:project_id/items/:item_id/vendor");
    info!("  GET   /api/projects/:project_id/summary");
    info!("  PUT   /api/projects/:project_id/budget");
    info!("  GET   /api/projects/:project_id/comparison");
    info!("  POST  /api/projects/:project_id/import");
    info!("  GET   /api/projects/:project_id/export");
    info!("  POST  /api/projects/:project_id/payment");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
