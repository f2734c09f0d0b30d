use picks_api::config::Config;
use picks_api::error::AppError;
use picks_api::logging::init_logging;
use picks_api::server::{create_app, AppState};
use picks_api::store::init_store;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_logging(&config)?;

    tracing::info!("Starting product catalog service");

    // 初始化存储后端
    let store = init_store(&config.store).await?;

    // 创建应用状态
    let state = AppState {
        config: config.clone(),
        store,
    };

    // 创建并启动服务器
    let app = create_app(state).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}
