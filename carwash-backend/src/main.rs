// src/main.rs
use carwash_backend::api::{app_router, AppState};
use carwash_backend::config::AppConfig;
use carwash_backend::db::create_db_pool;
use migration::{Migrator, MigratorTrait};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env があれば読み込む
    dotenvy::dotenv().ok();

    // トレーシングの設定
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carwash_backend=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Starting car wash backend server...");

    // 設定を読み込む
    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        retention_days = app_config.visit.retention_days,
        "Configuration loaded"
    );

    // データベース接続を作成
    let db_pool = create_db_pool(&app_config).await?;
    tracing::info!("Database pool created successfully.");

    Migrator::up(&db_pool, None).await?;
    tracing::info!("Migrations applied.");

    let app_state = AppState::new(db_pool, &app_config)?;

    // 月額会員を先読み。失敗しても起動は続け、初回アクセスで再試行する
    if let Err(e) = app_state.member_cache.initialize().await {
        tracing::warn!(error = %e, "Initial member cache load failed");
    }

    let app = app_router(app_state);

    let server_addr = app_config.server_addr();
    tracing::info!("Router configured. Server listening on {}", server_addr);

    let listener = TcpListener::bind(&server_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
