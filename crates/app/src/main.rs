use migration::{Migrator, MigratorTrait};
use thiserror::Error;

mod settings;

#[derive(Debug, Error)]
enum AppError {
    #[error("invalid server address: {0}")]
    Address(#[from] std::net::AddrParseError),
    #[error("failed to initialize database: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("failed to build engine: {0}")]
    Engine(#[from] engine::EngineError),
    #[error("invalid currency setting: {0}")]
    Currency(engine::EngineError),
    #[error("server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "landed={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    if let Err(err) = serve(settings.server, &settings.currency).await {
        tracing::error!("{err}");
        return Err(err.into());
    }
    Ok(())
}

async fn serve(server: settings::Server, currency: &settings::Currencies) -> Result<(), AppError> {
    let addr = server.addr()?;
    let currencies = currency.pair().map_err(AppError::Currency)?;
    let db = parse_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener, currencies).await?;
    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, AppError> {
    let url = config.url();
    tracing::info!("Opening database {url}");

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
