use std::net::SocketAddr;

use migration::{Migrator, MigratorTrait};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "recipes={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = connect_database(&server.database).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    if let (Some(email), Some(password)) = (settings.admin.email, settings.admin.password) {
        let name = settings.admin.name.unwrap_or_else(|| "Admin".to_string());
        match engine.ensure_admin(&email, &name, &password).await {
            Ok(admin) => tracing::info!(user_id = admin.id, "admin account ready"),
            Err(err) => tracing::error!("failed to seed admin account: {err}"),
        }
    }

    let bind = server.bind.unwrap_or_else(|| "0.0.0.0".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, server.port).parse()?;
    let config = server::ServerConfig {
        jwt_secret: server.jwt_secret,
        token_ttl_hours: server.token_ttl_hours,
        cookie_secure: server.cookie_secure,
        frontend_url: server.frontend_url,
    };

    server::run(engine, config, addr).await;
    Ok(())
}

async fn connect_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let database = sea_orm::Database::connect(config.url()?).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database migrated");
    Ok(database)
}
