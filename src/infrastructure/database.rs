use crate::entities::prelude::*;
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;

/// Connect to the database named by `DATABASE_URL` and ensure the schema
/// exists. Postgres in deployment, sqlite in tests.
pub async fn setup_database(database_url: &str) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url.to_string());
    opt.max_connections(20)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    run_migrations(&db).await?;
    Ok(db)
}

/// Create tables from the entity definitions if they do not exist yet.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut users_table = schema.create_table_from_entity(Users);
    users_table.if_not_exists();
    db.execute(backend.build(&users_table)).await?;

    let mut files_table = schema.create_table_from_entity(Files);
    files_table.if_not_exists();
    db.execute(backend.build(&files_table)).await?;

    tracing::info!("database schema ready");
    Ok(())
}
