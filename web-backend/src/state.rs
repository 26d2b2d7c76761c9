use crate::supervisor::ScanSupervisor;
use scout_core::ScanExecutor;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;

const DEFAULT_MAX_CONCURRENT_SCANS: usize = 4;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub supervisor: ScanSupervisor,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        let db = init_db().await?;

        let max_scans = std::env::var("SCOUT_MAX_CONCURRENT_SCANS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONCURRENT_SCANS);
        let supervisor =
            ScanSupervisor::new(db.clone(), Arc::new(ScanExecutor::new()), max_scans);

        Ok(Self { db, supervisor })
    }
}

async fn init_db() -> anyhow::Result<Pool<Sqlite>> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            let db_path = std::env::current_dir()?.join("scout.db");
            format!("sqlite://{}", db_path.display())
        }
    };
    tracing::info!("Database: {}", url);

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;

    create_schema(&pool).await?;

    Ok(pool)
}

pub async fn create_schema(pool: &Pool<Sqlite>) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS scan_history (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT UNIQUE NOT NULL,
            tool TEXT NOT NULL,
            ip_address TEXT NOT NULL,
            network TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'running',
            vulnerabilities_found INTEGER NOT NULL DEFAULT 0,
            scan_date DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS scan_findings (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            scan_id TEXT NOT NULL,
            finding_id TEXT UNIQUE NOT NULL,
            category TEXT NOT NULL,
            severity TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY(scan_id) REFERENCES scan_history(id)
        );

        CREATE TABLE IF NOT EXISTS vulnerabilities (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT,
            criticality TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            cvss_score TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME
        );
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow::anyhow!("Failed to create tables: {}", e))?;

    Ok(())
}
