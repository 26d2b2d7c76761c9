// Scan supervisor - owns the scan lifecycle: id allocation, background
// dispatch, and the exactly-once terminal transition on the registry.

use scout_core::{ScanOutcome, ScanRunner};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

const TERMINAL_WRITE_ATTEMPTS: u32 = 3;
const TERMINAL_WRITE_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub tool: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub network: String,
}

/// Persistent scan record as served over the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanRecord {
    pub id: String,
    pub tool: String,
    #[serde(rename = "ipAddress")]
    pub ip_address: String,
    pub network: String,
    pub status: String,
    #[serde(rename = "vulnerabilitiesFound")]
    pub vulnerabilities_found: i64,
    #[serde(rename = "scanDate")]
    pub scan_date: String,
}

pub const SCAN_RECORD_COLUMNS: &str = "id, tool, ip_address, network, status, \
     vulnerabilities_found, datetime(scan_date) as scan_date";

#[derive(Clone)]
pub struct ScanSupervisor {
    db: Pool<Sqlite>,
    runner: Arc<dyn ScanRunner>,
    permits: Arc<Semaphore>,
}

impl ScanSupervisor {
    pub fn new(db: Pool<Sqlite>, runner: Arc<dyn ScanRunner>, max_concurrent: usize) -> Self {
        Self {
            db,
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// Creates the running record and dispatches the scan on its own
    /// task. Returns as soon as the record is durable; the caller never
    /// waits for the scan itself.
    pub async fn submit(&self, req: ScanRequest) -> anyhow::Result<ScanRecord> {
        let record = self.create_record(&req).await?;
        self.dispatch(record.id.clone(), req);
        Ok(record)
    }

    async fn create_record(&self, req: &ScanRequest) -> anyhow::Result<ScanRecord> {
        let mut tx = self.db.begin().await?;

        // Sequence-derived id: the AUTOINCREMENT rowid is allocated
        // inside the insert transaction, so concurrent submits cannot
        // observe the same number.
        let seq = sqlx::query_scalar::<_, i64>(
            "INSERT INTO scan_history (id, tool, ip_address, network, status, vulnerabilities_found)
             VALUES ('', ?, ?, ?, 'running', 0)
             RETURNING seq",
        )
        .bind(&req.tool)
        .bind(&req.ip_address)
        .bind(&req.network)
        .fetch_one(&mut *tx)
        .await?;

        let id = format!("SCAN-{:03}", seq);
        sqlx::query("UPDATE scan_history SET id = ? WHERE seq = ?")
            .bind(&id)
            .bind(seq)
            .execute(&mut *tx)
            .await?;

        let record = sqlx::query_as::<_, ScanRecord>(&format!(
            "SELECT {} FROM scan_history WHERE seq = ?",
            SCAN_RECORD_COLUMNS
        ))
        .bind(seq)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    fn dispatch(&self, id: String, req: ScanRequest) {
        let db = self.db.clone();
        let runner = self.runner.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            // Queue here, not in the request path: the permit caps how
            // many external processes run at once.
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            tracing::info!(scan = %id, tool = %req.tool, target = %req.ip_address, "scan started");
            let outcome = runner.run(&req.tool, &req.ip_address, &req.network).await;
            finish_scan(&db, &id, &outcome).await;
        });
    }
}

/// Terminal transition plus finding persistence, retried with backoff
/// when the registry write fails. An id that is gone or already
/// terminal is a no-op.
pub async fn finish_scan(db: &Pool<Sqlite>, id: &str, outcome: &ScanOutcome) {
    let mut attempt = 0;
    loop {
        match try_finish(db, id, outcome).await {
            Ok(true) => {
                tracing::info!(
                    scan = %id,
                    failed = outcome.failed,
                    findings = outcome.findings.len(),
                    summary = %outcome.summary,
                    "scan finished"
                );
                return;
            }
            Ok(false) => {
                tracing::warn!(scan = %id, "scan record gone or already terminal, skipping update");
                return;
            }
            Err(e) => {
                attempt += 1;
                if attempt >= TERMINAL_WRITE_ATTEMPTS {
                    tracing::error!(scan = %id, error = %e, "giving up on terminal write, record stuck in running");
                    return;
                }
                let backoff = TERMINAL_WRITE_BACKOFF * 2u32.pow(attempt - 1);
                tracing::warn!(scan = %id, error = %e, attempt, "terminal write failed, retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

async fn try_finish(db: &Pool<Sqlite>, id: &str, outcome: &ScanOutcome) -> sqlx::Result<bool> {
    let (status, count) = if outcome.failed {
        ("failed", 0i64)
    } else {
        ("completed", outcome.findings.len() as i64)
    };

    let mut tx = db.begin().await?;

    // The status guard makes the transition exactly-once
    let updated = sqlx::query(
        "UPDATE scan_history SET status = ?, vulnerabilities_found = ? \
         WHERE id = ? AND status = 'running'",
    )
    .bind(status)
    .bind(count)
    .bind(id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if updated == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    if !outcome.failed {
        for finding in &outcome.findings {
            sqlx::query(
                "INSERT INTO scan_findings (scan_id, finding_id, category, severity, description) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(Uuid::new_v4().to_string())
            .bind(&finding.category)
            .bind(finding.severity.as_str())
            .bind(&finding.description)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(true)
}
