use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::state::AppState;
use crate::supervisor::{ScanRecord, ScanRequest, SCAN_RECORD_COLUMNS};

pub fn configure_scan_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // RESTful routes
        .route("", web::post().to(create_scan))                      // POST /api/scans
        .route("", web::get().to(list_scans))                        // GET /api/scans
        .route("/{id}", web::get().to(get_scan))                     // GET /api/scans/{id}
        .route("/{id}/findings", web::get().to(get_scan_findings))   // GET /api/scans/{id}/findings
        .route("/{id}/status", web::put().to(override_scan_status)); // PUT /api/scans/{id}/status
}

async fn create_scan(
    state: web::Data<AppState>,
    req: web::Json<ScanRequest>,
) -> impl Responder {
    match state.supervisor.submit(req.into_inner()).await {
        Ok(record) => HttpResponse::Created().json(record),
        Err(e) => {
            tracing::error!("Failed to create scan: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to create scan: {}", e)
            }))
        }
    }
}

async fn list_scans(state: web::Data<AppState>) -> impl Responder {
    let query = format!(
        "SELECT {} FROM scan_history ORDER BY scan_date DESC, seq DESC",
        SCAN_RECORD_COLUMNS
    );
    match sqlx::query_as::<_, ScanRecord>(&query)
        .fetch_all(&state.db)
        .await
    {
        Ok(scans) => HttpResponse::Ok().json(scans),
        Err(e) => {
            tracing::error!("Failed to fetch scans: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch scans: {}", e)
            }))
        }
    }
}

async fn get_scan(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    let query = format!("SELECT {} FROM scan_history WHERE id = ?", SCAN_RECORD_COLUMNS);
    match sqlx::query_as::<_, ScanRecord>(&query)
        .bind(&id)
        .fetch_optional(&state.db)
        .await
    {
        Ok(Some(scan)) => HttpResponse::Ok().json(scan),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Scan not found"
        })),
        Err(e) => {
            tracing::error!("Failed to fetch scan {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch scan: {}", e)
            }))
        }
    }
}

#[derive(Serialize, FromRow)]
struct StoredFinding {
    #[serde(rename = "findingId")]
    finding_id: String,
    category: String,
    severity: String,
    description: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

async fn get_scan_findings(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let id = path.into_inner();

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM scan_history WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await;
    match exists {
        Ok(0) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Scan not found"
            }));
        }
        Ok(_) => {}
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch scan: {}", e)
            }));
        }
    }

    match sqlx::query_as::<_, StoredFinding>(
        "SELECT finding_id, category, severity, description, \
                datetime(created_at) as created_at \
         FROM scan_findings WHERE scan_id = ? ORDER BY seq",
    )
    .bind(&id)
    .fetch_all(&state.db)
    .await
    {
        Ok(findings) => HttpResponse::Ok().json(findings),
        Err(e) => {
            tracing::error!("Failed to fetch findings for {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch findings: {}", e)
            }))
        }
    }
}

#[derive(Deserialize)]
struct StatusOverride {
    status: String,
    #[serde(rename = "findingsCount")]
    findings_count: Option<i64>,
}

/// Administrative override, not used by the normal execution path.
async fn override_scan_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<StatusOverride>,
) -> impl Responder {
    let id = path.into_inner();

    if !matches!(req.status.as_str(), "running" | "completed" | "failed") {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unknown status: {}", req.status)
        }));
    }

    let result = sqlx::query(
        "UPDATE scan_history SET status = ?, \
         vulnerabilities_found = COALESCE(?, vulnerabilities_found) WHERE id = ?",
    )
    .bind(&req.status)
    .bind(req.findings_count)
    .bind(&id)
    .execute(&state.db)
    .await;

    match result {
        Ok(result) if result.rows_affected() == 0 => {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": "Scan not found"
            }))
        }
        Ok(_) => {
            tracing::warn!(scan = %id, status = %req.status, "scan status overridden");
            let query =
                format!("SELECT {} FROM scan_history WHERE id = ?", SCAN_RECORD_COLUMNS);
            match sqlx::query_as::<_, ScanRecord>(&query)
                .bind(&id)
                .fetch_one(&state.db)
                .await
            {
                Ok(scan) => HttpResponse::Ok().json(scan),
                Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": format!("Failed to fetch scan: {}", e)
                })),
            }
        }
        Err(e) => {
            tracing::error!("Failed to override scan {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to update scan: {}", e)
            }))
        }
    }
}
