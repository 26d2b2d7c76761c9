// Read-only surface over the vulnerability reference catalog. Catalog
// rows are maintained by external workflows; the scanner only reads.

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::state::AppState;

#[derive(Serialize, Deserialize, FromRow)]
pub struct Vulnerability {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub criticality: String,
    pub status: String,
    #[serde(rename = "cvssScore")]
    pub cvss_score: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Serialize)]
struct VulnerabilityStatistics {
    total: i64,
    critical: i64,
    high: i64,
    medium: i64,
    base: i64,
}

pub fn configure_vulnerability_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_vulnerabilities)) // GET /api/vulnerabilities
        .route("/statistics", web::get().to(get_statistics)); // GET /api/vulnerabilities/statistics
}

async fn list_vulnerabilities(state: web::Data<AppState>) -> impl Responder {
    match sqlx::query_as::<_, Vulnerability>(
        "SELECT id, name, description, criticality, status, cvss_score, \
                datetime(created_at) as created_at \
         FROM vulnerabilities ORDER BY id",
    )
    .fetch_all(&state.db)
    .await
    {
        Ok(vulnerabilities) => HttpResponse::Ok().json(vulnerabilities),
        Err(e) => {
            tracing::error!("Failed to fetch vulnerabilities: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to fetch vulnerabilities: {}", e)
            }))
        }
    }
}

async fn get_statistics(state: web::Data<AppState>) -> impl Responder {
    let total = count(&state, None).await;
    let critical = count(&state, Some("critical")).await;
    let high = count(&state, Some("high")).await;
    let medium = count(&state, Some("medium")).await;
    let base = count(&state, Some("base")).await;

    match (total, critical, high, medium, base) {
        (Ok(total), Ok(critical), Ok(high), Ok(medium), Ok(base)) => {
            HttpResponse::Ok().json(VulnerabilityStatistics {
                total,
                critical,
                high,
                medium,
                base,
            })
        }
        _ => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Failed to compute vulnerability statistics"
        })),
    }
}

async fn count(state: &AppState, criticality: Option<&str>) -> sqlx::Result<i64> {
    match criticality {
        Some(level) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM vulnerabilities WHERE criticality = ?")
                .bind(level)
                .fetch_one(&state.db)
                .await
        }
        None => {
            sqlx::query_scalar("SELECT COUNT(*) FROM vulnerabilities")
                .fetch_one(&state.db)
                .await
        }
    }
}
