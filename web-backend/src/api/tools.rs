use actix_web::{web, HttpResponse, Responder};
use scout_core::{is_available, SCAN_TOOLS};

pub fn configure_tool_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/availability", web::get().to(tool_availability)); // GET /api/tools/availability
}

/// Reports which of the supported external scanners are installed on
/// the scan host.
async fn tool_availability() -> impl Responder {
    let mut availability = serde_json::Map::new();
    for tool in SCAN_TOOLS {
        availability.insert(
            tool.to_string(),
            serde_json::Value::Bool(is_available(tool).await),
        );
    }

    HttpResponse::Ok().json(serde_json::json!({
        "tools": availability,
        "message": "Install missing tools to enable full scanning capabilities"
    }))
}
