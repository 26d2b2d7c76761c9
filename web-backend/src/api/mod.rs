use actix_web::{web, Scope};

pub mod scans;
pub mod tools;
pub mod vulnerabilities;

pub fn create_api_router() -> Scope {
    web::scope("/api")
        .service(scan_routes())
        .service(tool_routes())
        .service(vulnerability_routes())
}

fn scan_routes() -> Scope {
    web::scope("/scans").configure(scans::configure_scan_routes)
}

fn tool_routes() -> Scope {
    web::scope("/tools").configure(tools::configure_tool_routes)
}

fn vulnerability_routes() -> Scope {
    web::scope("/vulnerabilities").configure(vulnerabilities::configure_vulnerability_routes)
}
