use actix_web::{web, HttpResponse};

use crate::handlers::{error_response, session::AdminActual};
use crate::models::log_model::LogFiltro;
use crate::services::log_service::LogService;

/// GET /api/logs
pub async fn listar_logs_endpoint(
    logs: web::Data<LogService>,
    _admin: AdminActual,
    query: web::Query<LogFiltro>,
) -> HttpResponse {
    match logs.listar(&query).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}
