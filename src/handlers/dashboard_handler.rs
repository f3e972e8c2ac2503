use actix_web::{web, HttpResponse};

use crate::handlers::{error_response, session::UsuarioActual};
use crate::services::dashboard_service::DashboardService;

/// GET /api/dashboard
pub async fn resumen_endpoint(
    dashboard: web::Data<DashboardService>,
    actual: UsuarioActual,
) -> HttpResponse {
    match dashboard
        .resumen(&actual.usuario.id, chrono::Utc::now())
        .await
    {
        Ok(resumen) => HttpResponse::Ok().json(resumen),
        Err(e) => error_response(e),
    }
}
