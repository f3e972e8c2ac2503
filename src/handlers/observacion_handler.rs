use actix_web::{web, HttpResponse};

use crate::handlers::{error_response, session::UsuarioActual};
use crate::models::{log_model::Accion, observacion_model::ObservacionRequest};
use crate::services::{log_service::LogService, observacion_service::ObservacionService};

/// GET /api/elementos/{id}/observaciones
pub async fn listar_observaciones_endpoint(
    observaciones: web::Data<ObservacionService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match observaciones.listar(&path.into_inner()).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// POST /api/elementos/{id}/observaciones
pub async fn crear_observacion_endpoint(
    observaciones: web::Data<ObservacionService>,
    logs: web::Data<LogService>,
    actual: UsuarioActual,
    path: web::Path<String>,
    body: web::Json<ObservacionRequest>,
) -> HttpResponse {
    let elemento_id = path.into_inner();
    match observaciones
        .crear(&elemento_id, body.into_inner(), Some(&actual.usuario.id))
        .await
    {
        Ok(obs) => {
            logs.auditar(&actual.usuario.id, Accion::Crear, "observacion", &obs.id, None)
                .await;
            HttpResponse::Created().json(obs)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/observaciones/{id}
pub async fn eliminar_observacion_endpoint(
    observaciones: web::Data<ObservacionService>,
    logs: web::Data<LogService>,
    actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match observaciones.eliminar(&id, &actual.usuario).await {
        Ok(_) => {
            logs.auditar(&actual.usuario.id, Accion::Eliminar, "observacion", &id, None)
                .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}
