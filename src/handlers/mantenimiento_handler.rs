//! handlers/mantenimiento_handler.rs
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::{
    error_response,
    session::{AdminActual, UsuarioActual},
};
use crate::models::{
    log_model::Accion,
    mantenimiento_model::{
        CompletarMantenimientoRequest, MantenimientoFiltro, ProgramarMantenimientoRequest,
    },
};
use crate::services::{log_service::LogService, mantenimiento_service::MantenimientoService};

#[derive(Debug, Deserialize)]
pub struct ProximosQuery {
    pub dias: Option<i64>,
}

/// GET /api/mantenimientos
pub async fn listar_mantenimientos_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    _actual: UsuarioActual,
    query: web::Query<MantenimientoFiltro>,
) -> HttpResponse {
    match mantenimientos.listar(&query).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/mantenimientos/proximos?dias=7
pub async fn proximos_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    _actual: UsuarioActual,
    query: web::Query<ProximosQuery>,
) -> HttpResponse {
    let dias = query.dias.unwrap_or(7).clamp(0, 365);
    let hoy = chrono::Utc::now().date_naive();
    match mantenimientos.proximos(hoy, dias).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/mantenimientos/{id}
pub async fn obtener_mantenimiento_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match mantenimientos.obtener(&path.into_inner()).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(e),
    }
}

/// POST /api/mantenimientos
pub async fn programar_mantenimiento_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<ProgramarMantenimientoRequest>,
) -> HttpResponse {
    match mantenimientos.programar(body.into_inner()).await {
        Ok(m) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "mantenimiento",
                &m.id,
                Some(json!({ "elemento_id": m.elemento_id, "fecha_programada": m.fecha_programada })),
            )
            .await;
            HttpResponse::Created().json(m)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/mantenimientos/{id}/iniciar
pub async fn iniciar_mantenimiento_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match mantenimientos.iniciar(&id).await {
        Ok(m) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Actualizar,
                "mantenimiento",
                &id,
                Some(json!({ "estado": m.estado })),
            )
            .await;
            HttpResponse::Ok().json(m)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/mantenimientos/{id}/completar
pub async fn completar_mantenimiento_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: Option<web::Json<CompletarMantenimientoRequest>>,
) -> HttpResponse {
    let id = path.into_inner();
    let req = body.map(|b| b.into_inner()).unwrap_or_default();
    match mantenimientos.completar(&id, req).await {
        Ok(resultado) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Actualizar,
                "mantenimiento",
                &id,
                Some(json!({
                    "estado": resultado.mantenimiento.estado,
                    "siguiente": resultado.siguiente.as_ref().map(|s| s.id.clone())
                })),
            )
            .await;
            HttpResponse::Ok().json(resultado)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/mantenimientos/{id}/cancelar
pub async fn cancelar_mantenimiento_endpoint(
    mantenimientos: web::Data<MantenimientoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match mantenimientos.cancelar(&id).await {
        Ok(m) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Actualizar,
                "mantenimiento",
                &id,
                Some(json!({ "estado": m.estado })),
            )
            .await;
            HttpResponse::Ok().json(m)
        }
        Err(e) => error_response(e),
    }
}
