//! handlers/elemento_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::{
    error_response,
    session::{AdminActual, UsuarioActual},
};
use crate::models::{
    elemento_model::{ElementoFiltro, ElementoRequest},
    log_model::Accion,
};
use crate::services::{elemento_service::ElementoService, log_service::LogService};

/// GET /api/elementos
pub async fn listar_elementos_endpoint(
    elementos: web::Data<ElementoService>,
    _actual: UsuarioActual,
    query: web::Query<ElementoFiltro>,
) -> HttpResponse {
    match elementos.listar(&query).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/elementos/{id}
pub async fn obtener_elemento_endpoint(
    elementos: web::Data<ElementoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match elementos.obtener(&path.into_inner()).await {
        Ok(elemento) => HttpResponse::Ok().json(elemento),
        Err(e) => error_response(e),
    }
}

/// GET /api/elementos/{id}/disponibilidad
pub async fn disponibilidad_endpoint(
    elementos: web::Data<ElementoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match elementos.disponibilidad(&path.into_inner()).await {
        Ok(disp) => HttpResponse::Ok().json(disp),
        Err(e) => error_response(e),
    }
}

/// POST /api/elementos
pub async fn crear_elemento_endpoint(
    elementos: web::Data<ElementoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<ElementoRequest>,
) -> HttpResponse {
    match elementos.crear(body.into_inner()).await {
        Ok(elemento) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "elemento",
                &elemento.id,
                Some(json!({ "serie": elemento.serie, "cantidad": elemento.cantidad })),
            )
            .await;
            HttpResponse::Created().json(elemento)
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/elementos/{id}
pub async fn actualizar_elemento_endpoint(
    elementos: web::Data<ElementoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: web::Json<ElementoRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match elementos.actualizar(&id, body.into_inner()).await {
        Ok(elemento) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Actualizar,
                "elemento",
                &id,
                Some(json!({ "estado": elemento.estado, "cantidad": elemento.cantidad })),
            )
            .await;
            HttpResponse::Ok().json(elemento)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/elementos/{id}
pub async fn eliminar_elemento_endpoint(
    elementos: web::Data<ElementoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match elementos.eliminar(&id).await {
        Ok(_) => {
            logs.auditar(&admin.0.usuario.id, Accion::Eliminar, "elemento", &id, None)
                .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}
