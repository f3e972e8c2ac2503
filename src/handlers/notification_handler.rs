//! handlers/notification_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::{
    error_response,
    session::{AdminActual, UsuarioActual},
};
use crate::models::notification_model::NotificacionQuery;
use crate::services::notification_service::NotificationService;

/// GET /api/notificaciones?solo_no_leidas=true
pub async fn listar_notificaciones_endpoint(
    notificaciones: web::Data<NotificationService>,
    actual: UsuarioActual,
    query: web::Query<NotificacionQuery>,
) -> HttpResponse {
    let solo_no_leidas = query.solo_no_leidas.unwrap_or(false);
    match notificaciones
        .listar(&actual.usuario.id, solo_no_leidas)
        .await
    {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/notificaciones/no-leidas
pub async fn contar_no_leidas_endpoint(
    notificaciones: web::Data<NotificationService>,
    actual: UsuarioActual,
) -> HttpResponse {
    match notificaciones.contar_no_leidas(&actual.usuario.id).await {
        Ok(total) => HttpResponse::Ok().json(json!({ "no_leidas": total })),
        Err(e) => error_response(e),
    }
}

/// POST /api/notificaciones/{id}/leida
pub async fn marcar_leida_endpoint(
    notificaciones: web::Data<NotificationService>,
    actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match notificaciones
        .marcar_leida(&path.into_inner(), &actual.usuario.id)
        .await
    {
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(e),
    }
}

/// POST /api/notificaciones/leidas
pub async fn marcar_todas_leidas_endpoint(
    notificaciones: web::Data<NotificationService>,
    actual: UsuarioActual,
) -> HttpResponse {
    match notificaciones.marcar_todas_leidas(&actual.usuario.id).await {
        Ok(n) => HttpResponse::Ok().json(json!({ "actualizadas": n })),
        Err(e) => error_response(e),
    }
}

/// POST /api/notificaciones/revisar
/// Fuerza la revisión de vencimientos sin esperar al barrido periódico.
pub async fn revisar_vencimientos_endpoint(
    notificaciones: web::Data<NotificationService>,
    _admin: AdminActual,
) -> HttpResponse {
    match notificaciones.revisar_vencimientos(chrono::Utc::now()).await {
        Ok(creadas) => HttpResponse::Ok().json(json!({ "creadas": creadas })),
        Err(e) => error_response(e),
    }
}
