//! handlers/movimiento_handler.rs
//! Préstamos y devoluciones.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::handlers::{error_response, session::UsuarioActual};
use crate::models::{
    log_model::Accion,
    movimiento_model::{DevolucionRequest, MovimientoFiltro, PrestamoRequest},
};
use crate::services::{
    log_service::LogService, movimiento_service::MovimientoService, ticket_service::TicketService,
};

/// POST /api/movimientos/prestamos
pub async fn registrar_prestamo_endpoint(
    movimientos: web::Data<MovimientoService>,
    logs: web::Data<LogService>,
    actual: UsuarioActual,
    body: web::Json<PrestamoRequest>,
) -> HttpResponse {
    match movimientos
        .registrar_prestamo(body.into_inner(), Some(&actual.usuario.id))
        .await
    {
        Ok(resultado) => {
            logs.auditar(
                &actual.usuario.id,
                Accion::Prestar,
                "movimiento",
                &resultado.movimiento.id,
                Some(json!({
                    "elemento_id": resultado.movimiento.elemento_id,
                    "cantidad": resultado.movimiento.cantidad,
                    "ticket": resultado.ticket.numero
                })),
            )
            .await;
            HttpResponse::Created().json(resultado)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/movimientos/{id}/devolucion
pub async fn registrar_devolucion_endpoint(
    movimientos: web::Data<MovimientoService>,
    logs: web::Data<LogService>,
    actual: UsuarioActual,
    path: web::Path<String>,
    body: Option<web::Json<DevolucionRequest>>,
) -> HttpResponse {
    let salida_id = path.into_inner();
    let req = body.map(|b| b.into_inner()).unwrap_or_default();

    match movimientos
        .registrar_devolucion(&salida_id, req, Some(&actual.usuario.id))
        .await
    {
        Ok(resultado) => {
            logs.auditar(
                &actual.usuario.id,
                Accion::Devolver,
                "movimiento",
                &salida_id,
                Some(json!({
                    "entrada_id": resultado.movimiento.id,
                    "ticket": resultado.ticket.numero
                })),
            )
            .await;
            HttpResponse::Created().json(resultado)
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/movimientos
pub async fn listar_movimientos_endpoint(
    movimientos: web::Data<MovimientoService>,
    _actual: UsuarioActual,
    query: web::Query<MovimientoFiltro>,
) -> HttpResponse {
    match movimientos.listar(&query).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/movimientos/vencidos
pub async fn listar_vencidos_endpoint(
    movimientos: web::Data<MovimientoService>,
    _actual: UsuarioActual,
) -> HttpResponse {
    match movimientos.vencidos(chrono::Utc::now()).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/movimientos/{id}
pub async fn obtener_movimiento_endpoint(
    movimientos: web::Data<MovimientoService>,
    tickets: web::Data<TicketService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    let movimiento = match movimientos.obtener(&id).await {
        Ok(m) => m,
        Err(e) => return error_response(e),
    };
    match tickets.por_movimiento(&id).await {
        Ok(list) => HttpResponse::Ok().json(json!({
            "movimiento": movimiento,
            "tickets": list
        })),
        Err(e) => error_response(e),
    }
}
