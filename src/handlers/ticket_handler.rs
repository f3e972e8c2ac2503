use actix_web::{web, HttpResponse};

use crate::handlers::{error_response, session::UsuarioActual};
use crate::models::ticket_model::TicketFiltro;
use crate::services::ticket_service::TicketService;

/// GET /api/tickets
pub async fn listar_tickets_endpoint(
    tickets: web::Data<TicketService>,
    _actual: UsuarioActual,
    query: web::Query<TicketFiltro>,
) -> HttpResponse {
    match tickets.listar(&query).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => error_response(e),
    }
}

/// GET /api/tickets/{id}
pub async fn obtener_ticket_endpoint(
    tickets: web::Data<TicketService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match tickets.obtener(&path.into_inner()).await {
        Ok(ticket) => HttpResponse::Ok().json(ticket),
        Err(e) => error_response(e),
    }
}

/// GET /api/tickets/numero/{numero}
pub async fn obtener_ticket_por_numero_endpoint(
    tickets: web::Data<TicketService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match tickets.obtener_por_numero(&path.into_inner()).await {
        Ok(ticket) => HttpResponse::Ok().json(ticket),
        Err(e) => error_response(e),
    }
}
