use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoTicket {
    Prestamo,
    Devolucion,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: String,
    pub numero: String,
    pub movimiento_id: String,
    pub tipo: TipoTicket,
    pub firma_entrega_url: Option<String>,
    pub firma_recibe_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Firmas ya persistidas (URL o data URL) que acompañan a un ticket.
#[derive(Debug, Clone, Default)]
pub struct FirmasTicket {
    pub entrega: Option<String>,
    pub recibe: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFiltro {
    pub anio: Option<i32>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}
