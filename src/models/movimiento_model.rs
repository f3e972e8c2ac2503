//! models/movimiento_model.rs
//! Préstamos (SALIDA) y devoluciones (ENTRADA).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ticket_model::Ticket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMovimiento {
    Salida,
    Entrada,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Movimiento {
    pub id: String,
    pub elemento_id: String,
    pub tipo: TipoMovimiento,
    pub cantidad: i64,
    pub solicitante: String,
    pub dependencia: Option<String>,
    pub usuario_id: Option<String>,
    pub fecha_devolucion_prevista: Option<DateTime<Utc>>,
    pub devuelto_at: Option<DateTime<Utc>>,
    pub movimiento_origen_id: Option<String>,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Movimiento {
    /// Una SALIDA sin devolución registrada.
    pub fn esta_abierto(&self) -> bool {
        self.tipo == TipoMovimiento::Salida && self.devuelto_at.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PrestamoRequest {
    #[validate(length(min = 1, message = "El elemento es obligatorio"))]
    pub elemento_id: String,
    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
    pub cantidad: i64,
    #[validate(
        length(min = 1, max = 160, message = "El solicitante es obligatorio"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub solicitante: String,
    #[validate(length(max = 160))]
    pub dependencia: Option<String>,
    pub fecha_devolucion_prevista: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub observaciones: Option<String>,
    pub firma_entrega: Option<String>,
    pub firma_recibe: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DevolucionRequest {
    #[validate(length(max = 2000))]
    pub observaciones: Option<String>,
    pub firma_entrega: Option<String>,
    pub firma_recibe: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovimientoFiltro {
    pub elemento_id: Option<String>,
    pub tipo: Option<TipoMovimiento>,
    pub abiertos: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Resultado de registrar un préstamo o una devolución.
#[derive(Debug, Clone, Serialize)]
pub struct MovimientoConTicket {
    pub movimiento: Movimiento,
    pub ticket: Ticket,
}
