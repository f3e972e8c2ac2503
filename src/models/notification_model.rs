use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoNotificacion {
    PrestamoVencido,
    MantenimientoPendiente,
    Sistema,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notificacion {
    pub id: String,
    /// None = visible para todos los usuarios
    pub usuario_id: Option<String>,
    pub titulo: String,
    pub mensaje: String,
    pub tipo: TipoNotificacion,
    pub referencia: Option<String>,
    pub leida: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NuevaNotificacion {
    pub usuario_id: Option<String>,
    pub titulo: String,
    pub mensaje: String,
    pub tipo: TipoNotificacion,
    /// Clave de deduplicación, p.ej. "prestamo_vencido:<id>"
    pub referencia: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificacionQuery {
    pub solo_no_leidas: Option<bool>,
}
