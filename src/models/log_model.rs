use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LogRecord {
    pub id: String,
    pub usuario_id: Option<String>,
    pub accion: String,
    pub entidad: String,
    pub entidad_id: Option<String>,
    /// JSON adicional
    pub detalles: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accion {
    Crear,
    Actualizar,
    Eliminar,
    Prestar,
    Devolver,
    Login,
    Logout,
}

impl Accion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accion::Crear => "CREAR",
            Accion::Actualizar => "ACTUALIZAR",
            Accion::Eliminar => "ELIMINAR",
            Accion::Prestar => "PRESTAR",
            Accion::Devolver => "DEVOLVER",
            Accion::Login => "LOGIN",
            Accion::Logout => "LOGOUT",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFiltro {
    pub entidad: Option<String>,
    pub entidad_id: Option<String>,
    pub usuario_id: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}
