//! models/mantenimiento_model.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMantenimiento {
    Preventivo,
    Correctivo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoMantenimiento {
    Programado,
    EnProceso,
    Completado,
    Cancelado,
}

impl EstadoMantenimiento {
    /// Transiciones permitidas: PROGRAMADO -> EN_PROCESO -> COMPLETADO,
    /// y cancelación desde cualquier estado abierto.
    pub fn puede_pasar_a(self, destino: EstadoMantenimiento) -> bool {
        use EstadoMantenimiento::*;
        matches!(
            (self, destino),
            (Programado, EnProceso)
                | (EnProceso, Completado)
                | (Programado, Cancelado)
                | (EnProceso, Cancelado)
        )
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Mantenimiento {
    pub id: String,
    pub elemento_id: String,
    pub tipo: TipoMantenimiento,
    pub descripcion: String,
    pub fecha_programada: NaiveDate,
    pub responsable: Option<String>,
    pub costo: Option<f64>,
    pub frecuencia_dias: Option<i64>,
    pub estado: EstadoMantenimiento,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProgramarMantenimientoRequest {
    #[validate(length(min = 1, message = "El elemento es obligatorio"))]
    pub elemento_id: String,
    pub tipo: TipoMantenimiento,
    #[validate(
        length(min = 1, max = 2000, message = "La descripción es obligatoria"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub descripcion: String,
    pub fecha_programada: NaiveDate,
    #[validate(length(max = 160))]
    pub responsable: Option<String>,
    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    pub costo: Option<f64>,
    #[validate(range(min = 1, max = 3650, message = "La frecuencia debe estar entre 1 y 3650 días"))]
    pub frecuencia_dias: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompletarMantenimientoRequest {
    #[validate(range(min = 0.0, message = "El costo no puede ser negativo"))]
    pub costo: Option<f64>,
    #[validate(length(max = 2000))]
    pub notas: Option<String>,
}

/// Resultado de completar: el registro cerrado y, si es periódico, el siguiente.
#[derive(Debug, Clone, Serialize)]
pub struct MantenimientoCompletado {
    pub mantenimiento: Mantenimiento,
    pub siguiente: Option<Mantenimiento>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MantenimientoFiltro {
    pub elemento_id: Option<String>,
    pub estado: Option<EstadoMantenimiento>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::EstadoMantenimiento::*;

    #[test]
    fn transiciones_validas() {
        assert!(Programado.puede_pasar_a(EnProceso));
        assert!(EnProceso.puede_pasar_a(Completado));
        assert!(Programado.puede_pasar_a(Cancelado));
    }

    #[test]
    fn transiciones_invalidas() {
        assert!(!Programado.puede_pasar_a(Completado));
        assert!(!Completado.puede_pasar_a(Cancelado));
        assert!(!Cancelado.puede_pasar_a(EnProceso));
    }
}
