//! models/elemento_model.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoElemento {
    Disponible,
    EnMantenimiento,
    DadoDeBaja,
}

/// Elemento con su disponibilidad calculada a partir de los préstamos abiertos.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Elemento {
    pub id: String,
    pub serie: String,
    pub nombre: String,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub descripcion: Option<String>,
    pub cantidad: i64,
    pub estado: EstadoElemento,
    pub categoria_id: String,
    pub subcategoria_id: Option<String>,
    pub ubicacion_id: String,
    pub valor: Option<f64>,
    pub fecha_adquisicion: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub disponible: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ElementoRequest {
    #[validate(
        length(min = 1, max = 80, message = "La serie es obligatoria (máx. 80)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub serie: String,
    #[validate(
        length(min = 1, max = 160, message = "El nombre es obligatorio (máx. 160)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(length(max = 120))]
    pub marca: Option<String>,
    #[validate(length(max = 120))]
    pub modelo: Option<String>,
    #[validate(length(max = 2000))]
    pub descripcion: Option<String>,
    #[validate(range(min = 1, message = "La cantidad debe ser al menos 1"))]
    pub cantidad: i64,
    pub estado: Option<EstadoElemento>,
    #[validate(length(min = 1, message = "La categoría es obligatoria"))]
    pub categoria_id: String,
    pub subcategoria_id: Option<String>,
    #[validate(length(min = 1, message = "La ubicación es obligatoria"))]
    pub ubicacion_id: String,
    #[validate(range(min = 0.0, message = "El valor no puede ser negativo"))]
    pub valor: Option<f64>,
    pub fecha_adquisicion: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementoFiltro {
    pub categoria_id: Option<String>,
    pub subcategoria_id: Option<String>,
    pub ubicacion_id: Option<String>,
    pub estado: Option<EstadoElemento>,
    pub q: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Disponibilidad {
    pub total: i64,
    pub prestado: i64,
    pub disponible: i64,
}

impl Disponibilidad {
    /// disponible = total - prestado, nunca por debajo de cero.
    pub fn calcular(total: i64, prestado: i64) -> Self {
        Disponibilidad {
            total,
            prestado,
            disponible: (total - prestado).max(0),
        }
    }
}
