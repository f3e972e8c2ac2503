//! models/catalogo_model.rs
//! Sedes, ubicaciones, categorías y subcategorías.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Sede {
    pub id: String,
    pub nombre: String,
    pub direccion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SedeRequest {
    #[validate(
        length(min = 1, max = 120, message = "El nombre es obligatorio (máx. 120)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(length(max = 255))]
    pub direccion: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Ubicacion {
    pub id: String,
    pub sede_id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UbicacionRequest {
    #[validate(length(min = 1, message = "La sede es obligatoria"))]
    pub sede_id: String,
    #[validate(
        length(min = 1, max = 120, message = "El nombre es obligatorio (máx. 120)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(length(max = 500))]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Categoria {
    pub id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoriaRequest {
    #[validate(
        length(min = 1, max = 120, message = "El nombre es obligatorio (máx. 120)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(length(max = 500))]
    pub descripcion: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Subcategoria {
    pub id: String,
    pub categoria_id: String,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubcategoriaRequest {
    #[validate(length(min = 1, message = "La categoría es obligatoria"))]
    pub categoria_id: String,
    #[validate(
        length(min = 1, max = 120, message = "El nombre es obligatorio (máx. 120)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(length(max = 500))]
    pub descripcion: Option<String>,
}
