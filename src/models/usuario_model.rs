use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rol {
    Admin,
    Operador,
}

/// Usuario tal como se expone (sin hash de contraseña).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Usuario {
    pub id: String,
    pub nombre: String,
    pub email: String,
    pub rol: Rol,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Usuario {
    pub fn es_admin(&self) -> bool {
        self.rol == Rol::Admin
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsuarioConHash {
    #[sqlx(flatten)]
    pub usuario: Usuario,
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CrearUsuarioRequest {
    #[validate(
        length(min = 1, max = 120, message = "El nombre es obligatorio"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub nombre: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 8, message = "La contraseña debe tener al menos 8 caracteres"))]
    pub password: String,
    pub rol: Rol,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sesion {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub usuario: Usuario,
}
