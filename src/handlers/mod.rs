//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers HTTP y la traducción de errores.

pub mod auth_handler;
pub mod catalogo_handler;
pub mod dashboard_handler;
pub mod elemento_handler;
pub mod log_handler;
pub mod mantenimiento_handler;
pub mod movimiento_handler;
pub mod notification_handler;
pub mod observacion_handler;
pub mod session;
pub mod ticket_handler;
pub mod upload_handler;

use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

use crate::errors::AppError;

/// Código HTTP y mensaje público para un error de servicio.
pub fn clasificar_error(e: &anyhow::Error) -> (StatusCode, String) {
    if let Some(app) = e.downcast_ref::<AppError>() {
        let status = match app {
            AppError::Validacion(_) => StatusCode::BAD_REQUEST,
            AppError::NoEncontrado(_) => StatusCode::NOT_FOUND,
            AppError::Conflicto(_) | AppError::StockInsuficiente { .. } => StatusCode::CONFLICT,
            AppError::NoAutorizado(_) => StatusCode::UNAUTHORIZED,
            AppError::Prohibido(_) => StatusCode::FORBIDDEN,
            AppError::Almacenamiento(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        return (status, app.to_string());
    }

    if let Some(db) = e.downcast_ref::<sqlx::Error>() {
        match db {
            sqlx::Error::RowNotFound => {
                return (StatusCode::NOT_FOUND, "Registro no encontrado".to_string())
            }
            sqlx::Error::Database(d) if d.is_unique_violation() => {
                return (
                    StatusCode::CONFLICT,
                    "Ya existe un registro con esos datos".to_string(),
                )
            }
            sqlx::Error::Database(d) if d.is_foreign_key_violation() => {
                return (
                    StatusCode::CONFLICT,
                    "El registro está referenciado o la referencia no existe".to_string(),
                )
            }
            _ => {}
        }
    }

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Respuesta JSON de error; los 5xx incluyen el detalle y quedan en el log.
pub fn error_response(e: anyhow::Error) -> HttpResponse {
    let (status, mensaje) = clasificar_error(&e);

    if status.is_server_error() {
        log::error!("Error interno: {:?}", e);
        HttpResponse::build(status).json(json!({
            "success": false,
            "error": mensaje,
            "details": format!("{:?}", e)
        }))
    } else {
        log::debug!("Petición rechazada ({}): {}", status, mensaje);
        HttpResponse::build(status).json(json!({
            "success": false,
            "error": mensaje
        }))
    }
}
