//! errors.rs
//! Errores de dominio que los handlers traducen a códigos HTTP.

use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Datos inválidos: {0}")]
    Validacion(String),

    #[error("No encontrado: {0}")]
    NoEncontrado(String),

    #[error("Conflicto: {0}")]
    Conflicto(String),

    #[error("Stock insuficiente: solicitado {solicitado}, disponible {disponible}")]
    StockInsuficiente { solicitado: i64, disponible: i64 },

    #[error("No autorizado: {0}")]
    NoAutorizado(String),

    #[error("Acceso denegado: {0}")]
    Prohibido(String),

    #[error("Error de almacenamiento: {0}")]
    Almacenamiento(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validacion(errors.to_string())
    }
}

/// Valida un request con `validator` y lo convierte en `AppError::Validacion`.
pub fn validar<T: validator::Validate>(req: &T) -> anyhow::Result<()> {
    req.validate().map_err(AppError::from)?;
    Ok(())
}

/// Rechaza textos obligatorios que solo contienen espacios.
pub fn no_en_blanco(valor: &str) -> Result<(), ValidationError> {
    if valor.trim().is_empty() {
        let mut error = ValidationError::new("en_blanco");
        error.message = Some("El texto no puede estar en blanco".into());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Demo {
        #[validate(length(min = 1, message = "requerido"))]
        nombre: String,
    }

    #[test]
    fn validar_convierte_en_error_de_validacion() {
        let err = validar(&Demo {
            nombre: String::new(),
        })
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Validacion(msg)) if msg.contains("requerido")
        ));
    }

    #[test]
    fn texto_solo_con_espacios_no_es_valido() {
        assert!(no_en_blanco("  \t ").is_err());
        assert!(no_en_blanco(" Bodega ").is_ok());
    }

    #[test]
    fn stock_insuficiente_describe_cantidades() {
        let e = AppError::StockInsuficiente {
            solicitado: 5,
            disponible: 2,
        };
        assert_eq!(
            e.to_string(),
            "Stock insuficiente: solicitado 5, disponible 2"
        );
    }
}
