//! tests/mod.rs
//! Utilidades comunes para las pruebas de servicios sobre SQLite en memoria.

mod catalogo_tests;
mod http_tests;
mod notification_tests;
mod observacion_tests;

use std::str::FromStr;

use chrono::{Duration, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::app_config::SignatureBackend;
use crate::errors::AppError;
use crate::models::{
    catalogo_model::{CategoriaRequest, SedeRequest, UbicacionRequest},
    elemento_model::{Elemento, ElementoRequest},
    movimiento_model::PrestamoRequest,
};
use crate::services::{
    catalogo_service::CatalogoService, elemento_service::ElementoService,
    movimiento_service::MovimientoService, signature_service::SignatureService,
};

pub const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

/// Pool de una sola conexión: la base en memoria vive mientras viva la conexión.
pub async fn pool_de_prueba() -> Pool<Sqlite> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// Sede, ubicación y categoría mínimas para dar de alta elementos.
pub struct Catalogo {
    pub sede_id: String,
    pub ubicacion_id: String,
    pub categoria_id: String,
}

pub async fn catalogo_basico(pool: &Pool<Sqlite>) -> Catalogo {
    let catalogo = CatalogoService::new(pool.clone());
    let sede = catalogo
        .crear_sede(SedeRequest {
            nombre: "Sede Central".into(),
            direccion: None,
        })
        .await
        .unwrap();
    let ubicacion = catalogo
        .crear_ubicacion(UbicacionRequest {
            sede_id: sede.id.clone(),
            nombre: "Bodega 1".into(),
            descripcion: None,
        })
        .await
        .unwrap();
    let categoria = catalogo
        .crear_categoria(CategoriaRequest {
            nombre: "Audiovisuales".into(),
            descripcion: None,
        })
        .await
        .unwrap();
    Catalogo {
        sede_id: sede.id,
        ubicacion_id: ubicacion.id,
        categoria_id: categoria.id,
    }
}

pub fn elemento_request(catalogo: &Catalogo, serie: &str, cantidad: i64) -> ElementoRequest {
    ElementoRequest {
        serie: serie.into(),
        nombre: format!("Proyector {}", serie),
        marca: Some("Epson".into()),
        modelo: None,
        descripcion: None,
        cantidad,
        estado: None,
        categoria_id: catalogo.categoria_id.clone(),
        subcategoria_id: None,
        ubicacion_id: catalogo.ubicacion_id.clone(),
        valor: Some(1500.0),
        fecha_adquisicion: None,
    }
}

pub async fn crear_elemento(
    pool: &Pool<Sqlite>,
    catalogo: &Catalogo,
    serie: &str,
    cantidad: i64,
) -> Elemento {
    ElementoService::new(pool.clone())
        .crear(elemento_request(catalogo, serie, cantidad))
        .await
        .unwrap()
}

pub fn prestamo(elemento_id: &str, cantidad: i64) -> PrestamoRequest {
    PrestamoRequest {
        elemento_id: elemento_id.into(),
        cantidad,
        solicitante: "Ana Pérez".into(),
        dependencia: Some("Sistemas".into()),
        fecha_devolucion_prevista: Utc::now() + Duration::days(7),
        observaciones: None,
        firma_entrega: None,
        firma_recibe: None,
    }
}

pub fn movimiento_service(pool: &Pool<Sqlite>) -> MovimientoService {
    MovimientoService::new(pool.clone(), SignatureService::new(SignatureBackend::Inline))
}

/// Extrae el `AppError` de un error de servicio.
pub fn app_error(e: &anyhow::Error) -> &AppError {
    e.downcast_ref::<AppError>()
        .unwrap_or_else(|| panic!("se esperaba AppError, llegó: {:?}", e))
}
