//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod auth_service;
pub mod catalogo_service;
pub mod dashboard_service;
pub mod elemento_service;
pub mod email_service;
pub mod log_service;
pub mod mantenimiento_service;
pub mod movimiento_service;
pub mod notification_service;
pub mod observacion_service;
pub mod signature_service;
pub mod ticket_service;
