//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod catalogo_model;
pub mod dashboard_model;
pub mod elemento_model;
pub mod log_model;
pub mod mantenimiento_model;
pub mod movimiento_model;
pub mod notification_model;
pub mod observacion_model;
pub mod pagination_model;
pub mod ticket_model;
pub mod usuario_model;
