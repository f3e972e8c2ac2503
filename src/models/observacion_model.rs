use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Observacion {
    pub id: String,
    pub elemento_id: String,
    pub usuario_id: Option<String>,
    pub texto: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ObservacionRequest {
    #[validate(
        length(min = 1, max = 2000, message = "El texto es obligatorio (máx. 2000)"),
        custom(function = "crate::errors::no_en_blanco")
    )]
    pub texto: String,
}
