use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::{
    observacion_model::{Observacion, ObservacionRequest},
    usuario_model::Usuario,
};

#[derive(Clone, Debug)]
pub struct ObservacionService {
    db_pool: Pool<Sqlite>,
}

impl ObservacionService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ObservacionService { db_pool }
    }

    pub async fn crear(
        &self,
        elemento_id: &str,
        req: ObservacionRequest,
        usuario_id: Option<&str>,
    ) -> Result<Observacion> {
        validar(&req)?;
        let existe: Option<String> = sqlx::query_scalar("SELECT id FROM elementos WHERE id = ?1")
            .bind(elemento_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if existe.is_none() {
            return Err(AppError::NoEncontrado(format!("elemento {}", elemento_id)).into());
        }

        let observacion = Observacion {
            id: Uuid::new_v4().to_string(),
            elemento_id: elemento_id.to_string(),
            usuario_id: usuario_id.map(str::to_string),
            texto: req.texto.trim().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO observaciones (id, elemento_id, usuario_id, texto, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&observacion.id)
        .bind(&observacion.elemento_id)
        .bind(&observacion.usuario_id)
        .bind(&observacion.texto)
        .bind(observacion.created_at)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar observación")?;

        Ok(observacion)
    }

    /// Observaciones de un elemento, la más reciente primero.
    pub async fn listar(&self, elemento_id: &str) -> Result<Vec<Observacion>> {
        Ok(sqlx::query_as::<_, Observacion>(
            "SELECT * FROM observaciones WHERE elemento_id = ?1 ORDER BY created_at DESC",
        )
        .bind(elemento_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    pub async fn eliminar(&self, id: &str, usuario: &Usuario) -> Result<()> {
        let autor: Option<Option<String>> =
            sqlx::query_scalar("SELECT usuario_id FROM observaciones WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.db_pool)
                .await?;
        let autor = autor.ok_or_else(|| AppError::NoEncontrado(format!("observación {}", id)))?;

        if !usuario.es_admin() && autor.as_deref() != Some(usuario.id.as_str()) {
            return Err(AppError::Prohibido("Solo el autor o un administrador puede eliminarla".into()).into());
        }

        sqlx::query("DELETE FROM observaciones WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al eliminar observación")?;
        Ok(())
    }
}
