//! services/log_service.rs
//! Bitácora de auditoría: quién hizo qué sobre qué entidad.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite};
use uuid::Uuid;

use crate::models::{
    log_model::{Accion, LogFiltro, LogRecord},
    pagination_model::{Pagina, Paginated},
};

#[derive(Clone, Debug)]
pub struct LogService {
    db_pool: Pool<Sqlite>,
}

impl LogService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        LogService { db_pool }
    }

    pub async fn registrar(
        &self,
        usuario_id: Option<&str>,
        accion: Accion,
        entidad: &str,
        entidad_id: Option<&str>,
        detalles: Option<serde_json::Value>,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let detalles = detalles.map(|d| d.to_string());

        sqlx::query(
            r#"
            INSERT INTO logs (id, usuario_id, accion, entidad, entidad_id, detalles, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&id)
        .bind(usuario_id)
        .bind(accion.as_str())
        .bind(entidad)
        .bind(entidad_id)
        .bind(detalles)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar log")?;

        Ok(id)
    }

    /// Igual que `registrar`, pero un fallo solo queda en el log del proceso.
    pub async fn auditar(
        &self,
        usuario_id: &str,
        accion: Accion,
        entidad: &str,
        entidad_id: &str,
        detalles: Option<serde_json::Value>,
    ) {
        if let Err(e) = self
            .registrar(Some(usuario_id), accion, entidad, Some(entidad_id), detalles)
            .await
        {
            log::warn!(
                "No se pudo registrar auditoría {} {} {}: {:?}",
                accion.as_str(),
                entidad,
                entidad_id,
                e
            );
        }
    }

    pub async fn listar(&self, filtro: &LogFiltro) -> Result<Paginated<LogRecord>> {
        let pagina = Pagina::new(filtro.page, filtro.page_size);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM logs WHERE 1 = 1");
        aplicar_filtro(&mut count, filtro);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar logs")?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, usuario_id, accion, entidad, entidad_id, detalles, created_at FROM logs WHERE 1 = 1",
        );
        aplicar_filtro(&mut qb, filtro);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagina.limit())
            .push(" OFFSET ")
            .push_bind(pagina.offset());

        let items = qb
            .build_query_as::<LogRecord>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar logs")?;

        Ok(pagina.envolver(total, items))
    }
}

fn aplicar_filtro<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filtro: &'a LogFiltro) {
    if let Some(entidad) = &filtro.entidad {
        qb.push(" AND entidad = ").push_bind(entidad);
    }
    if let Some(entidad_id) = &filtro.entidad_id {
        qb.push(" AND entidad_id = ").push_bind(entidad_id);
    }
    if let Some(usuario_id) = &filtro.usuario_id {
        qb.push(" AND usuario_id = ").push_bind(usuario_id);
    }
}
