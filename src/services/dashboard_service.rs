use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Pool, Sqlite};

use crate::models::dashboard_model::Resumen;

const DIAS_PROXIMOS: i64 = 7;

#[derive(Clone, Debug)]
pub struct DashboardService {
    db_pool: Pool<Sqlite>,
}

impl DashboardService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        DashboardService { db_pool }
    }

    pub async fn resumen(&self, usuario_id: &str, ahora: DateTime<Utc>) -> Result<Resumen> {
        let (total_elementos, unidades_totales): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(cantidad), 0) FROM elementos")
                .fetch_one(&self.db_pool)
                .await
                .context("Fallo al contar elementos")?;

        let (prestamos_abiertos, unidades_prestadas): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(cantidad), 0) FROM movimientos
            WHERE tipo = 'SALIDA' AND devuelto_at IS NULL
            "#,
        )
        .fetch_one(&self.db_pool)
        .await
        .context("Fallo al contar préstamos")?;

        let prestamos_vencidos: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM movimientos
            WHERE tipo = 'SALIDA' AND devuelto_at IS NULL AND fecha_devolucion_prevista < ?1
            "#,
        )
        .bind(ahora)
        .fetch_one(&self.db_pool)
        .await?;

        let elementos_en_mantenimiento: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM elementos WHERE estado = 'EN_MANTENIMIENTO'")
                .fetch_one(&self.db_pool)
                .await?;

        let limite = ahora.date_naive() + Duration::days(DIAS_PROXIMOS);
        let mantenimientos_proximos: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mantenimientos WHERE estado = 'PROGRAMADO' AND fecha_programada <= ?1",
        )
        .bind(limite)
        .fetch_one(&self.db_pool)
        .await?;

        let notificaciones_no_leidas: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE (usuario_id = ?1 OR usuario_id IS NULL) AND leida = 0",
        )
        .bind(usuario_id)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(Resumen {
            total_elementos,
            unidades_totales,
            unidades_prestadas,
            prestamos_abiertos,
            prestamos_vencidos,
            elementos_en_mantenimiento,
            mantenimientos_proximos,
            notificaciones_no_leidas,
        })
    }
}
