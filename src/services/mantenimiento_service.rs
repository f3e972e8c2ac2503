//! services/mantenimiento_service.rs
//! Programación y ciclo de vida de mantenimientos.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::{
    elemento_model::EstadoElemento,
    mantenimiento_model::{
        CompletarMantenimientoRequest, EstadoMantenimiento, Mantenimiento,
        MantenimientoCompletado, MantenimientoFiltro, ProgramarMantenimientoRequest,
    },
    pagination_model::{Pagina, Paginated},
};
use crate::services::elemento_service::{cambiar_estado_en, disponibilidad_en, estado_en};

#[derive(Clone, Debug)]
pub struct MantenimientoService {
    db_pool: Pool<Sqlite>,
}

impl MantenimientoService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        MantenimientoService { db_pool }
    }

    pub async fn programar(&self, req: ProgramarMantenimientoRequest) -> Result<Mantenimiento> {
        validar(&req)?;
        let mut conn = self.db_pool.acquire().await?;
        let estado = estado_en(&mut *conn, &req.elemento_id).await?;
        if estado == EstadoElemento::DadoDeBaja {
            return Err(AppError::Conflicto("El elemento está dado de baja".into()).into());
        }

        let now = Utc::now();
        let mantenimiento = Mantenimiento {
            id: Uuid::new_v4().to_string(),
            elemento_id: req.elemento_id,
            tipo: req.tipo,
            descripcion: req.descripcion.trim().to_string(),
            fecha_programada: req.fecha_programada,
            responsable: req.responsable,
            costo: req.costo,
            frecuencia_dias: req.frecuencia_dias,
            estado: EstadoMantenimiento::Programado,
            fecha_inicio: None,
            fecha_fin: None,
            notas: None,
            created_at: now,
            updated_at: now,
        };
        insertar(&mut *conn, &mantenimiento).await?;

        log::info!(
            "Mantenimiento {} programado para {} el {}",
            mantenimiento.id,
            mantenimiento.elemento_id,
            mantenimiento.fecha_programada
        );
        Ok(mantenimiento)
    }

    pub async fn iniciar(&self, id: &str) -> Result<Mantenimiento> {
        let mut tx = self.db_pool.begin().await?;
        let actual = obtener_en(&mut *tx, id).await?;
        exigir_transicion(&actual, EstadoMantenimiento::EnProceso)?;

        // Bloqueo de escritura antes de leer stock y estado.
        sqlx::query("UPDATE elementos SET updated_at = updated_at WHERE id = ?1")
            .bind(&actual.elemento_id)
            .execute(&mut *tx)
            .await?;

        let disp = disponibilidad_en(&mut *tx, &actual.elemento_id).await?;
        if disp.prestado > 0 {
            return Err(AppError::Conflicto(format!(
                "El elemento tiene {} unidades prestadas",
                disp.prestado
            ))
            .into());
        }
        let estado = estado_en(&mut *tx, &actual.elemento_id).await?;
        if estado != EstadoElemento::Disponible {
            return Err(AppError::Conflicto(format!(
                "El elemento no está disponible para mantenimiento (estado {:?})",
                estado
            ))
            .into());
        }

        let now = Utc::now();
        sqlx::query(
            "UPDATE mantenimientos SET estado = ?2, fecha_inicio = ?3, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(EstadoMantenimiento::EnProceso)
        .bind(now)
        .execute(&mut *tx)
        .await
        .context("Fallo al iniciar mantenimiento")?;
        cambiar_estado_en(&mut *tx, &actual.elemento_id, EstadoElemento::EnMantenimiento).await?;

        let actualizado = obtener_en(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(actualizado)
    }

    pub async fn completar(
        &self,
        id: &str,
        req: CompletarMantenimientoRequest,
    ) -> Result<MantenimientoCompletado> {
        validar(&req)?;
        let mut tx = self.db_pool.begin().await?;
        let actual = obtener_en(&mut *tx, id).await?;
        exigir_transicion(&actual, EstadoMantenimiento::Completado)?;

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE mantenimientos
            SET estado = ?2, fecha_fin = ?3, costo = ?4, notas = ?5, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(EstadoMantenimiento::Completado)
        .bind(now)
        .bind(req.costo.or(actual.costo))
        .bind(req.notas.clone().or(actual.notas.clone()))
        .execute(&mut *tx)
        .await
        .context("Fallo al completar mantenimiento")?;
        restaurar_disponible(&mut *tx, &actual.elemento_id).await?;

        let siguiente = match actual.frecuencia_dias {
            Some(dias) => {
                let siguiente = Mantenimiento {
                    id: Uuid::new_v4().to_string(),
                    fecha_programada: siguiente_fecha(now.date_naive(), dias),
                    estado: EstadoMantenimiento::Programado,
                    costo: None,
                    fecha_inicio: None,
                    fecha_fin: None,
                    notas: None,
                    created_at: now,
                    updated_at: now,
                    ..actual.clone()
                };
                insertar(&mut *tx, &siguiente).await?;
                Some(siguiente)
            }
            None => None,
        };

        let mantenimiento = obtener_en(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(MantenimientoCompletado {
            mantenimiento,
            siguiente,
        })
    }

    pub async fn cancelar(&self, id: &str) -> Result<Mantenimiento> {
        let mut tx = self.db_pool.begin().await?;
        let actual = obtener_en(&mut *tx, id).await?;
        exigir_transicion(&actual, EstadoMantenimiento::Cancelado)?;

        sqlx::query("UPDATE mantenimientos SET estado = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(EstadoMantenimiento::Cancelado)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .context("Fallo al cancelar mantenimiento")?;
        if actual.estado == EstadoMantenimiento::EnProceso {
            restaurar_disponible(&mut *tx, &actual.elemento_id).await?;
        }

        let actualizado = obtener_en(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(actualizado)
    }

    pub async fn obtener(&self, id: &str) -> Result<Mantenimiento> {
        let mut conn = self.db_pool.acquire().await?;
        obtener_en(&mut *conn, id).await
    }

    pub async fn listar(&self, filtro: &MantenimientoFiltro) -> Result<Paginated<Mantenimiento>> {
        let pagina = Pagina::new(filtro.page, filtro.page_size);

        let mut count =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM mantenimientos WHERE 1 = 1");
        aplicar_filtro(&mut count, filtro);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar mantenimientos")?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM mantenimientos WHERE 1 = 1");
        aplicar_filtro(&mut qb, filtro);
        qb.push(" ORDER BY fecha_programada DESC, created_at DESC LIMIT ")
            .push_bind(pagina.limit())
            .push(" OFFSET ")
            .push_bind(pagina.offset());

        let items = qb
            .build_query_as::<Mantenimiento>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar mantenimientos")?;

        Ok(pagina.envolver(total, items))
    }

    /// Mantenimientos programados que vencen dentro de `dias` (incluye atrasados).
    pub async fn proximos(&self, hoy: NaiveDate, dias: i64) -> Result<Vec<Mantenimiento>> {
        let limite = hoy + Duration::days(dias.max(0));
        Ok(sqlx::query_as::<_, Mantenimiento>(
            r#"
            SELECT * FROM mantenimientos
            WHERE estado = 'PROGRAMADO' AND fecha_programada <= ?1
            ORDER BY fecha_programada
            "#,
        )
        .bind(limite)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar mantenimientos próximos")?)
    }
}

pub fn siguiente_fecha(desde: NaiveDate, frecuencia_dias: i64) -> NaiveDate {
    desde + Duration::days(frecuencia_dias)
}

fn exigir_transicion(actual: &Mantenimiento, destino: EstadoMantenimiento) -> Result<()> {
    if !actual.estado.puede_pasar_a(destino) {
        return Err(AppError::Conflicto(format!(
            "No se puede pasar de {:?} a {:?}",
            actual.estado, destino
        ))
        .into());
    }
    Ok(())
}

/// Devuelve el elemento a DISPONIBLE si seguía en mantenimiento y no queda
/// otro mantenimiento EN_PROCESO sobre él.
async fn restaurar_disponible(conn: &mut SqliteConnection, elemento_id: &str) -> Result<()> {
    let en_proceso: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM mantenimientos WHERE elemento_id = ?1 AND estado = 'EN_PROCESO'",
    )
    .bind(elemento_id)
    .fetch_one(&mut *conn)
    .await?;
    if en_proceso > 0 {
        return Ok(());
    }
    if estado_en(&mut *conn, elemento_id).await? == EstadoElemento::EnMantenimiento {
        cambiar_estado_en(&mut *conn, elemento_id, EstadoElemento::Disponible).await?;
    }
    Ok(())
}

async fn obtener_en(conn: &mut SqliteConnection, id: &str) -> Result<Mantenimiento> {
    sqlx::query_as::<_, Mantenimiento>("SELECT * FROM mantenimientos WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NoEncontrado(format!("mantenimiento {}", id)).into())
}

async fn insertar(conn: &mut SqliteConnection, m: &Mantenimiento) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO mantenimientos (
            id, elemento_id, tipo, descripcion, fecha_programada, responsable, costo,
            frecuencia_dias, estado, fecha_inicio, fecha_fin, notas, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&m.id)
    .bind(&m.elemento_id)
    .bind(m.tipo)
    .bind(&m.descripcion)
    .bind(m.fecha_programada)
    .bind(&m.responsable)
    .bind(m.costo)
    .bind(m.frecuencia_dias)
    .bind(m.estado)
    .bind(m.fecha_inicio)
    .bind(m.fecha_fin)
    .bind(&m.notas)
    .bind(m.created_at)
    .bind(m.updated_at)
    .execute(&mut *conn)
    .await
    .context("Fallo al insertar mantenimiento")?;
    Ok(())
}

fn aplicar_filtro<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filtro: &'a MantenimientoFiltro) {
    if let Some(elemento_id) = &filtro.elemento_id {
        qb.push(" AND elemento_id = ").push_bind(elemento_id.as_str());
    }
    if let Some(estado) = filtro.estado {
        qb.push(" AND estado = ").push_bind(estado);
    }
}
