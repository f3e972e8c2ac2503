//! services/movimiento_service.rs
//! Préstamos (SALIDA) y devoluciones (ENTRADA) con su ticket firmado.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::{
    elemento_model::EstadoElemento,
    movimiento_model::{
        DevolucionRequest, Movimiento, MovimientoConTicket, MovimientoFiltro, PrestamoRequest,
        TipoMovimiento,
    },
    pagination_model::{Pagina, Paginated},
    ticket_model::{FirmasTicket, TipoTicket},
};
use crate::services::{
    elemento_service::{disponibilidad_en, estado_en},
    signature_service::SignatureService,
    ticket_service::TicketService,
};

#[derive(Clone, Debug)]
pub struct MovimientoService {
    db_pool: Pool<Sqlite>,
    signature_service: SignatureService,
}

impl MovimientoService {
    pub fn new(db_pool: Pool<Sqlite>, signature_service: SignatureService) -> Self {
        Self {
            db_pool,
            signature_service,
        }
    }

    pub async fn registrar_prestamo(
        &self,
        req: PrestamoRequest,
        usuario_id: Option<&str>,
    ) -> Result<MovimientoConTicket> {
        validar(&req)?;
        let ahora = Utc::now();
        if req.fecha_devolucion_prevista <= ahora {
            return Err(AppError::Validacion(
                "La fecha de devolución prevista debe ser futura".into(),
            )
            .into());
        }

        let firmas = self
            .guardar_firmas(req.firma_entrega.as_deref(), req.firma_recibe.as_deref())
            .await?;

        let mut tx = self.db_pool.begin().await?;

        // Toma el bloqueo de escritura antes de leer el stock.
        let bloqueado = sqlx::query("UPDATE elementos SET updated_at = updated_at WHERE id = ?1")
            .bind(&req.elemento_id)
            .execute(&mut *tx)
            .await?;
        if bloqueado.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("elemento {}", req.elemento_id)).into());
        }

        let estado = estado_en(&mut *tx, &req.elemento_id).await?;
        if estado != EstadoElemento::Disponible {
            return Err(AppError::Conflicto(format!(
                "El elemento no está disponible para préstamo (estado {:?})",
                estado
            ))
            .into());
        }

        let disp = disponibilidad_en(&mut *tx, &req.elemento_id).await?;
        if req.cantidad > disp.disponible {
            return Err(AppError::StockInsuficiente {
                solicitado: req.cantidad,
                disponible: disp.disponible,
            }
            .into());
        }

        let movimiento = Movimiento {
            id: Uuid::new_v4().to_string(),
            elemento_id: req.elemento_id.clone(),
            tipo: TipoMovimiento::Salida,
            cantidad: req.cantidad,
            solicitante: req.solicitante.trim().to_string(),
            dependencia: req.dependencia.clone(),
            usuario_id: usuario_id.map(str::to_string),
            fecha_devolucion_prevista: Some(req.fecha_devolucion_prevista),
            devuelto_at: None,
            movimiento_origen_id: None,
            observaciones: req.observaciones.clone(),
            created_at: ahora,
        };
        insertar_movimiento(&mut *tx, &movimiento).await?;

        let ticket =
            TicketService::emitir_en(&mut *tx, &movimiento.id, TipoTicket::Prestamo, &firmas, ahora)
                .await?;

        tx.commit().await.context("Fallo al confirmar préstamo")?;

        log::info!(
            "Préstamo {} registrado: elemento={} cantidad={} ticket={}",
            movimiento.id,
            movimiento.elemento_id,
            movimiento.cantidad,
            ticket.numero
        );
        Ok(MovimientoConTicket { movimiento, ticket })
    }

    pub async fn registrar_devolucion(
        &self,
        salida_id: &str,
        req: DevolucionRequest,
        usuario_id: Option<&str>,
    ) -> Result<MovimientoConTicket> {
        validar(&req)?;
        let salida = self.obtener(salida_id).await?;
        if salida.tipo != TipoMovimiento::Salida {
            return Err(AppError::Conflicto("Solo se pueden devolver préstamos (SALIDA)".into()).into());
        }
        if !salida.esta_abierto() {
            return Err(AppError::Conflicto(format!("El préstamo {} ya fue devuelto", salida_id)).into());
        }

        let firmas = self
            .guardar_firmas(req.firma_entrega.as_deref(), req.firma_recibe.as_deref())
            .await?;
        let ahora = Utc::now();

        let mut tx = self.db_pool.begin().await?;

        let cerrado = sqlx::query(
            r#"
            UPDATE movimientos SET devuelto_at = ?2
            WHERE id = ?1 AND tipo = 'SALIDA' AND devuelto_at IS NULL
            "#,
        )
        .bind(salida_id)
        .bind(ahora)
        .execute(&mut *tx)
        .await
        .context("Fallo al cerrar el préstamo")?;
        if cerrado.rows_affected() == 0 {
            return Err(AppError::Conflicto(format!("El préstamo {} ya fue devuelto", salida_id)).into());
        }

        let entrada = Movimiento {
            id: Uuid::new_v4().to_string(),
            elemento_id: salida.elemento_id.clone(),
            tipo: TipoMovimiento::Entrada,
            cantidad: salida.cantidad,
            solicitante: salida.solicitante.clone(),
            dependencia: salida.dependencia.clone(),
            usuario_id: usuario_id.map(str::to_string),
            fecha_devolucion_prevista: None,
            devuelto_at: None,
            movimiento_origen_id: Some(salida.id.clone()),
            observaciones: req.observaciones.clone(),
            created_at: ahora,
        };
        insertar_movimiento(&mut *tx, &entrada).await?;

        let ticket =
            TicketService::emitir_en(&mut *tx, &entrada.id, TipoTicket::Devolucion, &firmas, ahora)
                .await?;

        tx.commit().await.context("Fallo al confirmar devolución")?;

        log::info!(
            "Devolución {} registrada para préstamo {} ticket={}",
            entrada.id,
            salida_id,
            ticket.numero
        );
        Ok(MovimientoConTicket {
            movimiento: entrada,
            ticket,
        })
    }

    pub async fn obtener(&self, id: &str) -> Result<Movimiento> {
        sqlx::query_as::<_, Movimiento>("SELECT * FROM movimientos WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("movimiento {}", id)).into())
    }

    pub async fn listar(&self, filtro: &MovimientoFiltro) -> Result<Paginated<Movimiento>> {
        let pagina = Pagina::new(filtro.page, filtro.page_size);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM movimientos WHERE 1 = 1");
        aplicar_filtro(&mut count, filtro);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar movimientos")?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM movimientos WHERE 1 = 1");
        aplicar_filtro(&mut qb, filtro);
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(pagina.limit())
            .push(" OFFSET ")
            .push_bind(pagina.offset());

        let items = qb
            .build_query_as::<Movimiento>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar movimientos")?;

        Ok(pagina.envolver(total, items))
    }

    /// Préstamos abiertos cuya fecha de devolución prevista ya pasó.
    pub async fn vencidos(&self, ahora: DateTime<Utc>) -> Result<Vec<Movimiento>> {
        let rows = sqlx::query_as::<_, Movimiento>(
            r#"
            SELECT * FROM movimientos
            WHERE tipo = 'SALIDA' AND devuelto_at IS NULL
              AND fecha_devolucion_prevista IS NOT NULL
              AND fecha_devolucion_prevista < ?1
            ORDER BY fecha_devolucion_prevista
            "#,
        )
        .bind(ahora)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar préstamos vencidos")?;
        Ok(rows)
    }

    async fn guardar_firmas(
        &self,
        entrega: Option<&str>,
        recibe: Option<&str>,
    ) -> Result<FirmasTicket> {
        Ok(FirmasTicket {
            entrega: self.signature_service.guardar_opcional(entrega).await?,
            recibe: self.signature_service.guardar_opcional(recibe).await?,
        })
    }
}

async fn insertar_movimiento(conn: &mut SqliteConnection, m: &Movimiento) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO movimientos (
            id, elemento_id, tipo, cantidad, solicitante, dependencia, usuario_id,
            fecha_devolucion_prevista, devuelto_at, movimiento_origen_id, observaciones, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        "#,
    )
    .bind(&m.id)
    .bind(&m.elemento_id)
    .bind(m.tipo)
    .bind(m.cantidad)
    .bind(&m.solicitante)
    .bind(&m.dependencia)
    .bind(&m.usuario_id)
    .bind(m.fecha_devolucion_prevista)
    .bind(m.devuelto_at)
    .bind(&m.movimiento_origen_id)
    .bind(&m.observaciones)
    .bind(m.created_at)
    .execute(&mut *conn)
    .await
    .context("Fallo al insertar movimiento")?;
    Ok(())
}

fn aplicar_filtro<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filtro: &'a MovimientoFiltro) {
    if let Some(elemento_id) = &filtro.elemento_id {
        qb.push(" AND elemento_id = ").push_bind(elemento_id.as_str());
    }
    if let Some(tipo) = filtro.tipo {
        qb.push(" AND tipo = ").push_bind(tipo);
    }
    if filtro.abiertos.unwrap_or(false) {
        qb.push(" AND tipo = 'SALIDA' AND devuelto_at IS NULL");
    }
}
