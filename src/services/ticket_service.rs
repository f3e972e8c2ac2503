//! services/ticket_service.rs
//! Tickets de préstamo/devolución con numeración anual secuencial.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    pagination_model::{Pagina, Paginated},
    ticket_model::{FirmasTicket, Ticket, TicketFiltro, TipoTicket},
};

const TICKET_PREFIX: &str = "TK";
/// Reintentos ante colisión del número (índice UNIQUE en tickets.numero)
const MAX_INTENTOS_NUMERO: u32 = 5;
const ANCHO_SECUENCIA: usize = 5;

pub fn prefijo_anio(anio: i32) -> String {
    format!("{}-{}-", TICKET_PREFIX, anio)
}

/// Número que sigue a `ultimo` dentro del año. Sin tickets previos arranca en 1.
pub fn siguiente_numero(ultimo: Option<&str>, anio: i32) -> Result<String> {
    let prefijo = prefijo_anio(anio);
    let secuencia = match ultimo {
        None => 1,
        Some(numero) => {
            let sufijo = numero
                .strip_prefix(&prefijo)
                .ok_or_else(|| anyhow!("Ticket {} no pertenece al año {}", numero, anio))?;
            let actual: u64 = sufijo
                .parse()
                .with_context(|| format!("Secuencia de ticket inválida: {}", numero))?;
            actual + 1
        }
    };
    Ok(format!("{}{:0width$}", prefijo, secuencia, width = ANCHO_SECUENCIA))
}

#[derive(Clone, Debug)]
pub struct TicketService {
    db_pool: Pool<Sqlite>,
}

impl TicketService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        TicketService { db_pool }
    }

    pub async fn obtener(&self, id: &str) -> Result<Ticket> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("ticket {}", id)).into())
    }

    pub async fn obtener_por_numero(&self, numero: &str) -> Result<Ticket> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE numero = ?1")
            .bind(numero)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("ticket {}", numero)).into())
    }

    pub async fn por_movimiento(&self, movimiento_id: &str) -> Result<Vec<Ticket>> {
        Ok(sqlx::query_as::<_, Ticket>(
            "SELECT * FROM tickets WHERE movimiento_id = ?1 ORDER BY created_at",
        )
        .bind(movimiento_id)
        .fetch_all(&self.db_pool)
        .await?)
    }

    pub async fn listar(&self, filtro: &TicketFiltro) -> Result<Paginated<Ticket>> {
        let pagina = Pagina::new(filtro.page, filtro.page_size);
        let patron = filtro.anio.map(|anio| format!("{}%", prefijo_anio(anio)));

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tickets WHERE 1 = 1");
        if let Some(p) = &patron {
            count.push(" AND numero LIKE ").push_bind(p.as_str());
        }
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar tickets")?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM tickets WHERE 1 = 1");
        if let Some(p) = &patron {
            qb.push(" AND numero LIKE ").push_bind(p.as_str());
        }
        qb.push(" ORDER BY created_at DESC, numero DESC LIMIT ")
            .push_bind(pagina.limit())
            .push(" OFFSET ")
            .push_bind(pagina.offset());

        let items = qb
            .build_query_as::<Ticket>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar tickets")?;

        Ok(pagina.envolver(total, items))
    }

    /// Emite un ticket nuevo en la conexión/transacción recibida.
    pub(crate) async fn emitir_en(
        conn: &mut SqliteConnection,
        movimiento_id: &str,
        tipo: TipoTicket,
        firmas: &FirmasTicket,
        ahora: DateTime<Utc>,
    ) -> Result<Ticket> {
        let anio = ahora.year();
        let patron = format!("{}%", prefijo_anio(anio));

        let mut ultimo: Option<String> = sqlx::query_scalar(
            r#"
            SELECT numero FROM tickets
            WHERE numero LIKE ?1
            ORDER BY LENGTH(numero) DESC, numero DESC
            LIMIT 1
            "#,
        )
        .bind(&patron)
        .fetch_optional(&mut *conn)
        .await
        .context("Fallo al leer el último ticket")?;

        // Ante colisión se avanza desde el número ocupado, no se relee.
        for intento in 1..=MAX_INTENTOS_NUMERO {
            let numero = siguiente_numero(ultimo.as_deref(), anio)?;
            let ticket = Ticket {
                id: Uuid::new_v4().to_string(),
                numero,
                movimiento_id: movimiento_id.to_string(),
                tipo,
                firma_entrega_url: firmas.entrega.clone(),
                firma_recibe_url: firmas.recibe.clone(),
                created_at: ahora,
            };

            let insert = sqlx::query(
                r#"
                INSERT INTO tickets (
                    id, numero, movimiento_id, tipo, firma_entrega_url, firma_recibe_url, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&ticket.id)
            .bind(&ticket.numero)
            .bind(&ticket.movimiento_id)
            .bind(ticket.tipo)
            .bind(&ticket.firma_entrega_url)
            .bind(&ticket.firma_recibe_url)
            .bind(ticket.created_at)
            .execute(&mut *conn)
            .await;

            match insert {
                Ok(_) => {
                    log::info!("Ticket {} emitido para movimiento {}", ticket.numero, movimiento_id);
                    return Ok(ticket);
                }
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                    log::warn!(
                        "Colisión de número de ticket {} (intento {}/{})",
                        ticket.numero,
                        intento,
                        MAX_INTENTOS_NUMERO
                    );
                    ultimo = Some(ticket.numero);
                }
                Err(e) => return Err(e).context("Fallo al insertar ticket"),
            }
        }

        bail!(AppError::Conflicto(format!(
            "No se pudo asignar número de ticket tras {} intentos",
            MAX_INTENTOS_NUMERO
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primer_ticket_del_anio() {
        assert_eq!(siguiente_numero(None, 2026).unwrap(), "TK-2026-00001");
    }

    #[test]
    fn incrementa_la_secuencia() {
        assert_eq!(
            siguiente_numero(Some("TK-2026-00041"), 2026).unwrap(),
            "TK-2026-00042"
        );
    }

    #[test]
    fn supera_el_ancho_sin_perder_orden() {
        assert_eq!(
            siguiente_numero(Some("TK-2026-99999"), 2026).unwrap(),
            "TK-2026-100000"
        );
    }

    #[test]
    fn rechaza_numeros_de_otro_anio_o_corruptos() {
        assert!(siguiente_numero(Some("TK-2025-00003"), 2026).is_err());
        assert!(siguiente_numero(Some("TK-2026-abc"), 2026).is_err());
    }
}
