//! services/elemento_service.rs
//! Alta, consulta y mantenimiento de elementos, con su disponibilidad.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::{
    elemento_model::{Disponibilidad, Elemento, ElementoFiltro, ElementoRequest, EstadoElemento},
    pagination_model::{Pagina, Paginated},
};

/// Unidades prestadas de un elemento: suma de SALIDAs sin devolución.
const PRESTADO_SQL: &str = r#"
    SELECT COALESCE(SUM(cantidad), 0)
    FROM movimientos
    WHERE elemento_id = ?1 AND tipo = 'SALIDA' AND devuelto_at IS NULL
"#;

const ELEMENTO_SELECT: &str = r#"
    SELECT
        e.id, e.serie, e.nombre, e.marca, e.modelo, e.descripcion, e.cantidad, e.estado,
        e.categoria_id, e.subcategoria_id, e.ubicacion_id, e.valor, e.fecha_adquisicion,
        e.created_at, e.updated_at,
        MAX(e.cantidad - COALESCE((
            SELECT SUM(m.cantidad) FROM movimientos m
            WHERE m.elemento_id = e.id AND m.tipo = 'SALIDA' AND m.devuelto_at IS NULL
        ), 0), 0) AS disponible
    FROM elementos e
"#;

#[derive(Clone, Debug)]
pub struct ElementoService {
    db_pool: Pool<Sqlite>,
}

impl ElementoService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ElementoService { db_pool }
    }

    pub async fn crear(&self, req: ElementoRequest) -> Result<Elemento> {
        validar(&req)?;
        self.validar_referencias(&req).await?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let estado = req.estado.unwrap_or(EstadoElemento::Disponible);

        sqlx::query(
            r#"
            INSERT INTO elementos (
                id, serie, nombre, marca, modelo, descripcion, cantidad, estado,
                categoria_id, subcategoria_id, ubicacion_id, valor, fecha_adquisicion,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)
            "#,
        )
        .bind(&id)
        .bind(req.serie.trim())
        .bind(req.nombre.trim())
        .bind(&req.marca)
        .bind(&req.modelo)
        .bind(&req.descripcion)
        .bind(req.cantidad)
        .bind(estado)
        .bind(&req.categoria_id)
        .bind(&req.subcategoria_id)
        .bind(&req.ubicacion_id)
        .bind(req.valor)
        .bind(req.fecha_adquisicion)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar elemento")?;

        log::info!("Elemento creado: {} ({})", req.serie, id);
        self.obtener(&id).await
    }

    pub async fn obtener(&self, id: &str) -> Result<Elemento> {
        sqlx::query_as::<_, Elemento>(&format!("{ELEMENTO_SELECT} WHERE e.id = ?1"))
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("elemento {}", id)).into())
    }

    pub async fn listar(&self, filtro: &ElementoFiltro) -> Result<Paginated<Elemento>> {
        let pagina = Pagina::new(filtro.page, filtro.page_size);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM elementos e WHERE 1 = 1");
        aplicar_filtro(&mut count, filtro);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.db_pool)
            .await
            .context("Fallo al contar elementos")?;

        let mut qb = QueryBuilder::<Sqlite>::new(ELEMENTO_SELECT);
        qb.push(" WHERE 1 = 1");
        aplicar_filtro(&mut qb, filtro);
        qb.push(" ORDER BY e.nombre, e.serie LIMIT ")
            .push_bind(pagina.limit())
            .push(" OFFSET ")
            .push_bind(pagina.offset());

        let items = qb
            .build_query_as::<Elemento>()
            .fetch_all(&self.db_pool)
            .await
            .context("Fallo al listar elementos")?;

        Ok(pagina.envolver(total, items))
    }

    pub async fn actualizar(&self, id: &str, req: ElementoRequest) -> Result<Elemento> {
        validar(&req)?;
        self.validar_referencias(&req).await?;

        let mut tx = self.db_pool.begin().await?;
        let bloqueado = sqlx::query("UPDATE elementos SET updated_at = updated_at WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if bloqueado.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("elemento {}", id)).into());
        }

        let disp = disponibilidad_en(&mut *tx, id).await?;
        if req.cantidad < disp.prestado {
            return Err(AppError::Conflicto(format!(
                "La cantidad ({}) no puede ser menor a las unidades prestadas ({})",
                req.cantidad, disp.prestado
            ))
            .into());
        }

        let estado_actual = estado_en(&mut *tx, id).await?;
        let estado = req.estado.unwrap_or(estado_actual);
        if estado != estado_actual {
            exigir_cambio_de_estado(&mut *tx, id, estado_actual, estado, disp.prestado).await?;
        }

        sqlx::query(
            r#"
            UPDATE elementos
            SET serie = ?2, nombre = ?3, marca = ?4, modelo = ?5, descripcion = ?6,
                cantidad = ?7, estado = ?8, categoria_id = ?9, subcategoria_id = ?10,
                ubicacion_id = ?11, valor = ?12, fecha_adquisicion = ?13, updated_at = ?14
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(req.serie.trim())
        .bind(req.nombre.trim())
        .bind(&req.marca)
        .bind(&req.modelo)
        .bind(&req.descripcion)
        .bind(req.cantidad)
        .bind(estado)
        .bind(&req.categoria_id)
        .bind(&req.subcategoria_id)
        .bind(&req.ubicacion_id)
        .bind(req.valor)
        .bind(req.fecha_adquisicion)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .context("Fallo al actualizar elemento")?;
        tx.commit().await?;

        self.obtener(id).await
    }

    pub async fn eliminar(&self, id: &str) -> Result<()> {
        let disp = self.disponibilidad(id).await?;
        if disp.prestado > 0 {
            return Err(AppError::Conflicto(format!(
                "El elemento tiene {} unidades prestadas",
                disp.prestado
            ))
            .into());
        }

        sqlx::query("DELETE FROM elementos WHERE id = ?1")
            .bind(id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al eliminar elemento")?;
        log::info!("Elemento eliminado: {}", id);
        Ok(())
    }

    pub async fn disponibilidad(&self, id: &str) -> Result<Disponibilidad> {
        let mut conn = self.db_pool.acquire().await?;
        disponibilidad_en(&mut *conn, id).await
    }

    async fn validar_referencias(&self, req: &ElementoRequest) -> Result<()> {
        let categoria: Option<String> = sqlx::query_scalar("SELECT id FROM categorias WHERE id = ?1")
            .bind(&req.categoria_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if categoria.is_none() {
            return Err(AppError::Validacion(format!("categoría inexistente: {}", req.categoria_id)).into());
        }

        let ubicacion: Option<String> = sqlx::query_scalar("SELECT id FROM ubicaciones WHERE id = ?1")
            .bind(&req.ubicacion_id)
            .fetch_optional(&self.db_pool)
            .await?;
        if ubicacion.is_none() {
            return Err(AppError::Validacion(format!("ubicación inexistente: {}", req.ubicacion_id)).into());
        }

        if let Some(sub_id) = &req.subcategoria_id {
            let padre: Option<String> =
                sqlx::query_scalar("SELECT categoria_id FROM subcategorias WHERE id = ?1")
                    .bind(sub_id)
                    .fetch_optional(&self.db_pool)
                    .await?;
            match padre {
                None => {
                    return Err(AppError::Validacion(format!("subcategoría inexistente: {}", sub_id)).into())
                }
                Some(cat) if cat != req.categoria_id => {
                    return Err(AppError::Validacion(
                        "la subcategoría no pertenece a la categoría indicada".into(),
                    )
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Calcula la disponibilidad dentro de una conexión o transacción abierta.
pub(crate) async fn disponibilidad_en(
    conn: &mut SqliteConnection,
    elemento_id: &str,
) -> Result<Disponibilidad> {
    let total: Option<i64> = sqlx::query_scalar("SELECT cantidad FROM elementos WHERE id = ?1")
        .bind(elemento_id)
        .fetch_optional(&mut *conn)
        .await?;
    let total = total.ok_or_else(|| AppError::NoEncontrado(format!("elemento {}", elemento_id)))?;

    let prestado: i64 = sqlx::query_scalar(PRESTADO_SQL)
        .bind(elemento_id)
        .fetch_one(&mut *conn)
        .await
        .context("Fallo al calcular unidades prestadas")?;

    Ok(Disponibilidad::calcular(total, prestado))
}

pub(crate) async fn cambiar_estado_en(
    conn: &mut SqliteConnection,
    elemento_id: &str,
    estado: EstadoElemento,
) -> Result<()> {
    sqlx::query("UPDATE elementos SET estado = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(elemento_id)
        .bind(estado)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .context("Fallo al cambiar estado del elemento")?;
    Ok(())
}

pub(crate) async fn estado_en(
    conn: &mut SqliteConnection,
    elemento_id: &str,
) -> Result<EstadoElemento> {
    let estado: Option<EstadoElemento> =
        sqlx::query_scalar("SELECT estado FROM elementos WHERE id = ?1")
            .bind(elemento_id)
            .fetch_optional(&mut *conn)
            .await?;
    estado.ok_or_else(|| AppError::NoEncontrado(format!("elemento {}", elemento_id)).into())
}

/// Reglas para un cambio manual de estado: no se retiran ni se mandan a
/// mantenimiento unidades prestadas, y un mantenimiento en curso solo se
/// libera completándolo o cancelándolo.
async fn exigir_cambio_de_estado(
    conn: &mut SqliteConnection,
    elemento_id: &str,
    actual: EstadoElemento,
    nuevo: EstadoElemento,
    prestado: i64,
) -> Result<()> {
    if prestado > 0
        && matches!(nuevo, EstadoElemento::DadoDeBaja | EstadoElemento::EnMantenimiento)
    {
        return Err(AppError::Conflicto(format!(
            "El elemento tiene {} unidades prestadas",
            prestado
        ))
        .into());
    }
    if actual == EstadoElemento::EnMantenimiento {
        let en_proceso: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mantenimientos WHERE elemento_id = ?1 AND estado = 'EN_PROCESO'",
        )
        .bind(elemento_id)
        .fetch_one(&mut *conn)
        .await?;
        if en_proceso > 0 {
            return Err(AppError::Conflicto(
                "El elemento tiene un mantenimiento en proceso".into(),
            )
            .into());
        }
    }
    Ok(())
}

/// Patrón LIKE en minúsculas ASCII, igual que `LOWER` de SQLite, con los
/// comodines escapados para `ESCAPE '\'`.
fn patron_like(q: &str) -> String {
    let mut patron = String::with_capacity(q.len() + 2);
    patron.push('%');
    for c in q.to_ascii_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            patron.push('\\');
        }
        patron.push(c);
    }
    patron.push('%');
    patron
}

fn aplicar_filtro<'a>(qb: &mut QueryBuilder<'a, Sqlite>, filtro: &'a ElementoFiltro) {
    if let Some(categoria_id) = &filtro.categoria_id {
        qb.push(" AND e.categoria_id = ").push_bind(categoria_id.as_str());
    }
    if let Some(subcategoria_id) = &filtro.subcategoria_id {
        qb.push(" AND e.subcategoria_id = ").push_bind(subcategoria_id.as_str());
    }
    if let Some(ubicacion_id) = &filtro.ubicacion_id {
        qb.push(" AND e.ubicacion_id = ").push_bind(ubicacion_id.as_str());
    }
    if let Some(estado) = filtro.estado {
        qb.push(" AND e.estado = ").push_bind(estado);
    }
    if let Some(q) = filtro.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        // LOWER de SQLite solo pliega ASCII: "Ñ" y "ñ" no se igualan.
        let patron = patron_like(q);
        qb.push(" AND (LOWER(e.serie) LIKE ")
            .push_bind(patron.clone())
            .push(" ESCAPE '\\' OR LOWER(e.nombre) LIKE ")
            .push_bind(patron.clone())
            .push(" ESCAPE '\\' OR LOWER(COALESCE(e.marca, '')) LIKE ")
            .push_bind(patron.clone())
            .push(" ESCAPE '\\' OR LOWER(COALESCE(e.modelo, '')) LIKE ")
            .push_bind(patron)
            .push(" ESCAPE '\\')");
    }
}
