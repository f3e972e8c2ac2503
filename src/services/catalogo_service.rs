//! services/catalogo_service.rs
//! Catálogos de apoyo: sedes, ubicaciones, categorías y subcategorías.

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::catalogo_model::{
    Categoria, CategoriaRequest, Sede, SedeRequest, Subcategoria, SubcategoriaRequest, Ubicacion,
    UbicacionRequest,
};

#[derive(Clone, Debug)]
pub struct CatalogoService {
    db_pool: Pool<Sqlite>,
}

impl CatalogoService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CatalogoService { db_pool }
    }

    // ======================================================
    // Sedes
    // ======================================================

    pub async fn crear_sede(&self, req: SedeRequest) -> Result<Sede> {
        validar(&req)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sedes (id, nombre, direccion, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
        )
        .bind(&id)
        .bind(req.nombre.trim())
        .bind(&req.direccion)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar sede")?;

        self.obtener_sede(&id).await
    }

    pub async fn listar_sedes(&self) -> Result<Vec<Sede>> {
        Ok(sqlx::query_as::<_, Sede>("SELECT * FROM sedes ORDER BY nombre")
            .fetch_all(&self.db_pool)
            .await?)
    }

    pub async fn obtener_sede(&self, id: &str) -> Result<Sede> {
        sqlx::query_as::<_, Sede>("SELECT * FROM sedes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("sede {}", id)).into())
    }

    pub async fn actualizar_sede(&self, id: &str, req: SedeRequest) -> Result<Sede> {
        validar(&req)?;
        let res = sqlx::query(
            "UPDATE sedes SET nombre = ?2, direccion = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(req.nombre.trim())
        .bind(&req.direccion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar sede")?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("sede {}", id)).into());
        }
        self.obtener_sede(id).await
    }

    pub async fn eliminar_sede(&self, id: &str) -> Result<()> {
        self.exigir_sin_dependientes("ubicaciones", "sede_id", id, "la sede tiene ubicaciones")
            .await?;
        self.eliminar("sedes", id, "sede").await
    }

    // ======================================================
    // Ubicaciones
    // ======================================================

    pub async fn crear_ubicacion(&self, req: UbicacionRequest) -> Result<Ubicacion> {
        validar(&req)?;
        self.obtener_sede(&req.sede_id).await?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO ubicaciones (id, sede_id, nombre, descripcion, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(&req.sede_id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar ubicación")?;

        self.obtener_ubicacion(&id).await
    }

    pub async fn listar_ubicaciones(&self, sede_id: Option<&str>) -> Result<Vec<Ubicacion>> {
        let rows = match sede_id {
            Some(sede) => {
                sqlx::query_as::<_, Ubicacion>(
                    "SELECT * FROM ubicaciones WHERE sede_id = ?1 ORDER BY nombre",
                )
                .bind(sede)
                .fetch_all(&self.db_pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Ubicacion>("SELECT * FROM ubicaciones ORDER BY nombre")
                    .fetch_all(&self.db_pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn obtener_ubicacion(&self, id: &str) -> Result<Ubicacion> {
        sqlx::query_as::<_, Ubicacion>("SELECT * FROM ubicaciones WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("ubicación {}", id)).into())
    }

    pub async fn actualizar_ubicacion(&self, id: &str, req: UbicacionRequest) -> Result<Ubicacion> {
        validar(&req)?;
        self.obtener_sede(&req.sede_id).await?;
        let res = sqlx::query(
            r#"
            UPDATE ubicaciones
            SET sede_id = ?2, nombre = ?3, descripcion = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.sede_id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar ubicación")?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("ubicación {}", id)).into());
        }
        self.obtener_ubicacion(id).await
    }

    pub async fn eliminar_ubicacion(&self, id: &str) -> Result<()> {
        self.exigir_sin_dependientes(
            "elementos",
            "ubicacion_id",
            id,
            "hay elementos en esta ubicación",
        )
        .await?;
        self.eliminar("ubicaciones", id, "ubicación").await
    }

    // ======================================================
    // Categorías
    // ======================================================

    pub async fn crear_categoria(&self, req: CategoriaRequest) -> Result<Categoria> {
        validar(&req)?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO categorias (id, nombre, descripcion, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar categoría")?;

        self.obtener_categoria(&id).await
    }

    pub async fn listar_categorias(&self) -> Result<Vec<Categoria>> {
        Ok(
            sqlx::query_as::<_, Categoria>("SELECT * FROM categorias ORDER BY nombre")
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    pub async fn obtener_categoria(&self, id: &str) -> Result<Categoria> {
        sqlx::query_as::<_, Categoria>("SELECT * FROM categorias WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("categoría {}", id)).into())
    }

    pub async fn actualizar_categoria(&self, id: &str, req: CategoriaRequest) -> Result<Categoria> {
        validar(&req)?;
        let res = sqlx::query(
            "UPDATE categorias SET nombre = ?2, descripcion = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar categoría")?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("categoría {}", id)).into());
        }
        self.obtener_categoria(id).await
    }

    pub async fn eliminar_categoria(&self, id: &str) -> Result<()> {
        self.exigir_sin_dependientes(
            "subcategorias",
            "categoria_id",
            id,
            "la categoría tiene subcategorías",
        )
        .await?;
        self.exigir_sin_dependientes(
            "elementos",
            "categoria_id",
            id,
            "hay elementos en esta categoría",
        )
        .await?;
        self.eliminar("categorias", id, "categoría").await
    }

    // ======================================================
    // Subcategorías
    // ======================================================

    pub async fn crear_subcategoria(&self, req: SubcategoriaRequest) -> Result<Subcategoria> {
        validar(&req)?;
        self.obtener_categoria(&req.categoria_id).await?;
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO subcategorias (id, categoria_id, nombre, descripcion, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(&req.categoria_id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar subcategoría")?;

        self.obtener_subcategoria(&id).await
    }

    pub async fn listar_subcategorias(&self, categoria_id: Option<&str>) -> Result<Vec<Subcategoria>> {
        let rows = match categoria_id {
            Some(cat) => {
                sqlx::query_as::<_, Subcategoria>(
                    "SELECT * FROM subcategorias WHERE categoria_id = ?1 ORDER BY nombre",
                )
                .bind(cat)
                .fetch_all(&self.db_pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Subcategoria>("SELECT * FROM subcategorias ORDER BY nombre")
                    .fetch_all(&self.db_pool)
                    .await?
            }
        };
        Ok(rows)
    }

    pub async fn obtener_subcategoria(&self, id: &str) -> Result<Subcategoria> {
        sqlx::query_as::<_, Subcategoria>("SELECT * FROM subcategorias WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::NoEncontrado(format!("subcategoría {}", id)).into())
    }

    pub async fn actualizar_subcategoria(
        &self,
        id: &str,
        req: SubcategoriaRequest,
    ) -> Result<Subcategoria> {
        validar(&req)?;
        self.obtener_categoria(&req.categoria_id).await?;
        let actual = self.obtener_subcategoria(id).await?;
        if actual.categoria_id != req.categoria_id {
            // Los elementos guardan categoría y subcategoría por separado.
            let en_uso: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM elementos WHERE subcategoria_id = ?1")
                    .bind(id)
                    .fetch_one(&self.db_pool)
                    .await?;
            if en_uso > 0 {
                return Err(AppError::Conflicto(
                    "No se puede cambiar la categoría: hay elementos en esta subcategoría".into(),
                )
                .into());
            }
        }
        let res = sqlx::query(
            r#"
            UPDATE subcategorias
            SET categoria_id = ?2, nombre = ?3, descripcion = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&req.categoria_id)
        .bind(req.nombre.trim())
        .bind(&req.descripcion)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar subcategoría")?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("subcategoría {}", id)).into());
        }
        self.obtener_subcategoria(id).await
    }

    pub async fn eliminar_subcategoria(&self, id: &str) -> Result<()> {
        self.exigir_sin_dependientes(
            "elementos",
            "subcategoria_id",
            id,
            "hay elementos en esta subcategoría",
        )
        .await?;
        self.eliminar("subcategorias", id, "subcategoría").await
    }

    // ------------------------------------------------------
    // Utilidades comunes
    // ------------------------------------------------------

    async fn exigir_sin_dependientes(
        &self,
        tabla: &str,
        columna: &str,
        id: &str,
        motivo: &str,
    ) -> Result<()> {
        let sql = format!("SELECT COUNT(*) FROM {tabla} WHERE {columna} = ?1");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.db_pool)
            .await?;
        if total > 0 {
            return Err(AppError::Conflicto(format!("No se puede eliminar: {}", motivo)).into());
        }
        Ok(())
    }

    async fn eliminar(&self, tabla: &str, id: &str, etiqueta: &str) -> Result<()> {
        let sql = format!("DELETE FROM {tabla} WHERE id = ?1");
        let res = sqlx::query(&sql)
            .bind(id)
            .execute(&self.db_pool)
            .await
            .with_context(|| format!("Fallo al eliminar {}", etiqueta))?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("{} {}", etiqueta, id)).into());
        }
        Ok(())
    }
}
