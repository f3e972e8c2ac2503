//! services/auth_service.rs
//! Usuarios, contraseñas (bcrypt) y sesiones guardadas en la base de datos.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::errors::{validar, AppError};
use crate::models::usuario_model::{
    CrearUsuarioRequest, LoginRequest, Rol, Sesion, Usuario, UsuarioConHash,
};

/// Nombre de la cookie que transporta el token de sesión.
pub const SESSION_COOKIE: &str = "inventario_session";

const USUARIO_COLUMNAS: &str = "id, nombre, email, rol, activo, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct AuthService {
    db_pool: Pool<Sqlite>,
    session_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(db_pool: Pool<Sqlite>, session_ttl_hours: i64) -> Self {
        AuthService {
            db_pool,
            session_ttl: Duration::hours(session_ttl_hours),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .context("Tarea de hash interrumpida")?
            .context("Fallo al generar hash de contraseña")
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .context("Tarea de verificación interrumpida")?
            .context("Hash de contraseña inválido")
    }

    pub async fn crear_usuario(&self, req: CrearUsuarioRequest) -> Result<Usuario> {
        validar(&req)?;
        let email = req.email.trim().to_lowercase();

        let existe: Option<String> = sqlx::query_scalar("SELECT id FROM usuarios WHERE email = ?1")
            .bind(&email)
            .fetch_optional(&self.db_pool)
            .await?;
        if existe.is_some() {
            return Err(AppError::Conflicto(format!("Ya existe un usuario con email {}", email)).into());
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let hash = self.hash_password(&req.password).await?;

        sqlx::query(
            r#"
            INSERT INTO usuarios (id, nombre, email, password_hash, rol, activo, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(req.nombre.trim())
        .bind(&email)
        .bind(&hash)
        .bind(req.rol)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar usuario")?;

        log::info!("Usuario creado: {} ({:?})", email, req.rol);
        self.obtener_usuario(&id).await
    }

    pub async fn obtener_usuario(&self, id: &str) -> Result<Usuario> {
        sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {USUARIO_COLUMNAS} FROM usuarios WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(|| AppError::NoEncontrado(format!("usuario {}", id)).into())
    }

    pub async fn listar_usuarios(&self) -> Result<Vec<Usuario>> {
        let usuarios = sqlx::query_as::<_, Usuario>(&format!(
            "SELECT {USUARIO_COLUMNAS} FROM usuarios ORDER BY nombre"
        ))
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar usuarios")?;
        Ok(usuarios)
    }

    /// Crea el primer administrador si la tabla de usuarios está vacía.
    pub async fn asegurar_admin(&self, email: &str, password: &str, nombre: &str) -> Result<bool> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&self.db_pool)
            .await?;
        if total > 0 {
            return Ok(false);
        }
        self.crear_usuario(CrearUsuarioRequest {
            nombre: nombre.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            rol: Rol::Admin,
        })
        .await
        .context("No se pudo crear el administrador inicial")?;
        Ok(true)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<Sesion> {
        validar(&req)?;
        let email = req.email.trim().to_lowercase();

        let credenciales_invalidas = || AppError::NoAutorizado("Credenciales inválidas".into());

        let registro = sqlx::query_as::<_, UsuarioConHash>(&format!(
            "SELECT {USUARIO_COLUMNAS}, password_hash FROM usuarios WHERE email = ?1"
        ))
        .bind(&email)
        .fetch_optional(&self.db_pool)
        .await?
        .ok_or_else(credenciales_invalidas)?;

        if !self
            .verify_password(&req.password, &registro.password_hash)
            .await?
        {
            log::warn!("Login fallido para {}", email);
            return Err(credenciales_invalidas().into());
        }
        if !registro.usuario.activo {
            return Err(AppError::NoAutorizado("Usuario inactivo".into()).into());
        }

        let token = Uuid::new_v4().simple().to_string();
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        sqlx::query(
            "INSERT INTO sesiones (token, usuario_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&token)
        .bind(&registro.usuario.id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.db_pool)
        .await
        .context("Fallo al crear sesión")?;

        Ok(Sesion {
            token,
            expires_at,
            usuario: registro.usuario,
        })
    }

    pub async fn logout(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sesiones WHERE token = ?1")
            .bind(token)
            .execute(&self.db_pool)
            .await
            .context("Fallo al cerrar sesión")?;
        Ok(())
    }

    /// Usuario activo dueño de una sesión vigente.
    pub async fn usuario_por_token(&self, token: &str) -> Result<Usuario> {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT u.id, u.nombre, u.email, u.rol, u.activo, u.created_at, u.updated_at
            FROM sesiones s
            JOIN usuarios u ON u.id = s.usuario_id
            WHERE s.token = ?1 AND s.expires_at > ?2 AND u.activo = 1
            "#,
        )
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await?;

        usuario.ok_or_else(|| AppError::NoAutorizado("Sesión inválida o expirada".into()).into())
    }

    pub async fn purgar_sesiones_expiradas(&self) -> Result<u64> {
        let res = sqlx::query("DELETE FROM sesiones WHERE expires_at <= ?1")
            .bind(Utc::now())
            .execute(&self.db_pool)
            .await?;
        Ok(res.rows_affected())
    }
}
