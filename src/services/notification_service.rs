//! services/notification_service.rs
//! Notificaciones internas (préstamos vencidos, mantenimientos pendientes)
//! con reenvío opcional por correo.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::notification_model::{Notificacion, NuevaNotificacion, TipoNotificacion};
use crate::services::{
    email_service::EmailService, mantenimiento_service::MantenimientoService,
    movimiento_service::MovimientoService,
};

#[derive(Clone, Debug)]
pub struct NotificationService {
    db_pool: Pool<Sqlite>,
    movimiento_service: MovimientoService,
    mantenimiento_service: MantenimientoService,
    email_service: Option<EmailService>,
}

impl NotificationService {
    pub fn new(
        db_pool: Pool<Sqlite>,
        movimiento_service: MovimientoService,
        mantenimiento_service: MantenimientoService,
        email_service: Option<EmailService>,
    ) -> Self {
        Self {
            db_pool,
            movimiento_service,
            mantenimiento_service,
            email_service,
        }
    }

    /// Crea la notificación. Devuelve `None` si ya existía una con la misma referencia.
    pub async fn crear(&self, nueva: NuevaNotificacion) -> Result<Option<Notificacion>> {
        let notificacion = Notificacion {
            id: Uuid::new_v4().to_string(),
            usuario_id: nueva.usuario_id,
            titulo: nueva.titulo,
            mensaje: nueva.mensaje,
            tipo: nueva.tipo,
            referencia: nueva.referencia,
            leida: false,
            created_at: Utc::now(),
        };

        let res = sqlx::query(
            r#"
            INSERT OR IGNORE INTO notifications (
                id, usuario_id, titulo, mensaje, tipo, referencia, leida, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)
            "#,
        )
        .bind(&notificacion.id)
        .bind(&notificacion.usuario_id)
        .bind(&notificacion.titulo)
        .bind(&notificacion.mensaje)
        .bind(notificacion.tipo)
        .bind(&notificacion.referencia)
        .bind(notificacion.created_at)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar notificación")?;

        if res.rows_affected() == 0 {
            return Ok(None);
        }

        self.reenviar_por_email(&notificacion);
        Ok(Some(notificacion))
    }

    /// Notificaciones visibles para el usuario (propias y generales).
    pub async fn listar(&self, usuario_id: &str, solo_no_leidas: bool) -> Result<Vec<Notificacion>> {
        let sql = if solo_no_leidas {
            r#"SELECT * FROM notifications
               WHERE (usuario_id = ?1 OR usuario_id IS NULL) AND leida = 0
               ORDER BY created_at DESC"#
        } else {
            r#"SELECT * FROM notifications
               WHERE (usuario_id = ?1 OR usuario_id IS NULL)
               ORDER BY created_at DESC"#
        };
        Ok(sqlx::query_as::<_, Notificacion>(sql)
            .bind(usuario_id)
            .fetch_all(&self.db_pool)
            .await?)
    }

    pub async fn contar_no_leidas(&self, usuario_id: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE (usuario_id = ?1 OR usuario_id IS NULL) AND leida = 0",
        )
        .bind(usuario_id)
        .fetch_one(&self.db_pool)
        .await?)
    }

    pub async fn marcar_leida(&self, id: &str, usuario_id: &str) -> Result<()> {
        let res = sqlx::query(
            "UPDATE notifications SET leida = 1 WHERE id = ?1 AND (usuario_id = ?2 OR usuario_id IS NULL)",
        )
        .bind(id)
        .bind(usuario_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar notificación")?;
        if res.rows_affected() == 0 {
            return Err(AppError::NoEncontrado(format!("notificación {}", id)).into());
        }
        Ok(())
    }

    pub async fn marcar_todas_leidas(&self, usuario_id: &str) -> Result<u64> {
        let res = sqlx::query(
            "UPDATE notifications SET leida = 1 WHERE (usuario_id = ?1 OR usuario_id IS NULL) AND leida = 0",
        )
        .bind(usuario_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar notificaciones")?;
        Ok(res.rows_affected())
    }

    /// Genera avisos para préstamos vencidos y mantenimientos que ya tocan.
    /// Cada préstamo/mantenimiento se notifica una sola vez.
    pub async fn revisar_vencimientos(&self, ahora: DateTime<Utc>) -> Result<usize> {
        let mut creadas = 0;

        for prestamo in self.movimiento_service.vencidos(ahora).await? {
            let fecha = prestamo
                .fecha_devolucion_prevista
                .map(|f| f.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            let nueva = NuevaNotificacion {
                usuario_id: None,
                titulo: "Préstamo vencido".to_string(),
                mensaje: format!(
                    "{} unidad(es) del elemento {} prestadas a {} debían devolverse el {}",
                    prestamo.cantidad, prestamo.elemento_id, prestamo.solicitante, fecha
                ),
                tipo: TipoNotificacion::PrestamoVencido,
                referencia: Some(format!("prestamo_vencido:{}", prestamo.id)),
            };
            if self.crear(nueva).await?.is_some() {
                creadas += 1;
            }
        }

        let hoy = ahora.date_naive();
        for mantenimiento in self.mantenimiento_service.proximos(hoy, 0).await? {
            let nueva = NuevaNotificacion {
                usuario_id: None,
                titulo: "Mantenimiento pendiente".to_string(),
                mensaje: format!(
                    "Mantenimiento {:?} del elemento {} programado para el {}: {}",
                    mantenimiento.tipo,
                    mantenimiento.elemento_id,
                    mantenimiento.fecha_programada,
                    mantenimiento.descripcion
                ),
                tipo: TipoNotificacion::MantenimientoPendiente,
                referencia: Some(format!("mantenimiento_pendiente:{}", mantenimiento.id)),
            };
            if self.crear(nueva).await?.is_some() {
                creadas += 1;
            }
        }

        if creadas > 0 {
            log::info!("(revisar_vencimientos) {} notificaciones nuevas", creadas);
        }
        Ok(creadas)
    }

    fn reenviar_por_email(&self, notificacion: &Notificacion) {
        let Some(email_service) = self.email_service.clone() else {
            return;
        };
        if !email_service.tiene_destinatarios() {
            return;
        }

        let titulo = notificacion.titulo.clone();
        let mensaje = notificacion.mensaje.clone();
        let id = notificacion.id.clone();
        tokio::spawn(async move {
            match email_service.enviar_aviso(&titulo, &mensaje).await {
                Ok(_) => log::info!("Notificación {} enviada por correo", id),
                Err(e) => log::error!("Fallo al enviar notificación {} por correo: {:?}", id, e),
            }
        });
    }
}
