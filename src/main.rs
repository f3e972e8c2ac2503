use std::str::FromStr;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::config::app_config::{AppConfig, SignatureBackend};
use crate::logger::init_logger;
use crate::services::{
    auth_service::AuthService, catalogo_service::CatalogoService,
    dashboard_service::DashboardService, elemento_service::ElementoService,
    email_service::EmailService, log_service::LogService,
    mantenimiento_service::MantenimientoService, movimiento_service::MovimientoService,
    notification_service::NotificationService, observacion_service::ObservacionService,
    signature_service::SignatureService, ticket_service::TicketService,
};

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

/// Límite del cuerpo JSON; una firma de 2 MiB ocupa ~2.7 MiB en base64.
const JSON_LIMIT: usize = 4 * 1024 * 1024;

async fn setup_database(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("DATABASE_URL inválida: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let archivo = options.clone().get_filename();
    if let Some(dir) = archivo.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("No se pudo crear el directorio {:?}", dir))?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite")?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Fallo en migraciones")?;

    Ok(db_pool)
}

/// Revisa vencimientos y purga sesiones cada `intervalo`.
fn spawn_sweeper(notificaciones: NotificationService, auth: AuthService, intervalo: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(intervalo);
        loop {
            ticker.tick().await;
            match notificaciones.revisar_vencimientos(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(n) => log::info!("Barrido: {} notificaciones nuevas", n),
                Err(e) => log::error!("Error revisando vencimientos: {:?}", e),
            }
            if let Err(e) = auth.purgar_sesiones_expiradas().await {
                log::error!("Error purgando sesiones: {:?}", e);
            }
        }
    });
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    init_logger();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    let db_pool = setup_database(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let log_service = LogService::new(db_pool.clone());
    let auth_service = AuthService::new(db_pool.clone(), config.session_ttl_hours);
    let catalogo_service = CatalogoService::new(db_pool.clone());
    let elemento_service = ElementoService::new(db_pool.clone());
    let signature_service = SignatureService::new(config.signature_backend.clone());
    let ticket_service = TicketService::new(db_pool.clone());
    let movimiento_service = MovimientoService::new(db_pool.clone(), signature_service.clone());
    let observacion_service = ObservacionService::new(db_pool.clone());
    let mantenimiento_service = MantenimientoService::new(db_pool.clone());
    let email_service = config.smtp.clone().map(EmailService::new);
    let notification_service = NotificationService::new(
        db_pool.clone(),
        movimiento_service.clone(),
        mantenimiento_service.clone(),
        email_service,
    );
    let dashboard_service = DashboardService::new(db_pool.clone());

    if let Some(seed) = &config.admin_seed {
        match auth_service
            .asegurar_admin(&seed.email, &seed.password, &seed.nombre)
            .await
        {
            Ok(true) => log::info!("Administrador inicial creado: {}", seed.email),
            Ok(false) => {}
            Err(e) => log::error!("No se pudo crear el administrador inicial: {:?}", e),
        }
    }

    spawn_sweeper(
        notification_service.clone(),
        auth_service.clone(),
        Duration::from_secs(config.sweep_interval_secs.max(1)),
    );

    let archivos_locales = match signature_service.backend() {
        SignatureBackend::Local {
            upload_dir,
            public_prefix,
        } => {
            std::fs::create_dir_all(upload_dir)?;
            Some((public_prefix.clone(), upload_dir.clone()))
        }
        _ => None,
    };

    log::info!(
        "Levantando servidor en {}:{} (firmas: {})",
        config.host,
        config.port,
        signature_service.backend().nombre()
    );
    HttpServer::new(move || {
        let archivos_locales = archivos_locales.clone();
        App::new()
            .app_data(web::JsonConfig::default().limit(JSON_LIMIT))
            .app_data(web::Data::new(log_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(catalogo_service.clone()))
            .app_data(web::Data::new(elemento_service.clone()))
            .app_data(web::Data::new(signature_service.clone()))
            .app_data(web::Data::new(ticket_service.clone()))
            .app_data(web::Data::new(movimiento_service.clone()))
            .app_data(web::Data::new(observacion_service.clone()))
            .app_data(web::Data::new(mantenimiento_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .configure(app::init_app)
            .configure(move |cfg| {
                if let Some((prefijo, dir)) = archivos_locales {
                    cfg.service(actix_files::Files::new(&prefijo, dir));
                }
            })
    })
    .workers(config.workers.max(1))
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
