//! tests/notification_tests.rs
//! Avisos de vencimiento y su deduplicación.

use actix_rt::test;
use chrono::{Duration, Utc};

use super::*;
use crate::models::{
    mantenimiento_model::{ProgramarMantenimientoRequest, TipoMantenimiento},
    notification_model::{NuevaNotificacion, TipoNotificacion},
};
use crate::services::{
    dashboard_service::DashboardService, mantenimiento_service::MantenimientoService,
    notification_service::NotificationService,
};

fn notification_service(pool: &Pool<Sqlite>) -> NotificationService {
    NotificationService::new(
        pool.clone(),
        movimiento_service(pool),
        MantenimientoService::new(pool.clone()),
        None,
    )
}

#[test]
async fn revisar_vencimientos_notifica_una_sola_vez() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elemento = crear_elemento(&pool, &catalogo, "NOT-001", 2).await;

    movimiento_service(&pool)
        .registrar_prestamo(prestamo(&elemento.id, 1), None)
        .await
        .unwrap();
    MantenimientoService::new(pool.clone())
        .programar(ProgramarMantenimientoRequest {
            elemento_id: elemento.id.clone(),
            tipo: TipoMantenimiento::Correctivo,
            descripcion: "Cambio de lámpara".into(),
            fecha_programada: Utc::now().date_naive(),
            responsable: None,
            costo: None,
            frecuencia_dias: None,
        })
        .await
        .unwrap();

    let service = notification_service(&pool);

    // Hoy solo vence el mantenimiento
    assert_eq!(service.revisar_vencimientos(Utc::now()).await.unwrap(), 1);

    // Dentro de ocho días el préstamo también está vencido
    let despues = Utc::now() + Duration::days(8);
    assert_eq!(service.revisar_vencimientos(despues).await.unwrap(), 1);
    assert_eq!(service.revisar_vencimientos(despues).await.unwrap(), 0);

    let todas = service.listar("cualquier-usuario", false).await.unwrap();
    assert_eq!(todas.len(), 2);
    assert!(todas
        .iter()
        .any(|n| n.tipo == TipoNotificacion::PrestamoVencido));
    assert!(todas
        .iter()
        .any(|n| n.tipo == TipoNotificacion::MantenimientoPendiente));
}

#[test]
async fn lectura_de_notificaciones() {
    let pool = pool_de_prueba().await;
    let service = notification_service(&pool);

    let nueva = |referencia: &str| NuevaNotificacion {
        usuario_id: None,
        titulo: "Aviso".into(),
        mensaje: "Mensaje de prueba".into(),
        tipo: TipoNotificacion::Sistema,
        referencia: Some(referencia.into()),
    };

    let primera = service.crear(nueva("sistema:1")).await.unwrap().unwrap();
    assert!(service.crear(nueva("sistema:1")).await.unwrap().is_none());
    service.crear(nueva("sistema:2")).await.unwrap().unwrap();

    assert_eq!(service.contar_no_leidas("u1").await.unwrap(), 2);
    service.marcar_leida(&primera.id, "u1").await.unwrap();
    assert_eq!(service.contar_no_leidas("u1").await.unwrap(), 1);
    assert_eq!(service.listar("u1", true).await.unwrap().len(), 1);

    assert_eq!(service.marcar_todas_leidas("u1").await.unwrap(), 1);
    assert_eq!(service.contar_no_leidas("u1").await.unwrap(), 0);

    let err = service.marcar_leida("no-existe", "u1").await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::NoEncontrado(_)));
}

#[test]
async fn resumen_del_dashboard() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let a = crear_elemento(&pool, &catalogo, "DSH-001", 4).await;
    crear_elemento(&pool, &catalogo, "DSH-002", 1).await;

    movimiento_service(&pool)
        .registrar_prestamo(prestamo(&a.id, 3), None)
        .await
        .unwrap();

    let resumen = DashboardService::new(pool.clone())
        .resumen("u1", Utc::now())
        .await
        .unwrap();
    assert_eq!(resumen.total_elementos, 2);
    assert_eq!(resumen.unidades_totales, 5);
    assert_eq!(resumen.unidades_prestadas, 3);
    assert_eq!(resumen.prestamos_abiertos, 1);
    assert_eq!(resumen.prestamos_vencidos, 0);
    assert_eq!(resumen.elementos_en_mantenimiento, 0);
    assert_eq!(resumen.notificaciones_no_leidas, 0);

    let futuro = DashboardService::new(pool.clone())
        .resumen("u1", Utc::now() + Duration::days(8))
        .await
        .unwrap();
    assert_eq!(futuro.prestamos_vencidos, 1);
}
