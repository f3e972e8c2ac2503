//! tests/observacion_tests.rs
//! Observaciones por elemento y bitácora de auditoría.

use actix_rt::test;
use std::time::Duration as StdDuration;

use super::auth_tests::auth_service;
use super::*;
use crate::models::{
    log_model::{Accion, LogFiltro},
    observacion_model::ObservacionRequest,
    usuario_model::{CrearUsuarioRequest, Rol, Usuario},
};
use crate::services::{log_service::LogService, observacion_service::ObservacionService};

async fn usuario(pool: &Pool<Sqlite>, email: &str, rol: Rol) -> Usuario {
    auth_service(pool, 12)
        .crear_usuario(CrearUsuarioRequest {
            nombre: "Usuario de prueba".into(),
            email: email.into(),
            password: "secreto123".into(),
            rol,
        })
        .await
        .unwrap()
}

fn nota(texto: &str) -> ObservacionRequest {
    ObservacionRequest {
        texto: texto.into(),
    }
}

#[test]
async fn observaciones_se_listan_de_la_mas_reciente() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elemento = crear_elemento(&pool, &catalogo, "OBS-001", 1).await;
    let autora = usuario(&pool, "ana@ejemplo.com", Rol::Operador).await;
    let service = ObservacionService::new(pool.clone());

    let primera = service
        .crear(&elemento.id, nota("  Llegó con el cable dañado "), Some(&autora.id))
        .await
        .unwrap();
    assert_eq!(primera.texto, "Llegó con el cable dañado");
    tokio::time::sleep(StdDuration::from_millis(5)).await;
    service
        .crear(&elemento.id, nota("Cable reemplazado"), None)
        .await
        .unwrap();

    let todas = service.listar(&elemento.id).await.unwrap();
    assert_eq!(todas.len(), 2);
    assert_eq!(todas[0].texto, "Cable reemplazado");
    assert_eq!(todas[1].usuario_id.as_deref(), Some(autora.id.as_str()));

    let err = service
        .crear("no-existe", nota("Sin elemento"), None)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::NoEncontrado(_)));
    let err = service
        .crear(&elemento.id, nota("   "), None)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));
}

#[test]
async fn solo_el_autor_o_un_admin_eliminan() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elemento = crear_elemento(&pool, &catalogo, "OBS-002", 1).await;
    let autora = usuario(&pool, "ana@ejemplo.com", Rol::Operador).await;
    let otro = usuario(&pool, "luis@ejemplo.com", Rol::Operador).await;
    let admin = usuario(&pool, "admin@ejemplo.com", Rol::Admin).await;
    let service = ObservacionService::new(pool.clone());

    let propia = service
        .crear(&elemento.id, nota("Revisar lente"), Some(&autora.id))
        .await
        .unwrap();
    let ajena = service
        .crear(&elemento.id, nota("Falta control remoto"), Some(&autora.id))
        .await
        .unwrap();

    let err = service.eliminar(&propia.id, &otro).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::Prohibido(_)));

    service.eliminar(&propia.id, &autora).await.unwrap();
    service.eliminar(&ajena.id, &admin).await.unwrap();
    assert!(service.listar(&elemento.id).await.unwrap().is_empty());

    let err = service.eliminar(&propia.id, &admin).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::NoEncontrado(_)));
}

#[test]
async fn bitacora_filtra_por_entidad_y_usuario() {
    let pool = pool_de_prueba().await;
    let ana = usuario(&pool, "ana@ejemplo.com", Rol::Operador).await;
    let luis = usuario(&pool, "luis@ejemplo.com", Rol::Admin).await;
    let logs = LogService::new(pool.clone());

    logs.auditar(&ana.id, Accion::Crear, "elemento", "e-1", None).await;
    logs.auditar(
        &ana.id,
        Accion::Prestar,
        "movimiento",
        "m-1",
        Some(serde_json::json!({ "cantidad": 2 })),
    )
    .await;
    logs.auditar(&luis.id, Accion::Actualizar, "elemento", "e-1", None).await;
    logs.registrar(None, Accion::Login, "sesion", None, None)
        .await
        .unwrap();

    let todo = logs.listar(&LogFiltro::default()).await.unwrap();
    assert_eq!(todo.total, 4);

    let del_elemento = logs
        .listar(&LogFiltro {
            entidad: Some("elemento".into()),
            entidad_id: Some("e-1".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(del_elemento.total, 2);

    let de_ana = logs
        .listar(&LogFiltro {
            usuario_id: Some(ana.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(de_ana.total, 2);
    let prestamo = de_ana.items.iter().find(|l| l.accion == "PRESTAR").unwrap();
    assert_eq!(prestamo.detalles.as_deref(), Some(r#"{"cantidad":2}"#));

    let pagina = logs
        .listar(&LogFiltro {
            page: Some(2),
            page_size: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pagina.total, 4);
    assert_eq!(pagina.items.len(), 1);
}
