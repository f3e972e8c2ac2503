//! tests/catalogo_tests.rs
//! Catálogo y reglas de integridad de elementos.

use actix_rt::test;

use super::*;
use crate::models::{
    catalogo_model::SubcategoriaRequest,
    elemento_model::{ElementoFiltro, EstadoElemento},
};

#[test]
async fn no_se_elimina_un_padre_con_dependientes() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let service = CatalogoService::new(pool.clone());

    let err = service.eliminar_sede(&catalogo.sede_id).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));

    crear_elemento(&pool, &catalogo, "CAT-001", 1).await;
    let err = service
        .eliminar_categoria(&catalogo.categoria_id)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));
    let err = service
        .eliminar_ubicacion(&catalogo.ubicacion_id)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));
}

#[test]
async fn catalogo_crud_y_filtro_por_padre() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let service = CatalogoService::new(pool.clone());

    let otra = service
        .crear_sede(SedeRequest {
            nombre: "Sede Norte".into(),
            direccion: Some("Calle 1".into()),
        })
        .await
        .unwrap();
    service
        .crear_ubicacion(UbicacionRequest {
            sede_id: otra.id.clone(),
            nombre: "Bodega 1".into(),
            descripcion: None,
        })
        .await
        .unwrap();

    assert_eq!(service.listar_ubicaciones(None).await.unwrap().len(), 2);
    let filtradas = service.listar_ubicaciones(Some(&otra.id)).await.unwrap();
    assert_eq!(filtradas.len(), 1);
    assert_eq!(filtradas[0].sede_id, otra.id);

    // Mismo nombre dentro de la misma sede
    assert!(service
        .crear_ubicacion(UbicacionRequest {
            sede_id: catalogo.sede_id.clone(),
            nombre: "Bodega 1".into(),
            descripcion: None,
        })
        .await
        .is_err());

    let renombrada = service
        .actualizar_sede(
            &otra.id,
            SedeRequest {
                nombre: "Sede Sur".into(),
                direccion: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renombrada.nombre, "Sede Sur");

    let err = service.obtener_sede("no-existe").await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::NoEncontrado(_)));

    let err = service
        .crear_sede(SedeRequest {
            nombre: "".into(),
            direccion: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));
}

#[test]
async fn subcategoria_debe_pertenecer_a_la_categoria() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let service = CatalogoService::new(pool.clone());

    let otra = service
        .crear_categoria(CategoriaRequest {
            nombre: "Cómputo".into(),
            descripcion: None,
        })
        .await
        .unwrap();
    let portatiles = service
        .crear_subcategoria(SubcategoriaRequest {
            categoria_id: otra.id.clone(),
            nombre: "Portátiles".into(),
            descripcion: None,
        })
        .await
        .unwrap();

    let mut req = elemento_request(&catalogo, "SUB-001", 1);
    req.subcategoria_id = Some(portatiles.id.clone());
    let err = ElementoService::new(pool.clone())
        .crear(req)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));

    let err = service.eliminar_categoria(&otra.id).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));
    service.eliminar_subcategoria(&portatiles.id).await.unwrap();
    service.eliminar_categoria(&otra.id).await.unwrap();
}

#[test]
async fn elemento_con_prestamos_no_se_reduce_ni_elimina() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elemento = crear_elemento(&pool, &catalogo, "ELE-001", 5).await;
    let elementos = ElementoService::new(pool.clone());

    movimiento_service(&pool)
        .registrar_prestamo(prestamo(&elemento.id, 3), None)
        .await
        .unwrap();

    let err = elementos
        .actualizar(&elemento.id, elemento_request(&catalogo, "ELE-001", 2))
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));

    let actualizado = elementos
        .actualizar(&elemento.id, elemento_request(&catalogo, "ELE-001", 3))
        .await
        .unwrap();
    assert_eq!(actualizado.cantidad, 3);
    assert_eq!(actualizado.disponible, 0);

    let err = elementos.eliminar(&elemento.id).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));
}

#[test]
async fn listado_de_elementos_filtra_y_pagina() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    for i in 0..12 {
        crear_elemento(&pool, &catalogo, &format!("LST-{:03}", i), 1).await;
    }
    let mut req = elemento_request(&catalogo, "BAJA-001", 1);
    req.marca = Some("Sony".into());
    req.estado = Some(EstadoElemento::DadoDeBaja);
    let elementos = ElementoService::new(pool.clone());
    elementos.crear(req).await.unwrap();

    let pagina = elementos.listar(&ElementoFiltro::default()).await.unwrap();
    assert_eq!(pagina.total, 13);
    assert_eq!(pagina.items.len(), 10);

    let segunda = elementos
        .listar(&ElementoFiltro {
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(segunda.items.len(), 3);

    let sony = elementos
        .listar(&ElementoFiltro {
            q: Some("sony".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(sony.total, 1);
    assert_eq!(sony.items[0].serie, "BAJA-001");

    let de_baja = elementos
        .listar(&ElementoFiltro {
            estado: Some(EstadoElemento::DadoDeBaja),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(de_baja.total, 1);

    // Serie duplicada
    assert!(elementos
        .crear(elemento_request(&catalogo, "LST-000", 1))
        .await
        .is_err());
}

#[test]
async fn subcategoria_en_uso_no_cambia_de_categoria() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let service = CatalogoService::new(pool.clone());

    let proyectores = service
        .crear_subcategoria(SubcategoriaRequest {
            categoria_id: catalogo.categoria_id.clone(),
            nombre: "Proyectores".into(),
            descripcion: None,
        })
        .await
        .unwrap();
    let otra = service
        .crear_categoria(CategoriaRequest {
            nombre: "Cómputo".into(),
            descripcion: None,
        })
        .await
        .unwrap();

    let mut req = elemento_request(&catalogo, "SUB-002", 1);
    req.subcategoria_id = Some(proyectores.id.clone());
    ElementoService::new(pool.clone()).crear(req).await.unwrap();

    let err = service
        .actualizar_subcategoria(
            &proyectores.id,
            SubcategoriaRequest {
                categoria_id: otra.id.clone(),
                nombre: "Proyectores".into(),
                descripcion: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));

    // Renombrar dentro de la misma categoría sigue permitido
    let renombrada = service
        .actualizar_subcategoria(
            &proyectores.id,
            SubcategoriaRequest {
                categoria_id: catalogo.categoria_id.clone(),
                nombre: "Videoproyectores".into(),
                descripcion: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renombrada.nombre, "Videoproyectores");
    assert_eq!(renombrada.categoria_id, catalogo.categoria_id);
}

#[test]
async fn estado_manual_respeta_prestamos_y_mantenimientos() {
    use crate::models::mantenimiento_model::{ProgramarMantenimientoRequest, TipoMantenimiento};
    use crate::services::mantenimiento_service::MantenimientoService;

    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let prestado = crear_elemento(&pool, &catalogo, "EST-001", 2).await;
    let elementos = ElementoService::new(pool.clone());

    movimiento_service(&pool)
        .registrar_prestamo(prestamo(&prestado.id, 1), None)
        .await
        .unwrap();
    for estado in [EstadoElemento::DadoDeBaja, EstadoElemento::EnMantenimiento] {
        let mut req = elemento_request(&catalogo, "EST-001", 2);
        req.estado = Some(estado);
        let err = elementos.actualizar(&prestado.id, req).await.unwrap_err();
        assert!(matches!(app_error(&err), AppError::Conflicto(_)));
    }

    let libre = crear_elemento(&pool, &catalogo, "EST-002", 1).await;
    let mantenimientos = MantenimientoService::new(pool.clone());
    let m = mantenimientos
        .programar(ProgramarMantenimientoRequest {
            elemento_id: libre.id.clone(),
            tipo: TipoMantenimiento::Correctivo,
            descripcion: "Cambio de lámpara".into(),
            fecha_programada: chrono::Utc::now().date_naive(),
            responsable: None,
            costo: None,
            frecuencia_dias: None,
        })
        .await
        .unwrap();
    mantenimientos.iniciar(&m.id).await.unwrap();

    let mut req = elemento_request(&catalogo, "EST-002", 1);
    req.estado = Some(EstadoElemento::Disponible);
    let err = elementos.actualizar(&libre.id, req).await.unwrap_err();
    assert!(matches!(app_error(&err), AppError::Conflicto(_)));

    // Sin tocar el estado, el resto de campos se actualiza
    let mut req = elemento_request(&catalogo, "EST-002", 1);
    req.nombre = "Proyector revisado".into();
    let actualizado = elementos.actualizar(&libre.id, req).await.unwrap();
    assert_eq!(actualizado.nombre, "Proyector revisado");
    assert_eq!(actualizado.estado, EstadoElemento::EnMantenimiento);

    mantenimientos.cancelar(&m.id).await.unwrap();
    let mut req = elemento_request(&catalogo, "EST-002", 1);
    req.estado = Some(EstadoElemento::DadoDeBaja);
    let baja = elementos.actualizar(&libre.id, req).await.unwrap();
    assert_eq!(baja.estado, EstadoElemento::DadoDeBaja);

    let err = elementos
        .actualizar("no-existe", elemento_request(&catalogo, "EST-003", 1))
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::NoEncontrado(_)));
}

#[test]
async fn busqueda_trata_comodines_como_texto() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elementos = ElementoService::new(pool.clone());

    let mut req = elemento_request(&catalogo, "PCT-001", 1);
    req.nombre = "Atenuador 50%".into();
    elementos.crear(req).await.unwrap();
    let mut req = elemento_request(&catalogo, "PCT-002", 1);
    req.nombre = "Atenuador 500".into();
    elementos.crear(req).await.unwrap();
    let mut req = elemento_request(&catalogo, "PCT_003", 1);
    req.nombre = "Cable".into();
    elementos.crear(req).await.unwrap();

    let por_ciento = elementos
        .listar(&ElementoFiltro {
            q: Some("50%".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(por_ciento.total, 1);
    assert_eq!(por_ciento.items[0].serie, "PCT-001");

    let guion_bajo = elementos
        .listar(&ElementoFiltro {
            q: Some("pct_".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(guion_bajo.total, 1);
    assert_eq!(guion_bajo.items[0].serie, "PCT_003");
}

#[test]
async fn busqueda_con_acentos_encuentra_el_mismo_texto() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let elementos = ElementoService::new(pool.clone());

    let mut req = elemento_request(&catalogo, "ACE-001", 1);
    req.nombre = "CAÑÓN de luz".into();
    elementos.crear(req).await.unwrap();

    for q in ["CAÑÓN", "caÑÓn DE"] {
        let pagina = elementos
            .listar(&ElementoFiltro {
                q: Some(q.into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pagina.total, 1, "búsqueda {:?}", q);
    }
}

#[test]
async fn nombres_en_blanco_se_rechazan() {
    let pool = pool_de_prueba().await;
    let catalogo = catalogo_basico(&pool).await;
    let service = CatalogoService::new(pool.clone());

    let err = service
        .crear_sede(SedeRequest {
            nombre: "   ".into(),
            direccion: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));

    let err = service
        .crear_subcategoria(SubcategoriaRequest {
            categoria_id: catalogo.categoria_id.clone(),
            nombre: "\t ".into(),
            descripcion: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));

    let mut req = elemento_request(&catalogo, "  ", 1);
    req.nombre = "Proyector".into();
    let err = ElementoService::new(pool.clone())
        .crear(req)
        .await
        .unwrap_err();
    assert!(matches!(app_error(&err), AppError::Validacion(_)));
}
