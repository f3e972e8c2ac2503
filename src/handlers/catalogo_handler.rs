//! handlers/catalogo_handler.rs
//! Endpoints de sedes, ubicaciones, categorías y subcategorías.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::handlers::{
    error_response,
    session::{AdminActual, UsuarioActual},
};
use crate::models::{
    catalogo_model::{CategoriaRequest, SedeRequest, SubcategoriaRequest, UbicacionRequest},
    log_model::Accion,
};
use crate::services::{catalogo_service::CatalogoService, log_service::LogService};

#[derive(Deserialize)]
pub struct SedeQuery {
    sede_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoriaQuery {
    categoria_id: Option<String>,
}

// ======================================================
// Sedes
// ======================================================

/// GET /api/sedes
pub async fn listar_sedes_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
) -> HttpResponse {
    match catalogo.listar_sedes().await {
        Ok(sedes) => HttpResponse::Ok().json(sedes),
        Err(e) => error_response(e),
    }
}

/// GET /api/sedes/{id}
pub async fn obtener_sede_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match catalogo.obtener_sede(&path.into_inner()).await {
        Ok(sede) => HttpResponse::Ok().json(sede),
        Err(e) => error_response(e),
    }
}

/// POST /api/sedes
pub async fn crear_sede_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<SedeRequest>,
) -> HttpResponse {
    match catalogo.crear_sede(body.into_inner()).await {
        Ok(sede) => {
            logs.auditar(&admin.0.usuario.id, Accion::Crear, "sede", &sede.id, None)
                .await;
            HttpResponse::Created().json(sede)
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/sedes/{id}
pub async fn actualizar_sede_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: web::Json<SedeRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.actualizar_sede(&id, body.into_inner()).await {
        Ok(sede) => {
            logs.auditar(&admin.0.usuario.id, Accion::Actualizar, "sede", &id, None)
                .await;
            HttpResponse::Ok().json(sede)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/sedes/{id}
pub async fn eliminar_sede_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.eliminar_sede(&id).await {
        Ok(_) => {
            logs.auditar(&admin.0.usuario.id, Accion::Eliminar, "sede", &id, None)
                .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}

// ======================================================
// Ubicaciones
// ======================================================

/// GET /api/ubicaciones?sede_id=
pub async fn listar_ubicaciones_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    query: web::Query<SedeQuery>,
) -> HttpResponse {
    match catalogo.listar_ubicaciones(query.sede_id.as_deref()).await {
        Ok(ubicaciones) => HttpResponse::Ok().json(ubicaciones),
        Err(e) => error_response(e),
    }
}

/// GET /api/ubicaciones/{id}
pub async fn obtener_ubicacion_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match catalogo.obtener_ubicacion(&path.into_inner()).await {
        Ok(ubicacion) => HttpResponse::Ok().json(ubicacion),
        Err(e) => error_response(e),
    }
}

/// POST /api/ubicaciones
pub async fn crear_ubicacion_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<UbicacionRequest>,
) -> HttpResponse {
    match catalogo.crear_ubicacion(body.into_inner()).await {
        Ok(ubicacion) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "ubicacion",
                &ubicacion.id,
                None,
            )
            .await;
            HttpResponse::Created().json(ubicacion)
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/ubicaciones/{id}
pub async fn actualizar_ubicacion_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: web::Json<UbicacionRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.actualizar_ubicacion(&id, body.into_inner()).await {
        Ok(ubicacion) => {
            logs.auditar(&admin.0.usuario.id, Accion::Actualizar, "ubicacion", &id, None)
                .await;
            HttpResponse::Ok().json(ubicacion)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/ubicaciones/{id}
pub async fn eliminar_ubicacion_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.eliminar_ubicacion(&id).await {
        Ok(_) => {
            logs.auditar(&admin.0.usuario.id, Accion::Eliminar, "ubicacion", &id, None)
                .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}

// ======================================================
// Categorías
// ======================================================

/// GET /api/categorias
pub async fn listar_categorias_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
) -> HttpResponse {
    match catalogo.listar_categorias().await {
        Ok(categorias) => HttpResponse::Ok().json(categorias),
        Err(e) => error_response(e),
    }
}

/// GET /api/categorias/{id}
pub async fn obtener_categoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match catalogo.obtener_categoria(&path.into_inner()).await {
        Ok(categoria) => HttpResponse::Ok().json(categoria),
        Err(e) => error_response(e),
    }
}

/// POST /api/categorias
pub async fn crear_categoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<CategoriaRequest>,
) -> HttpResponse {
    match catalogo.crear_categoria(body.into_inner()).await {
        Ok(categoria) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "categoria",
                &categoria.id,
                None,
            )
            .await;
            HttpResponse::Created().json(categoria)
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/categorias/{id}
pub async fn actualizar_categoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: web::Json<CategoriaRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.actualizar_categoria(&id, body.into_inner()).await {
        Ok(categoria) => {
            logs.auditar(&admin.0.usuario.id, Accion::Actualizar, "categoria", &id, None)
                .await;
            HttpResponse::Ok().json(categoria)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/categorias/{id}
pub async fn eliminar_categoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.eliminar_categoria(&id).await {
        Ok(_) => {
            logs.auditar(&admin.0.usuario.id, Accion::Eliminar, "categoria", &id, None)
                .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}

// ======================================================
// Subcategorías
// ======================================================

/// GET /api/subcategorias?categoria_id=
pub async fn listar_subcategorias_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    query: web::Query<CategoriaQuery>,
) -> HttpResponse {
    match catalogo
        .listar_subcategorias(query.categoria_id.as_deref())
        .await
    {
        Ok(subcategorias) => HttpResponse::Ok().json(subcategorias),
        Err(e) => error_response(e),
    }
}

/// GET /api/subcategorias/{id}
pub async fn obtener_subcategoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    _actual: UsuarioActual,
    path: web::Path<String>,
) -> HttpResponse {
    match catalogo.obtener_subcategoria(&path.into_inner()).await {
        Ok(subcategoria) => HttpResponse::Ok().json(subcategoria),
        Err(e) => error_response(e),
    }
}

/// POST /api/subcategorias
pub async fn crear_subcategoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<SubcategoriaRequest>,
) -> HttpResponse {
    match catalogo.crear_subcategoria(body.into_inner()).await {
        Ok(subcategoria) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "subcategoria",
                &subcategoria.id,
                None,
            )
            .await;
            HttpResponse::Created().json(subcategoria)
        }
        Err(e) => error_response(e),
    }
}

/// PUT /api/subcategorias/{id}
pub async fn actualizar_subcategoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
    body: web::Json<SubcategoriaRequest>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.actualizar_subcategoria(&id, body.into_inner()).await {
        Ok(subcategoria) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Actualizar,
                "subcategoria",
                &id,
                None,
            )
            .await;
            HttpResponse::Ok().json(subcategoria)
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /api/subcategorias/{id}
pub async fn eliminar_subcategoria_endpoint(
    catalogo: web::Data<CatalogoService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    path: web::Path<String>,
) -> HttpResponse {
    let id = path.into_inner();
    match catalogo.eliminar_subcategoria(&id).await {
        Ok(_) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Eliminar,
                "subcategoria",
                &id,
                None,
            )
            .await;
            HttpResponse::NoContent().finish()
        }
        Err(e) => error_response(e),
    }
}
