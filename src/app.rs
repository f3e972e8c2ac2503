//! app.rs
use crate::handlers::{
    auth_handler, catalogo_handler, dashboard_handler, elemento_handler, log_handler,
    mantenimiento_handler, movimiento_handler, notification_handler, observacion_handler,
    ticket_handler, upload_handler,
};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(auth_handler::login_endpoint))
                    .route("/logout", web::post().to(auth_handler::logout_endpoint))
                    .route("/me", web::get().to(auth_handler::me_endpoint)),
            )
            .service(
                web::scope("/usuarios")
                    .route("", web::get().to(auth_handler::listar_usuarios_endpoint))
                    .route("", web::post().to(auth_handler::crear_usuario_endpoint)),
            )
            .service(
                web::scope("/sedes")
                    .route("", web::get().to(catalogo_handler::listar_sedes_endpoint))
                    .route("", web::post().to(catalogo_handler::crear_sede_endpoint))
                    .route("/{id}", web::get().to(catalogo_handler::obtener_sede_endpoint))
                    .route(
                        "/{id}",
                        web::put().to(catalogo_handler::actualizar_sede_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(catalogo_handler::eliminar_sede_endpoint),
                    ),
            )
            .service(
                web::scope("/ubicaciones")
                    .route(
                        "",
                        web::get().to(catalogo_handler::listar_ubicaciones_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(catalogo_handler::crear_ubicacion_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(catalogo_handler::obtener_ubicacion_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(catalogo_handler::actualizar_ubicacion_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(catalogo_handler::eliminar_ubicacion_endpoint),
                    ),
            )
            .service(
                web::scope("/categorias")
                    .route(
                        "",
                        web::get().to(catalogo_handler::listar_categorias_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(catalogo_handler::crear_categoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(catalogo_handler::obtener_categoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(catalogo_handler::actualizar_categoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(catalogo_handler::eliminar_categoria_endpoint),
                    ),
            )
            .service(
                web::scope("/subcategorias")
                    .route(
                        "",
                        web::get().to(catalogo_handler::listar_subcategorias_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(catalogo_handler::crear_subcategoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(catalogo_handler::obtener_subcategoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(catalogo_handler::actualizar_subcategoria_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(catalogo_handler::eliminar_subcategoria_endpoint),
                    ),
            )
            .service(
                web::scope("/elementos")
                    .route("", web::get().to(elemento_handler::listar_elementos_endpoint))
                    .route("", web::post().to(elemento_handler::crear_elemento_endpoint))
                    .route(
                        "/{id}",
                        web::get().to(elemento_handler::obtener_elemento_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::put().to(elemento_handler::actualizar_elemento_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(elemento_handler::eliminar_elemento_endpoint),
                    )
                    .route(
                        "/{id}/disponibilidad",
                        web::get().to(elemento_handler::disponibilidad_endpoint),
                    )
                    .route(
                        "/{id}/observaciones",
                        web::get().to(observacion_handler::listar_observaciones_endpoint),
                    )
                    .route(
                        "/{id}/observaciones",
                        web::post().to(observacion_handler::crear_observacion_endpoint),
                    ),
            )
            .service(
                web::scope("/observaciones").route(
                    "/{id}",
                    web::delete().to(observacion_handler::eliminar_observacion_endpoint),
                ),
            )
            .service(
                web::scope("/movimientos")
                    .route(
                        "",
                        web::get().to(movimiento_handler::listar_movimientos_endpoint),
                    )
                    .route(
                        "/prestamos",
                        web::post().to(movimiento_handler::registrar_prestamo_endpoint),
                    )
                    .route(
                        "/vencidos",
                        web::get().to(movimiento_handler::listar_vencidos_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(movimiento_handler::obtener_movimiento_endpoint),
                    )
                    .route(
                        "/{id}/devolucion",
                        web::post().to(movimiento_handler::registrar_devolucion_endpoint),
                    ),
            )
            .service(
                web::scope("/tickets")
                    .route("", web::get().to(ticket_handler::listar_tickets_endpoint))
                    .route(
                        "/numero/{numero}",
                        web::get().to(ticket_handler::obtener_ticket_por_numero_endpoint),
                    )
                    .route("/{id}", web::get().to(ticket_handler::obtener_ticket_endpoint)),
            )
            .service(
                web::scope("/mantenimientos")
                    .route(
                        "",
                        web::get().to(mantenimiento_handler::listar_mantenimientos_endpoint),
                    )
                    .route(
                        "",
                        web::post().to(mantenimiento_handler::programar_mantenimiento_endpoint),
                    )
                    .route(
                        "/proximos",
                        web::get().to(mantenimiento_handler::proximos_endpoint),
                    )
                    .route(
                        "/{id}",
                        web::get().to(mantenimiento_handler::obtener_mantenimiento_endpoint),
                    )
                    .route(
                        "/{id}/iniciar",
                        web::post().to(mantenimiento_handler::iniciar_mantenimiento_endpoint),
                    )
                    .route(
                        "/{id}/completar",
                        web::post().to(mantenimiento_handler::completar_mantenimiento_endpoint),
                    )
                    .route(
                        "/{id}/cancelar",
                        web::post().to(mantenimiento_handler::cancelar_mantenimiento_endpoint),
                    ),
            )
            .service(
                web::scope("/notificaciones")
                    .route(
                        "",
                        web::get().to(notification_handler::listar_notificaciones_endpoint),
                    )
                    .route(
                        "/no-leidas",
                        web::get().to(notification_handler::contar_no_leidas_endpoint),
                    )
                    .route(
                        "/leidas",
                        web::post().to(notification_handler::marcar_todas_leidas_endpoint),
                    )
                    .route(
                        "/revisar",
                        web::post().to(notification_handler::revisar_vencimientos_endpoint),
                    )
                    .route(
                        "/{id}/leida",
                        web::post().to(notification_handler::marcar_leida_endpoint),
                    ),
            )
            .route("/logs", web::get().to(log_handler::listar_logs_endpoint))
            .route(
                "/uploads/firma",
                web::post().to(upload_handler::subir_firma_endpoint),
            )
            .route("/dashboard", web::get().to(dashboard_handler::resumen_endpoint)),
    );
}
