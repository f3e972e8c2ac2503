//! handlers/auth_handler.rs
use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    web, HttpResponse,
};
use serde_json::json;

use crate::handlers::{
    error_response,
    session::{AdminActual, UsuarioActual},
};
use crate::models::{
    log_model::Accion,
    usuario_model::{CrearUsuarioRequest, LoginRequest},
};
use crate::services::{
    auth_service::{AuthService, SESSION_COOKIE},
    log_service::LogService,
};

/// POST /api/auth/login
pub async fn login_endpoint(
    auth: web::Data<AuthService>,
    logs: web::Data<LogService>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    match auth.login(body.into_inner()).await {
        Ok(sesion) => {
            logs.auditar(
                &sesion.usuario.id,
                Accion::Login,
                "usuario",
                &sesion.usuario.id,
                None,
            )
            .await;

            let max_age = (sesion.expires_at - chrono::Utc::now()).num_seconds().max(0);
            let cookie = Cookie::build(SESSION_COOKIE, sesion.token.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(CookieDuration::seconds(max_age))
                .finish();

            HttpResponse::Ok().cookie(cookie).json(sesion)
        }
        Err(e) => error_response(e),
    }
}

/// POST /api/auth/logout
pub async fn logout_endpoint(
    auth: web::Data<AuthService>,
    logs: web::Data<LogService>,
    actual: UsuarioActual,
) -> HttpResponse {
    match auth.logout(&actual.token).await {
        Ok(_) => {
            logs.auditar(
                &actual.usuario.id,
                Accion::Logout,
                "usuario",
                &actual.usuario.id,
                None,
            )
            .await;

            let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
            cookie.make_removal();
            HttpResponse::Ok()
                .cookie(cookie)
                .json(json!({ "success": true }))
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/auth/me
pub async fn me_endpoint(actual: UsuarioActual) -> HttpResponse {
    HttpResponse::Ok().json(actual.usuario)
}

/// GET /api/usuarios
pub async fn listar_usuarios_endpoint(
    auth: web::Data<AuthService>,
    _admin: AdminActual,
) -> HttpResponse {
    match auth.listar_usuarios().await {
        Ok(usuarios) => HttpResponse::Ok().json(usuarios),
        Err(e) => error_response(e),
    }
}

/// POST /api/usuarios
pub async fn crear_usuario_endpoint(
    auth: web::Data<AuthService>,
    logs: web::Data<LogService>,
    admin: AdminActual,
    body: web::Json<CrearUsuarioRequest>,
) -> HttpResponse {
    match auth.crear_usuario(body.into_inner()).await {
        Ok(usuario) => {
            logs.auditar(
                &admin.0.usuario.id,
                Accion::Crear,
                "usuario",
                &usuario.id,
                Some(json!({ "email": usuario.email, "rol": usuario.rol })),
            )
            .await;
            HttpResponse::Created().json(usuario)
        }
        Err(e) => error_response(e),
    }
}
