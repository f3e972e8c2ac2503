//! handlers/session.rs
//! Extractores de sesión: el usuario autenticado y su variante de administrador.

use actix_web::{
    dev::Payload, error::InternalError, http::StatusCode, web, FromRequest, HttpRequest,
    HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use serde_json::json;

use crate::handlers::error_response;
use crate::models::usuario_model::Usuario;
use crate::services::auth_service::{AuthService, SESSION_COOKIE};

/// Usuario autenticado por cookie de sesión o `Authorization: Bearer`.
#[derive(Debug, Clone)]
pub struct UsuarioActual {
    pub usuario: Usuario,
    pub token: String,
}

/// Igual que `UsuarioActual`, pero exige rol ADMIN (403 en otro caso).
#[derive(Debug, Clone)]
pub struct AdminActual(pub UsuarioActual);

pub fn token_de_request(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        let valor = cookie.value().trim();
        if !valor.is_empty() {
            return Some(valor.to_string());
        }
    }
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn rechazo(status: StatusCode, mensaje: &'static str) -> actix_web::Error {
    InternalError::from_response(
        mensaje,
        HttpResponse::build(status).json(json!({ "success": false, "error": mensaje })),
    )
    .into()
}

impl FromRequest for UsuarioActual {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth = req.app_data::<web::Data<AuthService>>().cloned();
        let token = token_de_request(req);

        Box::pin(async move {
            let auth = auth.ok_or_else(|| {
                rechazo(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Servicio de autenticación no configurado",
                )
            })?;
            let token =
                token.ok_or_else(|| rechazo(StatusCode::UNAUTHORIZED, "Sesión requerida"))?;

            match auth.usuario_por_token(&token).await {
                Ok(usuario) => Ok(UsuarioActual { usuario, token }),
                Err(e) => {
                    let mensaje = e.to_string();
                    Err(InternalError::from_response(mensaje, error_response(e)).into())
                }
            }
        })
    }
}

impl FromRequest for AdminActual {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let usuario = UsuarioActual::from_request(req, payload);
        Box::pin(async move {
            let actual = usuario.await?;
            if !actual.usuario.es_admin() {
                return Err(rechazo(StatusCode::FORBIDDEN, "Se requiere rol ADMIN"));
            }
            Ok(AdminActual(actual))
        })
    }
}
