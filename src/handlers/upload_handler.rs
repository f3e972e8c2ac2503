use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::{error_response, session::UsuarioActual};
use crate::services::signature_service::SignatureService;

#[derive(Debug, Deserialize)]
pub struct FirmaUpload {
    pub data_url: String,
}

/// POST /api/uploads/firma
pub async fn subir_firma_endpoint(
    firmas: web::Data<SignatureService>,
    _actual: UsuarioActual,
    body: web::Json<FirmaUpload>,
) -> HttpResponse {
    match firmas.guardar(&body.data_url).await {
        Ok(url) => HttpResponse::Created().json(json!({ "url": url })),
        Err(e) => error_response(e),
    }
}
