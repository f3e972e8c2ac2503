//! services/signature_service.rs
//! Persistencia de firmas (imágenes en data URL) según la configuración:
//! almacenamiento de objetos, carpeta local o el propio data URL.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::app_config::SignatureBackend;
use crate::errors::AppError;

/// Tamaño máximo de una firma ya decodificada.
pub const MAX_FIRMA_BYTES: usize = 2 * 1024 * 1024;
const BLOB_TIMEOUT: Duration = Duration::from_secs(20);
const CARPETA_FIRMAS: &str = "firmas";

#[derive(Debug, Clone, PartialEq)]
pub struct FirmaDecodificada {
    pub mime: &'static str,
    pub extension: &'static str,
    pub bytes: Bytes,
}

impl FirmaDecodificada {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, base64::encode(&self.bytes))
    }
}

/// Interpreta `data:<mime>;base64,<payload>` y valida tipo y tamaño.
pub fn parse_data_url(data_url: &str) -> Result<FirmaDecodificada, AppError> {
    let invalida = |msg: &str| AppError::Validacion(format!("Firma inválida: {}", msg));

    let resto = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| invalida("se esperaba un data URL"))?;
    let (cabecera, payload) = resto
        .split_once(',')
        .ok_or_else(|| invalida("falta el contenido"))?;
    let mime_declarado = cabecera
        .strip_suffix(";base64")
        .ok_or_else(|| invalida("solo se acepta codificación base64"))?;

    let (mime, extension) = match mime_declarado.to_ascii_lowercase().as_str() {
        "image/png" => ("image/png", "png"),
        "image/jpeg" | "image/jpg" => ("image/jpeg", "jpg"),
        "image/webp" => ("image/webp", "webp"),
        otro => return Err(invalida(&format!("tipo no soportado '{}'", otro))),
    };

    let limpio: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if limpio.len() / 4 * 3 > MAX_FIRMA_BYTES + 3 {
        return Err(invalida("supera el tamaño máximo"));
    }
    let bytes = base64::decode(&limpio).map_err(|_| invalida("base64 corrupto"))?;
    if bytes.is_empty() {
        return Err(invalida("imagen vacía"));
    }
    if bytes.len() > MAX_FIRMA_BYTES {
        return Err(invalida("supera el tamaño máximo"));
    }

    Ok(FirmaDecodificada {
        mime,
        extension,
        bytes: Bytes::from(bytes),
    })
}

#[derive(Deserialize)]
struct BlobPutResponse {
    url: String,
}

#[derive(Clone, Debug)]
pub struct SignatureService {
    backend: SignatureBackend,
    http_client: Client,
}

impl SignatureService {
    pub fn new(backend: SignatureBackend) -> Self {
        let http_client = Client::builder()
            .timeout(BLOB_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            backend,
            http_client,
        }
    }

    pub fn backend(&self) -> &SignatureBackend {
        &self.backend
    }

    /// Guarda una firma y devuelve la URL con la que se referenciará.
    /// Si el almacenamiento remoto o local falla, se conserva el data URL.
    pub async fn guardar(&self, data_url: &str) -> Result<String> {
        let firma = parse_data_url(data_url)?;
        let nombre = format!("{}/{}.{}", CARPETA_FIRMAS, Uuid::new_v4(), firma.extension);

        let resultado = match &self.backend {
            SignatureBackend::Blob { token, api_url } => {
                self.subir_blob(api_url, token, &nombre, &firma).await
            }
            SignatureBackend::Local {
                upload_dir,
                public_prefix,
            } => escribir_local(upload_dir, public_prefix, &nombre, &firma).await,
            SignatureBackend::Inline => return Ok(firma.to_data_url()),
        };

        match resultado {
            Ok(url) => {
                log::info!("Firma guardada en {} ({} bytes)", url, firma.bytes.len());
                Ok(url)
            }
            Err(e) => {
                log::warn!(
                    "No se pudo guardar la firma {}, se conserva en línea: {:?}",
                    nombre,
                    e
                );
                Ok(firma.to_data_url())
            }
        }
    }

    pub async fn guardar_opcional(&self, data_url: Option<&str>) -> Result<Option<String>> {
        match data_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(d) => Ok(Some(self.guardar(d).await?)),
            None => Ok(None),
        }
    }

    async fn subir_blob(
        &self,
        api_url: &str,
        token: &str,
        nombre: &str,
        firma: &FirmaDecodificada,
    ) -> Result<String> {
        let url = format!("{}/{}", api_url.trim_end_matches('/'), nombre);

        let resp = self
            .http_client
            .put(&url)
            .bearer_auth(token)
            .header("x-api-version", "7")
            .header("x-content-type", firma.mime)
            .header("x-add-random-suffix", "0")
            .body(firma.bytes.clone())
            .send()
            .await
            .context("Fallo al hacer PUT de la firma")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!(AppError::Almacenamiento(format!(
                "respuesta {} del almacenamiento: {}",
                status, body_txt
            ))));
        }

        let body: BlobPutResponse = resp
            .json()
            .await
            .context("Respuesta del almacenamiento sin url")?;
        Ok(body.url)
    }
}

async fn escribir_local(
    upload_dir: &Path,
    public_prefix: &str,
    nombre: &str,
    firma: &FirmaDecodificada,
) -> Result<String> {
    let destino = upload_dir.join(nombre);
    if let Some(padre) = destino.parent() {
        tokio::fs::create_dir_all(padre)
            .await
            .with_context(|| format!("No se pudo crear {:?}", padre))?;
    }
    tokio::fs::write(&destino, &firma.bytes)
        .await
        .with_context(|| format!("No se pudo escribir la firma en {:?}", destino))?;
    Ok(format!("{}/{}", public_prefix, nombre))
}
