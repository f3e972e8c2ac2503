//! config/app_config.rs
//! Configuración global del servicio, leída desde variables de entorno (.env).

use std::path::PathBuf;

/// Estrategia para persistir las firmas capturadas en préstamos y devoluciones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureBackend {
    /// Almacenamiento de objetos remoto (API tipo blob con token).
    Blob { token: String, api_url: String },
    /// Carpeta local servida bajo `public_prefix`.
    Local {
        upload_dir: PathBuf,
        public_prefix: String,
    },
    /// Se guarda el data URL tal cual en la base de datos.
    Inline,
}

impl SignatureBackend {
    pub fn nombre(&self) -> &'static str {
        match self {
            SignatureBackend::Blob { .. } => "blob",
            SignatureBackend::Local { .. } => "local",
            SignatureBackend::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub notify_to: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub nombre: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub public_upload_prefix: String,
    pub signature_backend: SignatureBackend,
    pub session_ttl_hours: i64,
    pub admin_seed: Option<AdminSeed>,
    pub smtp: Option<SmtpConfig>,
    pub sweep_interval_secs: u64,
}

const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5022,
            workers: 2,
            database_url: "sqlite:./data/inventario.db".to_string(),
            upload_dir: PathBuf::from("./files/uploads"),
            public_upload_prefix: "/uploads".to_string(),
            signature_backend: SignatureBackend::Inline,
            session_ttl_hours: 12,
            admin_seed: None,
            smtp: None,
            sweep_interval_secs: 300,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda,
    /// de modo que las pruebas no dependan del entorno del proceso.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = AppConfig::default();

        let upload_dir = get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);
        let public_upload_prefix = get("PUBLIC_UPLOAD_PREFIX")
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or(defaults.public_upload_prefix);

        let blob_token = get("BLOB_READ_WRITE_TOKEN");
        let blob_api_url = get("BLOB_API_URL")
            .unwrap_or_else(|| DEFAULT_BLOB_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let use_local = get("USE_LOCAL_STORAGE")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        let local = SignatureBackend::Local {
            upload_dir: upload_dir.clone(),
            public_prefix: public_upload_prefix.clone(),
        };
        let signature_backend = match get("SIGNATURE_STORAGE").as_deref() {
            Some("blob") => SignatureBackend::Blob {
                token: blob_token.ok_or_else(|| {
                    anyhow::anyhow!("SIGNATURE_STORAGE=blob requiere BLOB_READ_WRITE_TOKEN")
                })?,
                api_url: blob_api_url,
            },
            Some("local") => local,
            Some("inline") => SignatureBackend::Inline,
            Some(other) => anyhow::bail!("SIGNATURE_STORAGE desconocido: {}", other),
            None => match blob_token {
                Some(token) => SignatureBackend::Blob {
                    token,
                    api_url: blob_api_url,
                },
                None if use_local => local,
                None => SignatureBackend::Inline,
            },
        };

        let admin_seed = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                nombre: get("ADMIN_NOMBRE").unwrap_or_else(|| "Administrador".to_string()),
            }),
            _ => None,
        };

        let smtp = match (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASS")) {
            (Some(host), Some(user), Some(pass)) => Some(SmtpConfig {
                host,
                port: parse_num(get("SMTP_PORT"), 587, "SMTP_PORT")?,
                user,
                pass,
                notify_to: get("NOTIFY_EMAIL_TO")
                    .map(|v| {
                        v.split([',', ';'])
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(AppConfig {
            host: get("INVENTARIO_HOST").unwrap_or(defaults.host),
            port: parse_num(get("INVENTARIO_PORT"), defaults.port, "INVENTARIO_PORT")?,
            workers: parse_num(get("INVENTARIO_WORKERS"), defaults.workers, "INVENTARIO_WORKERS")?,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            upload_dir,
            public_upload_prefix,
            signature_backend,
            session_ttl_hours: parse_num(
                get("SESSION_TTL_HOURS"),
                defaults.session_ttl_hours,
                "SESSION_TTL_HOURS",
            )?,
            admin_seed,
            smtp,
            sweep_interval_secs: parse_num(
                get("SWEEP_INTERVAL_SECS"),
                defaults.sweep_interval_secs,
                "SWEEP_INTERVAL_SECS",
            )?,
        })
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "si")
}

fn parse_num<T: std::str::FromStr>(value: Option<String>, default: T, key: &str) -> anyhow::Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Valor inválido para {}: {}", key, v)),
        None => Ok(default),
    }
}
