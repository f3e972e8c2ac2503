//! logger.rs
//! Logger del servicio sobre env_logger.

/// Nivel por defecto cuando RUST_LOG no está definido. Se silencia el
/// detalle de sqlx, que registra cada consulta en info.
const FILTRO_POR_DEFECTO: &str = "info,sqlx=warn";

pub fn init_logger() {
    let filtro = std::env::var("RUST_LOG").unwrap_or_else(|_| FILTRO_POR_DEFECTO.to_string());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filtro))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}
