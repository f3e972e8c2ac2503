use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Resumen {
    pub total_elementos: i64,
    pub unidades_totales: i64,
    pub unidades_prestadas: i64,
    pub prestamos_abiertos: i64,
    pub prestamos_vencidos: i64,
    pub elementos_en_mantenimiento: i64,
    pub mantenimientos_proximos: i64,
    pub notificaciones_no_leidas: i64,
}
