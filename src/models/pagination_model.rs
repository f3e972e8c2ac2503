//! models/pagination_model.rs

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Página solicitada, ya normalizada (page >= 1, 1 <= page_size <= 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagina {
    pub page: u64,
    pub page_size: u64,
}

impl Pagina {
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Pagina {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        let desplazamiento = (self.page - 1).saturating_mul(self.page_size);
        i64::try_from(desplazamiento).unwrap_or(i64::MAX)
    }

    pub fn envolver<T>(&self, total: i64, items: Vec<T>) -> Paginated<T> {
        Paginated {
            total: total.max(0) as u64,
            page: self.page,
            page_size: self.page_size,
            items,
        }
    }
}

impl Default for Pagina {
    fn default() -> Self {
        Pagina::new(None, None)
    }
}

/// Para listar con paginación
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}
