//! Paginador
//!
//! Corta la lista filtrada en páginas de tamaño fijo. La página pedida se
//! acota siempre a `1..=total_pages`, en todas las pantallas por igual.

use serde::Serialize;

/// Tamaño de página máximo aceptado desde la query string
pub const MAX_PAGE_SIZE: usize = 100;

/// Una página de resultados
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Transformar los elementos conservando la paginación
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Número de páginas para `total` elementos (al menos 1)
pub fn total_pages(total: usize, page_size: usize) -> usize {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    total.div_ceil(page_size).max(1)
}

/// Acotar la página pedida al rango válido
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total, page_size))
}

/// Devuelve el corte `[(page-1)*size, (page-1)*size + size)`
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Page<T> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}
