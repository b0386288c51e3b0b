//! In-memory store backend.

pub mod account;
pub mod session;

pub use account::MemoryAccountStore;
pub use session::MemorySessionStore;

use gatekeeper_core::types::{PageRequest, PageResponse};

/// Cut one page out of an already ordered list.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let page_items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    PageResponse::new(page_items, page, total)
}
