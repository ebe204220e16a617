//! Process-wide page cache.
//!
//! Pages are stored whole behind an `Arc`, so a reader sees either nothing or
//! a complete page. There is no eviction and no expiry: the map grows with
//! every distinct page number requested for the lifetime of the process.
//! Page counts are not capped either (see `Aggregator::get_pages`), so a single
//! huge request can grow both this map and the set of in-flight fetches.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::models::Story;

pub type Page = Arc<Vec<Story>>;

#[derive(Debug, Default)]
pub struct PageCache {
    pages: RwLock<HashMap<u32, Page>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u32) -> Option<Page> {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        pages.get(&page).cloned()
    }

    /// Stores `stories` under `page` unless another writer got there first.
    /// Returns whichever page is cached afterwards.
    pub fn put(&self, page: u32, stories: Page) -> Page {
        let mut pages = self.pages.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(pages.entry(page).or_insert(stories))
    }

    pub fn contains(&self, page: u32) -> bool {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        let pages = self.pages.read().unwrap_or_else(PoisonError::into_inner);
        pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
