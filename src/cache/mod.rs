use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{PageLayout, Record};
use crate::fetcher::{self, RecordSource};

/// Session-local page store. Pages are only ever added, never replaced.
#[derive(Clone, Debug, Default)]
pub struct PageCache {
    pages: BTreeMap<u32, Vec<Record>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, page: u32) -> Option<&[Record]> {
        self.pages.get(&page).map(|records| records.as_slice())
    }

    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    /// Pages from `requested` that are not cached yet, in request order.
    pub fn missing(&self, requested: &[u32]) -> Vec<u32> {
        let mut out: Vec<u32> = Vec::new();
        for &page in requested {
            if self.contains(page) {
                debug!(page, "page cache hit");
                continue;
            }
            if !out.contains(&page) {
                out.push(page);
            }
        }
        out
    }

    /// Inserts fetched pages. A page that is already present keeps its records.
    pub fn merge(&mut self, fetched: Vec<(u32, Vec<Record>)>) {
        for (page, records) in fetched {
            self.pages.entry(page).or_insert(records);
        }
    }

    /// Makes sure every page of `requested` is resident and returns the
    /// records of `current`. Missing pages are fetched concurrently.
    pub async fn ensure_loaded<S: RecordSource>(
        &mut self,
        source: &S,
        layout: &PageLayout,
        requested: &[u32],
        current: u32,
    ) -> Vec<Record> {
        let missing = self.missing(requested);
        if !missing.is_empty() {
            let fetched = fetcher::fetch_pages(source, layout, &missing).await;
            self.merge(fetched);
        }
        self.get(current).map(|r| r.to_vec()).unwrap_or_default()
    }
}
