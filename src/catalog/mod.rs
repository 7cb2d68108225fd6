use std::ops::RangeInclusive;

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_TOTAL_RECORDS: u32 = 1010;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const FALLBACK_IMAGE: &str = "/fallback-image.png";

/// One catalog entry. Identity is `id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub image_url: Option<String>,
}

impl Record {
    pub fn image_or_fallback(&self) -> &str {
        self.image_url.as_deref().unwrap_or(FALLBACK_IMAGE)
    }
}

// wire shape of `GET /pokemon/{id}`, only the fields we consume
#[derive(Debug, Deserialize)]
pub struct ApiRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub types: Vec<ApiTypeSlot>,
    #[serde(default)]
    pub sprites: ApiSprites,
}

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
    #[serde(rename = "type")]
    pub kind: ApiNamed,
}

#[derive(Debug, Deserialize)]
pub struct ApiNamed {
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSprites {
    pub front_default: Option<String>,
}

impl From<ApiRecord> for Record {
    fn from(api: ApiRecord) -> Self {
        Record {
            id: api.id,
            name: api.name,
            types: api.types.into_iter().map(|slot| slot.kind.name).collect(),
            image_url: api.sprites.front_default.filter(|s| !s.trim().is_empty()),
        }
    }
}

pub fn parse_record(body: &str) -> Result<Record, serde_json::Error> {
    serde_json::from_str::<ApiRecord>(body).map(Record::from)
}

/// Fixed-size pagination over the ids `1..=total_records`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    pub total_records: u32,
    pub page_size: u32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            total_records: DEFAULT_TOTAL_RECORDS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageLayout {
    pub fn new(total_records: u32, page_size: u32) -> Result<Self, String> {
        if total_records == 0 {
            return Err("total records must be positive".to_string());
        }
        if page_size == 0 {
            return Err("page size must be positive".to_string());
        }
        Ok(Self {
            total_records,
            page_size,
        })
    }

    pub fn last_page(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_records.div_ceil(self.page_size)
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= 1 && page <= self.last_page()
    }

    /// Inclusive id range of `page`, clipped to the total record count.
    pub fn id_range(&self, page: u32) -> Option<RangeInclusive<u32>> {
        if !self.contains(page) {
            return None;
        }
        let start = (page - 1) * self.page_size + 1;
        let end = start
            .saturating_add(self.page_size - 1)
            .min(self.total_records);
        Some(start..=end)
    }

    /// The current page first, then its clamped neighbours, without duplicates.
    pub fn preload_set(&self, page: u32) -> Vec<u32> {
        let last = self.last_page();
        let candidates = [page, page.saturating_sub(1).max(1), page.saturating_add(1).min(last)];
        let mut out: Vec<u32> = Vec::with_capacity(candidates.len());
        for p in candidates {
            if self.contains(p) && !out.contains(&p) {
                out.push(p);
            }
        }
        out
    }
}
