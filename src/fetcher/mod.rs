use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;

use futures::future::join_all;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{self, PageLayout, Record};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for record {id} failed: {source}")]
    Transport {
        id: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("record {id} returned HTTP status {status}")]
    Status { id: u32, status: u16 },

    #[error("record {id} could not be decoded: {source}")]
    Decode {
        id: u32,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolves one record by id.
pub trait RecordSource {
    fn fetch_record(&self, id: u32) -> impl Future<Output = Result<Record, FetchError>> + Send;
}

/// Record source backed by the remote REST API.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl std::fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("base_url", &self.base_url)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

impl HttpSource {
    pub fn new(client: reqwest::Client, base_url: &str, rate: u32) -> Self {
        let limiter = NonZeroU32::new(rate)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));
        Self {
            client,
            base_url: crate::utils::trim_base_url(base_url),
            limiter,
        }
    }

    pub fn record_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}", self.base_url, id)
    }
}

impl RecordSource for HttpSource {
    fn fetch_record(&self, id: u32) -> impl Future<Output = Result<Record, FetchError>> + Send {
        let url = self.record_url(id);
        let client = self.client.clone();
        let limiter = self.limiter.clone();
        async move {
            if let Some(limiter) = limiter {
                limiter.until_ready().await;
            }
            debug!(id, %url, "fetching record");
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| FetchError::Transport { id, source })?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    id,
                    status: status.as_u16(),
                });
            }
            let body = response
                .text()
                .await
                .map_err(|source| FetchError::Transport { id, source })?;
            catalog::parse_record(&body).map_err(|source| FetchError::Decode { id, source })
        }
    }
}

/// Fetches every record of `page` concurrently.
///
/// Lookups that fail are logged and left out; the remaining records keep the
/// ascending id order of the page regardless of completion order.
pub async fn fetch_page<S: RecordSource>(
    source: &S,
    layout: &PageLayout,
    page: u32,
) -> Vec<Record> {
    let range = match layout.id_range(page) {
        Some(range) => range,
        None => return Vec::new(),
    };

    let lookups = range.map(|id| source.fetch_record(id));
    let settled = join_all(lookups).await;

    let requested = settled.len();
    let records: Vec<Record> = settled
        .into_iter()
        .filter_map(|result| match result {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(page, error = %e, "dropping record from page");
                None
            }
        })
        .collect();

    info!(page, requested, loaded = records.len(), "page fetched");
    records
}

/// Fetches several pages concurrently, in request order.
pub async fn fetch_pages<S: RecordSource>(
    source: &S,
    layout: &PageLayout,
    pages: &[u32],
) -> Vec<(u32, Vec<Record>)> {
    let fetches = pages.iter().map(|&page| async move {
        let records = fetch_page(source, layout, page).await;
        (page, records)
    });
    join_all(fetches).await
}
