use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::cache::PageCache;
use crate::catalog::{self, PageLayout, Record};
use crate::fetcher::{self, HttpSource, RecordSource};
use crate::view::{Action, LoadRequest, ViewState};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug)]
pub struct Options {
    pub base_url: String,
    pub total_records: u32,
    pub page_size: u32,
    pub start_page: u32,
    pub timeout_seconds: u64,
    pub rate: u32,
    pub proxy: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            total_records: catalog::DEFAULT_TOTAL_RECORDS,
            page_size: catalog::DEFAULT_PAGE_SIZE,
            start_page: 1,
            timeout_seconds: 10,
            rate: 0,
            proxy: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid page layout: {message}")]
    InvalidLayout { message: String },

    #[error("start page {page} is outside 1..={last_page}")]
    InvalidStartPage { page: u32, last_page: u32 },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of a load task, merged back by [`Session::complete`].
#[derive(Clone, Debug)]
pub struct LoadOutcome {
    pub page: u32,
    pub fetched: Vec<(u32, Vec<Record>)>,
}

/// Owns the view, the page cache and the record source.
///
/// The cache and the view are only mutated through `&mut self`; load tasks
/// hold a clone of the source and hand their pages back as a [`LoadOutcome`].
#[derive(Debug)]
pub struct Session<S> {
    source: Arc<S>,
    layout: PageLayout,
    state: ViewState,
    cache: PageCache,
}

impl Session<HttpSource> {
    pub fn new(options: Options) -> Result<Self, SessionError> {
        if reqwest::Url::parse(&options.base_url).is_err() {
            return Err(SessionError::InvalidBaseUrl {
                url: options.base_url.clone(),
            });
        }
        let layout = PageLayout::new(options.total_records, options.page_size)
            .map_err(|message| SessionError::InvalidLayout { message })?;

        let client = build_client(options.proxy.as_deref(), options.timeout_seconds)?;
        let source = HttpSource::new(client, &options.base_url, options.rate);
        Self::with_source(source, layout, options.start_page)
    }
}

impl<S: RecordSource> Session<S> {
    pub fn with_source(
        source: S,
        layout: PageLayout,
        start_page: u32,
    ) -> Result<Self, SessionError> {
        if !layout.contains(start_page) {
            return Err(SessionError::InvalidStartPage {
                page: start_page,
                last_page: layout.last_page(),
            });
        }
        Ok(Self {
            source: Arc::new(source),
            layout,
            state: ViewState::initial(start_page),
            cache: PageCache::new(),
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn begin(&mut self) -> LoadRequest {
        self.state.start(&self.layout)
    }

    pub fn dispatch(&mut self, action: Action) -> Option<LoadRequest> {
        self.state.update(action, &self.layout)
    }

    /// Builds the fetch for the pages of `request` that are not cached yet.
    ///
    /// The returned future owns everything it needs, so it can be spawned.
    pub fn load_task(
        &self,
        request: LoadRequest,
    ) -> impl Future<Output = LoadOutcome> + Send + 'static
    where
        S: Send + Sync + 'static,
    {
        let missing = self.cache.missing(&request.pages);
        let source = Arc::clone(&self.source);
        let layout = self.layout;
        async move {
            let fetched = if missing.is_empty() {
                Vec::new()
            } else {
                fetcher::fetch_pages(source.as_ref(), &layout, &missing).await
            };
            LoadOutcome {
                page: request.page,
                fetched,
            }
        }
    }

    /// Merges a finished load and publishes the records of its page.
    pub fn complete(&mut self, outcome: LoadOutcome) {
        if outcome.page != self.state.current_page {
            debug!(
                page = outcome.page,
                current = self.state.current_page,
                "load finished for a superseded page"
            );
        }
        self.cache.merge(outcome.fetched);
        let records = self
            .cache
            .get(outcome.page)
            .map(|r| r.to_vec())
            .unwrap_or_default();
        self.state.update(
            Action::PageLoaded {
                page: outcome.page,
                records,
            },
            &self.layout,
        );
    }

    /// Loads the start page and its neighbours.
    pub async fn start(&mut self) {
        let request = self.begin();
        self.load_inline(request).await;
    }

    /// Dispatches `action` and waits for any load it triggers.
    pub async fn apply(&mut self, action: Action) {
        if let Some(request) = self.dispatch(action) {
            self.load_inline(request).await;
        }
    }

    async fn load_inline(&mut self, request: LoadRequest) {
        let records = self
            .cache
            .ensure_loaded(
                self.source.as_ref(),
                &self.layout,
                &request.pages,
                request.page,
            )
            .await;
        self.state.update(
            Action::PageLoaded {
                page: request.page,
                records,
            },
            &self.layout,
        );
    }
}

fn build_client(
    proxy: Option<&str>,
    timeout_seconds: u64,
) -> Result<reqwest::Client, SessionError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "pokedex/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds.max(1)));

    if let Some(proxy) = proxy.filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| SessionError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| SessionError::HttpClientBuild { source: e })
}
