use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::catalog::{PageLayout, Record, FALLBACK_IMAGE};
use crate::fetcher::{fetch_page, FetchError, HttpSource, RecordSource};
use crate::session::Session;
use crate::view::Action;

pub(crate) fn record(id: u32, name: &str, types: &[&str]) -> Record {
    Record {
        id,
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        image_url: Some(format!("https://img.example/{id}.png")),
    }
}

/// In-memory source: every id resolves to `creature-{id}` unless marked failing.
#[derive(Clone, Debug, Default)]
pub(crate) struct FakeSource {
    requested: Arc<Mutex<Vec<u32>>>,
    failing: HashSet<u32>,
    descending_delays: bool,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, ids: &[u32]) -> Self {
        self.failing.extend(ids.iter().copied());
        self
    }

    pub(crate) fn with_descending_delays(mut self) -> Self {
        self.descending_delays = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Highest number of lookups that were pending at the same time.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn requested(&self) -> Vec<u32> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub(crate) fn reset(&self) {
        if let Ok(mut r) = self.requested.lock() {
            r.clear();
        }
        self.peak_in_flight.store(0, Ordering::SeqCst);
    }
}

impl RecordSource for FakeSource {
    fn fetch_record(&self, id: u32) -> impl Future<Output = Result<Record, FetchError>> + Send {
        if let Ok(mut r) = self.requested.lock() {
            r.push(id);
        }
        let fails = self.failing.contains(&id);
        let delay = if self.descending_delays {
            Duration::from_millis(u64::from(20u32.saturating_sub(id % 20)))
        } else {
            self.delay
        };
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak_in_flight);
        async move {
            let pending = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(pending, Ordering::SeqCst);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if fails {
                return Err(FetchError::Status { id, status: 404 });
            }
            let kind = if id % 2 == 0 { "water" } else { "grass" };
            Ok(record(id, &format!("creature-{id}"), &[kind]))
        }
    }
}

/// Minimal `GET /pokemon/{id}` server: 404 for id 2, a truncated body for
/// id 3, a null sprite for id 4.
async fn serve_catalog(listener: TcpListener) {
    while let Ok((mut stream, _)) = listener.accept().await {
        tokio::spawn(async move {
            let mut head = Vec::new();
            let mut chunk = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => head.extend_from_slice(&chunk[..n]),
                }
            }
            let head = String::from_utf8_lossy(&head);
            let id = head
                .split_whitespace()
                .nth(1)
                .and_then(|path| path.strip_prefix("/pokemon/"))
                .and_then(|id| id.parse::<u32>().ok());
            let (status, body) = match id {
                Some(2) => ("404 Not Found", "Not Found".to_string()),
                Some(3) => ("200 OK", r#"{"id":3,"name":"#.to_string()),
                Some(4) => (
                    "200 OK",
                    r#"{"id":4,"name":"charmander","types":[{"slot":1,"type":{"name":"fire"}}],"sprites":{"front_default":null}}"#
                        .to_string(),
                ),
                Some(id) => (
                    "200 OK",
                    format!(
                        r#"{{"id":{id},"name":"creature-{id}","types":[{{"slot":1,"type":{{"name":"grass"}}}}],"sprites":{{"front_default":"https://img.example/{id}.png"}}}}"#
                    ),
                ),
                None => ("400 Bad Request", String::new()),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        });
    }
}

#[tokio::test]
async fn http_source_drops_only_failed_ids() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_catalog(listener));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let source = HttpSource::new(client, &format!("http://{addr}/"), 0);
    let layout = PageLayout::new(4, 4).unwrap();

    let records = fetch_page(&source, &layout, 1).await;

    let ids: Vec<u32> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 4]);
    assert_eq!(records[0].image_url.as_deref(), Some("https://img.example/1.png"));
    assert_eq!(records[1].types, vec!["fire".to_string()]);
    assert_eq!(records[1].image_url, None);
    assert_eq!(records[1].image_or_fallback(), FALLBACK_IMAGE);

    assert!(matches!(
        source.fetch_record(2).await,
        Err(FetchError::Status { id: 2, status: 404 })
    ));
    assert!(matches!(
        source.fetch_record(3).await,
        Err(FetchError::Decode { id: 3, .. })
    ));
}

#[tokio::test]
async fn scenario_navigate_to_last_page() {
    let source = FakeSource::new();
    let mut session = Session::with_source(source.clone(), PageLayout::default(), 1).unwrap();
    session.start().await;
    source.reset();

    session.apply(Action::InputPage(101)).await;
    session.apply(Action::CommitInput).await;

    let mut requested = source.requested();
    requested.sort();
    // neighbour 100 is new too, 102 does not exist
    assert_eq!(requested, (991..=1010).collect::<Vec<_>>());
    let ids: Vec<u32> = session.state().records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1001..=1010).collect::<Vec<_>>());

    session.apply(Action::Next).await;
    assert_eq!(session.state().current_page, 101);
}

#[tokio::test]
async fn partial_page_failure_shows_remaining_records() {
    let source = FakeSource::new().failing(&[5]);
    let mut session = Session::with_source(source, PageLayout::default(), 1).unwrap();
    session.start().await;

    let ids: Vec<u32> = session.state().filtered.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 6, 7, 8, 9, 10]);
}

#[tokio::test]
async fn back_and_forth_never_refetches() {
    let source = FakeSource::new();
    let mut session = Session::with_source(source.clone(), PageLayout::default(), 2).unwrap();
    session.start().await;

    session.apply(Action::Previous).await;
    session.apply(Action::Next).await;
    session.apply(Action::Paginate(2)).await;

    let mut requested = source.requested();
    requested.sort();
    let unique: HashSet<u32> = requested.iter().copied().collect();
    assert_eq!(unique.len(), requested.len());
    assert_eq!(requested, (1..=30).collect::<Vec<_>>());
}

#[test]
fn palette_and_label_for_rendered_card() {
    let r = record(6, "charizard", &["fire", "flying"]);
    let color = crate::palette::type_color(&r.types).unwrap();
    assert_eq!(color.css, "orange");
    assert_eq!(crate::palette::type_label(&r.types), "Fire / Flying");
}
