//! Tests for lazy listings

use super::*;
use crate::error::{Error, Result};
use crate::objects::Comment;
use crate::transport::Transport;
use crate::types::{JsonValue, Query};
use crate::wire::RawMore;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Test doubles
// ============================================================================

/// Replays canned bodies and records every request it sees
struct MockTransport {
    responses: Mutex<VecDeque<Result<JsonValue>>>,
    requests: Mutex<Vec<(String, Query)>>,
}

impl MockTransport {
    fn new(responses: Vec<JsonValue>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            requests: Mutex::default(),
        })
    }

    fn requests(&self) -> Vec<(String, Query)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, path: &str, query: &Query) -> Result<JsonValue> {
        self.requests
            .lock()
            .unwrap()
            .push((path.to_string(), query.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Other(format!("unexpected request to {path}"))))
    }

    async fn post_json(&self, path: &str, _body: &JsonValue) -> Result<JsonValue> {
        self.get_json(path, &Query::new()).await
    }
}

/// Serves `pages[index..]` one page per fetch, counting fetches
struct Scripted {
    pages: Arc<Vec<Vec<i32>>>,
    index: usize,
    calls: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

#[async_trait]
impl Fetcher<i32> for Scripted {
    async fn fetch(&self, ctx: &Arc<Context>) -> Result<Listing<i32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;

        if self.failures.load(Ordering::SeqCst) > 0 {
            self.failures.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::Other("boom".to_string()));
        }

        let items = self.pages[self.index].clone();
        let fetcher = (self.index + 1 < self.pages.len()).then(|| {
            Box::new(Scripted {
                pages: Arc::clone(&self.pages),
                index: self.index + 1,
                calls: Arc::clone(&self.calls),
                failures: Arc::clone(&self.failures),
            }) as Box<dyn Fetcher<i32>>
        });
        Ok(Listing::new(Arc::clone(ctx), items, fetcher))
    }
}

/// One item per page for `remaining` pages, without delays
struct Countdown {
    remaining: usize,
}

#[async_trait]
impl Fetcher<usize> for Countdown {
    async fn fetch(&self, ctx: &Arc<Context>) -> Result<Listing<usize>> {
        let fetcher = (self.remaining > 1).then(|| {
            Box::new(Countdown {
                remaining: self.remaining - 1,
            }) as Box<dyn Fetcher<usize>>
        });
        Ok(Listing::new(Arc::clone(ctx), vec![self.remaining], fetcher))
    }
}

fn ctx() -> Arc<Context> {
    Context::new(MockTransport::new(vec![])).shared()
}

/// An empty root whose pages are all behind the fetcher, so `n` pages
/// cost exactly `n` fetches
fn scripted(pages: Vec<Vec<i32>>) -> (Listing<i32>, Arc<AtomicUsize>) {
    scripted_with_failures(pages, 0)
}

fn scripted_with_failures(pages: Vec<Vec<i32>>, failures: usize) -> (Listing<i32>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = Scripted {
        pages: Arc::new(pages),
        index: 0,
        calls: Arc::clone(&calls),
        failures: Arc::new(AtomicUsize::new(failures)),
    };
    (Listing::with_fetcher(ctx(), vec![], fetcher), calls)
}

fn fetches(calls: &AtomicUsize) -> usize {
    calls.load(Ordering::SeqCst)
}

/// Minimal item read from `t3` objects
#[derive(Debug, PartialEq)]
struct Id(String);

impl FromObject for Id {
    const KIND: crate::wire::Kind = crate::wire::Kind::Post;

    fn from_data(data: JsonValue, _ctx: &Arc<Context>) -> Result<Self> {
        Ok(Id(data["id"].as_str().unwrap_or_default().to_string()))
    }
}

fn listing_page(ids: &[&str], after: Option<&str>) -> JsonValue {
    let children: Vec<JsonValue> = ids
        .iter()
        .map(|id| json!({"kind": "t3", "data": {"id": id}}))
        .collect();
    json!({"kind": "Listing", "data": {"after": after, "children": children}})
}

fn comment(id: &str, parent: &str) -> JsonValue {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "name": format!("t1_{id}"),
            "parent_id": parent,
            "link_id": "t3_post",
            "body": format!("comment {id}"),
            "created_utc": 1_700_000_000.0,
            "replies": ""
        }
    })
}

fn morechildren_response(things: Vec<JsonValue>) -> JsonValue {
    json!({"json": {"errors": [], "data": {"things": things}}})
}

fn ids(listing: &Listing<Comment>) -> Vec<String> {
    listing.items().iter().map(|c| c.data.id.clone()).collect()
}

// ============================================================================
// Traversal
// ============================================================================

#[tokio::test]
async fn test_full_traversal_fetches_each_page_once() {
    let (listing, calls) = scripted(vec![vec![1, 2], vec![3], vec![4, 5]]);

    let mut seen = Vec::new();
    listing.for_each(|item| seen.push(*item)).await.unwrap();

    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(fetches(&calls), 3);
}

#[tokio::test]
async fn test_second_traversal_uses_cache() {
    let (listing, calls) = scripted(vec![vec![1], vec![2]]);

    listing.for_each(|_| ()).await.unwrap();
    let mut seen = Vec::new();
    listing.for_each(|item| seen.push(*item)).await.unwrap();

    assert_eq!(seen, vec![1, 2]);
    assert_eq!(fetches(&calls), 2);
}

#[tokio::test]
async fn test_stopping_at_page_k_fetches_k_pages() {
    let (listing, calls) = scripted(vec![vec![1], vec![2], vec![3], vec![4]]);

    let mut pages = 0;
    listing
        .for_each_page(|page| {
            pages += 1;
            !page.contains(&2)
        })
        .await
        .unwrap();

    // root, [1], [2]
    assert_eq!(pages, 3);
    assert_eq!(fetches(&calls), 2);
}

#[tokio::test]
async fn test_for_each_stops_mid_page() {
    let (listing, calls) = scripted(vec![vec![1, 2, 3], vec![4]]);

    let mut seen = Vec::new();
    listing
        .for_each(|item| {
            seen.push(*item);
            if *item == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .unwrap();

    assert_eq!(seen, vec![1, 2]);
    assert_eq!(fetches(&calls), 1);
}

#[tokio::test]
async fn test_some_stops_at_first_match() {
    let (listing, calls) = scripted(vec![vec![1, 2], vec![3, 4], vec![5]]);

    assert!(listing.some(|item| *item == 4).await.unwrap());
    assert_eq!(fetches(&calls), 2);
}

#[tokio::test]
async fn test_some_without_match_walks_everything() {
    let (listing, calls) = scripted(vec![vec![1, 2], vec![3, 4], vec![5]]);

    assert!(!listing.some(|item| *item > 10).await.unwrap());
    assert_eq!(fetches(&calls), 3);
}

#[tokio::test]
async fn test_terminal_listing_never_fetches() {
    let listing = Listing::terminal(ctx(), vec![7, 8]);

    assert!(!listing.can_fetch_more());
    assert!(listing.continuation().await.unwrap().is_none());
    assert!(!listing.is_empty().await.unwrap());
    assert!(Listing::<i32>::empty(ctx()).is_empty().await.unwrap());
}

// ============================================================================
// Emptiness and caching
// ============================================================================

#[tokio::test]
async fn test_can_fetch_more_does_no_io() {
    let (listing, calls) = scripted(vec![vec![1]]);

    assert!(listing.can_fetch_more());
    assert!(listing.cached_continuation().is_none());
    assert_eq!(fetches(&calls), 0);
}

#[tokio::test]
async fn test_is_empty_with_local_items_does_no_io() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher = Scripted {
        pages: Arc::new(vec![vec![2]]),
        index: 0,
        calls: Arc::clone(&calls),
        failures: Arc::new(AtomicUsize::new(0)),
    };
    let listing = Listing::with_fetcher(ctx(), vec![1], fetcher);

    assert!(!listing.is_empty().await.unwrap());
    assert_eq!(fetches(&calls), 0);
}

#[tokio::test]
async fn test_is_empty_lookahead_is_cached() {
    let (listing, calls) = scripted(vec![vec![1], vec![2]]);

    assert!(!listing.is_empty().await.unwrap());
    assert_eq!(fetches(&calls), 1);
    assert!(listing.cached_continuation().is_some());

    let mut seen = Vec::new();
    listing.for_each(|item| seen.push(*item)).await.unwrap();
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(fetches(&calls), 2);
}

#[tokio::test]
async fn test_is_empty_when_next_page_is_empty() {
    let (listing, calls) = scripted(vec![vec![]]);

    assert!(listing.is_empty().await.unwrap());
    assert_eq!(fetches(&calls), 1);
}

#[tokio::test]
async fn test_concurrent_continuation_shares_one_fetch() {
    let (listing, calls) = scripted(vec![vec![1], vec![2]]);

    let (a, b) = tokio::join!(listing.is_empty(), listing.is_empty());

    assert!(!a.unwrap());
    assert!(!b.unwrap());
    assert_eq!(fetches(&calls), 1);
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() {
    let (listing, calls) = scripted_with_failures(vec![vec![1]], 1);

    let err = listing.continuation().await.unwrap_err();
    assert!(matches!(err, Error::Other(ref msg) if msg == "boom"));
    assert!(listing.cached_continuation().is_none());

    let next = listing.continuation().await.unwrap().unwrap();
    assert_eq!(next.items(), &[1]);
    assert_eq!(fetches(&calls), 2);
}

// ============================================================================
// Streams
// ============================================================================

#[tokio::test]
async fn test_stream_yields_all_items() {
    let (listing, calls) = scripted(vec![vec![1, 2], vec![], vec![3]]);

    let items: Vec<i32> = listing.stream().map_ok(|item| *item).try_collect().await.unwrap();

    assert_eq!(items, vec![1, 2, 3]);
    assert_eq!(fetches(&calls), 3);
}

#[tokio::test]
async fn test_pages_fetch_only_when_polled() {
    let (listing, calls) = scripted(vec![vec![1], vec![2], vec![3]]);

    let pages: Vec<Vec<i32>> = listing
        .pages()
        .take(2)
        .map_ok(<[i32]>::to_vec)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(pages, vec![vec![], vec![1]]);
    assert_eq!(fetches(&calls), 1);
}

#[tokio::test]
async fn test_stream_surfaces_fetch_errors() {
    let (listing, _calls) = scripted_with_failures(vec![vec![1]], 1);

    let result: Result<Vec<&i32>> = listing.stream().try_collect().await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_dropping_long_chain_does_not_overflow() {
    const PAGES: usize = 200_000;
    let listing = Listing::with_fetcher(ctx(), vec![], Countdown { remaining: PAGES });

    let mut visited = 0;
    listing.for_each(|_| visited += 1).await.unwrap();
    assert_eq!(visited, PAGES);

    drop(listing);
}

// ============================================================================
// Cursor pager
// ============================================================================

#[test]
fn test_pager_query_defaults() {
    let pager = CursorPager::new("t3_abc");
    let query = pager.query(&RequestDescriptor::new("r/rust/new"));

    assert_eq!(query.get("limit").map(String::as_str), Some(PAGE_LIMIT));
    assert_eq!(query.get("after").map(String::as_str), Some("t3_abc"));
}

#[test]
fn test_pager_base_query_wins() {
    let pager = CursorPager::new("t3_abc");
    let req = RequestDescriptor::new("r/rust/new")
        .with_query("after", "t3_override")
        .with_query("limit", "25")
        .with_query("t", "week");
    let query = pager.query(&req);

    assert_eq!(query.get("after").map(String::as_str), Some("t3_override"));
    assert_eq!(query.get("limit").map(String::as_str), Some("25"));
    assert_eq!(query.get("t").map(String::as_str), Some("week"));
}

#[test]
fn test_pager_start_has_empty_cursor() {
    let query = CursorPager::start().query(&RequestDescriptor::new("r/rust/new"));
    assert_eq!(query.get("after").map(String::as_str), Some(""));
}

#[tokio::test]
async fn test_cursor_fetcher_walks_pages() {
    let transport = MockTransport::new(vec![
        listing_page(&["a", "b"], Some("t3_b")),
        listing_page(&["c"], None),
    ]);
    let ctx = Context::new(transport.clone())
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();
    let listing: Listing<Id> = Listing::with_fetcher(ctx, vec![], CursorFetcher::start());

    let mut seen = Vec::new();
    listing.for_each(|item| seen.push(item.0.clone())).await.unwrap();

    assert_eq!(seen, vec!["a", "b", "c"]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "r/rust/new");
    assert_eq!(requests[0].1.get("after").map(String::as_str), Some(""));
    assert_eq!(requests[1].1.get("after").map(String::as_str), Some("t3_b"));
}

#[tokio::test]
async fn test_empty_after_ends_listing() {
    let transport = MockTransport::new(vec![listing_page(&["a"], Some(""))]);
    let ctx = Context::new(transport)
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();

    let page = CursorFetcher::<Id>::start().fetch(&ctx).await.unwrap();
    assert!(!page.can_fetch_more());
}

#[tokio::test]
async fn test_stalled_cursor_ends_listing() {
    let transport = MockTransport::new(vec![listing_page(&["a"], Some("t3_a"))]);
    let ctx = Context::new(transport)
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();

    let page = CursorFetcher::<Id>::new("t3_a").fetch(&ctx).await.unwrap();
    assert_eq!(page.items(), &[Id("a".to_string())]);
    assert!(!page.can_fetch_more());
}

#[tokio::test]
async fn test_cursor_cycle_ends_listing() {
    let transport = MockTransport::new(vec![
        listing_page(&["a"], Some("t3_a")),
        listing_page(&["b"], Some("t3_b")),
        listing_page(&["c"], Some("t3_a")),
    ]);
    let ctx = Context::new(transport.clone())
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();
    let listing: Listing<Id> = Listing::with_fetcher(ctx, vec![], CursorFetcher::start());

    let mut seen = Vec::new();
    listing.for_each(|item| seen.push(item.0.clone())).await.unwrap();

    assert_eq!(seen, vec!["a", "b", "c"]);
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn test_wrong_kind_is_rejected_and_not_cached() {
    let transport = MockTransport::new(vec![json!({"kind": "Other", "data": {}})]);
    let ctx = Context::new(transport)
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();
    let listing: Listing<Id> = Listing::with_fetcher(ctx, vec![], CursorFetcher::start());

    let err = listing.continuation().await.unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidKind { ref expected, ref found } if expected == "Listing" && found == "Other"
    ));
    assert!(listing.cached_continuation().is_none());
}

#[tokio::test]
async fn test_wrong_child_kind_is_rejected() {
    let transport = MockTransport::new(vec![json!({
        "kind": "Listing",
        "data": {"after": null, "children": [{"kind": "t1", "data": {}}]}
    })]);
    let ctx = Context::new(transport)
        .with_request(RequestDescriptor::new("r/rust/new"))
        .shared();

    let err = CursorFetcher::<Id>::start().fetch(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::InvalidKind { ref found, .. } if found == "t1"));
}

#[tokio::test]
async fn test_missing_request_descriptor() {
    let listing: Listing<Id> = Listing::with_fetcher(ctx(), vec![], CursorFetcher::start());

    let err = listing.is_empty().await.unwrap_err();
    assert!(matches!(err, Error::MissingRequestContext { .. }));
    assert_eq!(
        err.to_string(),
        "Unable to fetch next page: missing request descriptor"
    );
}

// ============================================================================
// More children
// ============================================================================

fn more_stub(children: Vec<String>, parent: &str) -> RawMore {
    RawMore {
        count: children.len() as u64,
        name: "t1_more".to_string(),
        id: "more".to_string(),
        parent_id: parent.to_string(),
        depth: 0,
        children,
    }
}

#[tokio::test]
async fn test_more_children_requests_in_chunks() {
    let hidden: Vec<String> = (0..150).map(|i| format!("c{i}")).collect();
    let transport = MockTransport::new(vec![
        morechildren_response(vec![comment("c0", "t3_post")]),
        morechildren_response(vec![comment("c100", "t3_post")]),
    ]);
    let ctx = Context::new(transport.clone()).with_post("t3_post").shared();
    let listing = Listing::with_fetcher(ctx, vec![], MoreChildren::new(more_stub(hidden, "t3_post")));

    let first = listing.continuation().await.unwrap().unwrap();
    assert_eq!(ids(first), vec!["c0"]);
    assert!(first.can_fetch_more());

    let second = first.continuation().await.unwrap().unwrap();
    assert_eq!(ids(second), vec!["c100"]);
    assert!(!second.can_fetch_more());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].0, "api/morechildren");
    assert_eq!(requests[0].1["link_id"], "t3_post");
    assert_eq!(requests[0].1["api_type"], "json");
    assert_eq!(requests[0].1["children"].split(',').count(), MORE_CHILDREN_CHUNK);
    assert_eq!(requests[1].1["children"].split(',').count(), 50);
    assert!(requests[1].1["children"].starts_with("c100,"));
}

#[tokio::test]
async fn test_more_children_rebuilds_tree() {
    let transport = MockTransport::new(vec![morechildren_response(vec![
        comment("a", "t1_root"),
        comment("b", "t1_a"),
        comment("c", "t1_gone"),
        json!({
            "kind": "more",
            "data": {
                "count": 2, "name": "t1_m", "id": "m",
                "parent_id": "t1_a", "children": ["x", "y"]
            }
        }),
    ])]);
    let ctx = Context::new(transport).with_post("t3_post").shared();
    let more = MoreChildren::new(more_stub(vec!["a".into(), "b".into(), "c".into()], "t1_root"));

    let page = more.fetch(&ctx).await.unwrap();

    // `c` replies to a comment outside the batch, so it lands at the top
    assert_eq!(ids(&page), vec!["a", "c"]);
    let a = &page.items()[0];
    assert_eq!(ids(&a.replies), vec!["b"]);
    assert!(a.replies.can_fetch_more());
    assert!(!page.can_fetch_more());
}

#[tokio::test]
async fn test_more_children_reports_api_errors() {
    let transport = MockTransport::new(vec![json!({
        "json": {"errors": [["TOO_MANY", "too many", "children"]]}
    })]);
    let ctx = Context::new(transport).with_post("t3_post").shared();
    let more = MoreChildren::new(more_stub(vec!["a".into()], "t3_post"));

    let err = more.fetch(&ctx).await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_more_children_needs_post() {
    let more = MoreChildren::new(more_stub(vec!["a".into()], "t3_post"));

    let err = more.fetch(&ctx()).await.unwrap_err();
    assert!(matches!(err, Error::MissingRequestContext { ref what } if what == "origin post"));
}

#[tokio::test]
async fn test_thread_continuation_loads_permalink() {
    let mut parent = comment("p", "t3_post");
    parent["data"]["replies"] = json!({
        "kind": "Listing",
        "data": {"after": null, "children": [comment("q", "t1_p")]}
    });
    let transport = MockTransport::new(vec![json!([
        {"kind": "Listing", "data": {"children": []}},
        {"kind": "Listing", "data": {"children": [parent]}}
    ])]);
    let ctx = Context::new(transport.clone()).with_post("t3_post").shared();
    let more = MoreChildren::new(more_stub(vec![], "t1_p"));
    assert!(more.is_thread_continuation());

    let page = more.fetch(&ctx).await.unwrap();

    assert_eq!(ids(&page), vec!["q"]);
    let requests = transport.requests();
    assert_eq!(requests[0].0, "comments/post");
    assert_eq!(requests[0].1["comment"], "p");
}
