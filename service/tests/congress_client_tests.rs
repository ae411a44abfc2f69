//! Integration tests for CongressApiClient using HTTP stubbing.
//!
//! These tests run `HttpCongressClient` against `MockHttpServer` so the
//! request shape (path, API key header, paging parameters) and response
//! handling are checked without real network calls.

mod common;

use std::time::{Duration, Instant};

use common::http_mock::MockHttpServer;
use serde_json::json;
use tc_rollcall::{BillType, Chamber};
use tinycongress_votes::congress::{
    CongressApiClient, CongressApiError, HttpCongressClient, MemberFilters,
};
use tinycongress_votes::fetch::{Fetcher, RetryPolicy};

fn single_attempt_client(server: &MockHttpServer) -> HttpCongressClient {
    let policy = RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default()
    };
    let fetcher = Fetcher::new(reqwest::Client::new(), policy, Duration::from_secs(5))
        .with_header("X-API-Key", "test-api-key");
    HttpCongressClient::with_fetcher(fetcher, server.url()).expect("should build client")
}

fn cosponsor(id: usize) -> serde_json::Value {
    json!({
        "bioguideId": format!("C{id:06}"),
        "firstName": "Pat",
        "lastName": format!("Member{id}"),
        "party": if id % 2 == 0 { "D" } else { "R" },
        "state": "OH",
        "sponsorshipDate": "2023-02-02",
        "isOriginalCosponsor": id < 10
    })
}

/// Test successful bill lookup with stubbed HTTP response.
#[tokio::test]
async fn test_get_bill_success() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/hr/815")
        .with_header("X-API-Key", "test-api-key")
        .with_query("format", "json")
        .respond_with_json(json!({
            "bill": {
                "congress": 118,
                "type": "HR",
                "number": "815",
                "title": "Making emergency supplemental appropriations",
                "originChamber": "House",
                "latestAction": {"actionDate": "2024-04-24", "text": "Became Public Law No: 118-50."}
            }
        }))
        .expect_times(1)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");

    let bill = client
        .get_bill(118, BillType::Hr, 815)
        .await
        .expect("should succeed");

    assert_eq!(bill.congress, 118);
    assert_eq!(bill.bill_type, "HR");
    assert_eq!(bill.number, "815");
    assert_eq!(bill.origin_chamber.as_deref(), Some("House"));
}

/// Test 404 response is handled as NotFound error.
#[tokio::test]
async fn test_get_bill_not_found() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/s/9999")
        .with_header("X-API-Key", "test-api-key")
        .respond_with_status(404)
        .expect_times(1)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");

    let result = client.get_bill(118, BillType::S, 9999).await;

    assert!(matches!(result, Err(CongressApiError::NotFound(what)) if what == "118-s-9999"));
}

/// Test API error response (500) is handled correctly.
#[tokio::test]
async fn test_get_bill_api_error() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/hr/815")
        .respond_with_status(500)
        .with_json_response(json!({"error": "Internal server error"}))
        .mount()
        .await;

    let client = single_attempt_client(&server);

    let result = client.get_bill(118, BillType::Hr, 815).await;

    assert!(matches!(
        result,
        Err(CongressApiError::ApiError { status: 500, .. })
    ));
}

/// A body that is not the expected JSON shape is a decode error, not a panic.
#[tokio::test]
async fn test_get_bill_unexpected_body() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/hr/815")
        .respond_with_json(json!({"error": {"message": "API_KEY_INVALID"}}))
        .mount()
        .await;

    let client = single_attempt_client(&server);

    let result = client.get_bill(118, BillType::Hr, 815).await;

    assert!(matches!(result, Err(CongressApiError::Decode { .. })));
}

/// Cosponsors are collected across pages until `pagination.next` disappears.
#[tokio::test]
async fn test_list_cosponsors_follows_pagination() {
    let server = MockHttpServer::start().await;
    let first_page: Vec<_> = (0..250).map(cosponsor).collect();
    let second_page: Vec<_> = (250..262).map(cosponsor).collect();

    server
        .expect_get("/bill/118/hr/2/cosponsors")
        .with_query("offset", "0")
        .with_query("limit", "250")
        .respond_with_json(json!({
            "cosponsors": first_page,
            "pagination": {"count": 262, "next": "https://api.congress.gov/v3/bill/118/hr/2/cosponsors?offset=250&limit=250"}
        }))
        .expect_times(1)
        .mount()
        .await;
    server
        .expect_get("/bill/118/hr/2/cosponsors")
        .with_query("offset", "250")
        .respond_with_json(json!({
            "cosponsors": second_page,
            "pagination": {"count": 262}
        }))
        .expect_times(1)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");

    let cosponsors = client
        .list_cosponsors(118, BillType::Hr, 2)
        .await
        .expect("should succeed");

    assert_eq!(cosponsors.len(), 262);
    assert_eq!(cosponsors[0].bioguide_id, "C000000");
    assert_eq!(cosponsors[261].bioguide_id, "C000261");
    assert!(cosponsors[0].is_original_cosponsor);
}

/// A bill with no cosponsors yields an empty list after one request.
#[tokio::test]
async fn test_list_cosponsors_empty() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/sres/10/cosponsors")
        .respond_with_json(json!({"cosponsors": [], "pagination": {"count": 0}}))
        .expect_times(1)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");

    let cosponsors = client
        .list_cosponsors(118, BillType::Sres, 10)
        .await
        .expect("should succeed");

    assert!(cosponsors.is_empty());
}

/// Member search passes the name and every filter as query parameters.
#[tokio::test]
async fn test_search_members_with_filters() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/member")
        .with_header("X-API-Key", "test-api-key")
        .with_query("q", "Booker")
        .with_query("congress", "118")
        .with_query("chamber", "senate")
        .with_query("state", "NJ")
        .respond_with_json(json!({
            "members": [
                {
                    "bioguideId": "B001288",
                    "name": "Booker, Cory A.",
                    "partyName": "Democratic",
                    "state": "New Jersey"
                }
            ]
        }))
        .expect_times(1)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");
    let filters = MemberFilters {
        congress: Some(118),
        chamber: Some(Chamber::Senate),
        state: Some("nj".to_string()),
    };

    let members = client
        .search_members("Booker", &filters)
        .await
        .expect("should succeed");

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].bioguide_id, "B001288");
    assert_eq!(members[0].party_name.as_deref(), Some("Democratic"));
}

/// An empty name is rejected before any request is made.
#[tokio::test]
async fn test_search_members_rejects_empty_name() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/member")
        .respond_with_json(json!({"members": []}))
        .expect_times(0)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");

    let result = client.search_members("   ", &MemberFilters::default()).await;

    assert!(matches!(result, Err(CongressApiError::InvalidRequest(_))));
}

/// Requests without the API key header are not matched by the stub.
#[tokio::test]
async fn test_api_key_header_is_required() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/hr/815")
        .with_header("X-API-Key", "right-key")
        .respond_with_json(json!({"bill": {}}))
        .expect_times(0)
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "wrong-key").expect("should build client");

    let result = client.get_bill(118, BillType::Hr, 815).await;

    assert!(matches!(result, Err(CongressApiError::NotFound(_))));
}

/// The plain constructor paces requests: once the burst is spent the next
/// request waits for a token.
#[tokio::test]
async fn test_default_client_is_rate_limited() {
    let server = MockHttpServer::start().await;

    server
        .expect_get("/bill/118/hr/815")
        .respond_with_json(json!({
            "bill": {"congress": 118, "type": "HR", "number": "815", "title": "Paced"}
        }))
        .mount()
        .await;

    let client =
        HttpCongressClient::new(server.url(), "test-api-key").expect("should build client");
    let limiter = client.rate_limiter().expect("default client has a limiter");
    let burst = limiter.burst();
    let interval = Duration::from_secs_f64(1.0 / limiter.requests_per_second());

    let started = Instant::now();
    for _ in 0..burst {
        client
            .get_bill(118, BillType::Hr, 815)
            .await
            .expect("burst request should succeed");
    }

    client
        .get_bill(118, BillType::Hr, 815)
        .await
        .expect("paced request should succeed");

    assert!(
        started.elapsed() >= interval.mul_f64(0.8),
        "request past the burst should wait about {interval:?}, took {:?}",
        started.elapsed()
    );
}

/// A caller-supplied fetcher without a limiter still gets the default ceiling.
#[tokio::test]
async fn test_with_fetcher_attaches_default_limiter() {
    let server = MockHttpServer::start().await;
    let client = single_attempt_client(&server);

    let limiter = client.rate_limiter().expect("limiter should be attached");
    assert!(limiter.requests_per_second() > 0.0);
    assert!(limiter.burst() >= 1);
}
