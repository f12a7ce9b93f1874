//! Integration tests for the chirp client over real HTTP.
//!
//! Each test starts a small axum stub of the API on a random port and
//! drives it through the default reqwest transport.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response as HttpResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chirp_rs::error::codes;
use chirp_rs::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Default)]
struct Stub {
    credentials_hits: AtomicUsize,
    lookup_hits: AtomicUsize,
}

type Params = Query<HashMap<String, String>>;

fn api_error(status: StatusCode, message: &str, code: i64) -> HttpResponse {
    (
        status,
        Json(json!({"errors": [{"message": message, "code": code}]})),
    )
        .into_response()
}

async fn verify_credentials(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> HttpResponse {
    stub.credentials_hits.fetch_add(1, Ordering::SeqCst);
    // Give concurrent callers time to pile up behind the first request.
    tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    let token = headers.get("authorization").and_then(|v| v.to_str().ok());
    if token != Some("Bearer test-token") {
        return api_error(
            StatusCode::UNAUTHORIZED,
            "Could not authenticate you.",
            codes::AUTHENTICATION_PROBLEM,
        );
    }
    Json(json!({"id": 7505382, "screen_name": "sferik"})).into_response()
}

async fn follower_ids(Query(params): Params) -> HttpResponse {
    if params.get("screen_name").map(String::as_str) != Some("sferik") {
        return api_error(
            StatusCode::NOT_FOUND,
            "Sorry, that page does not exist",
            codes::RESOURCE_NOT_FOUND,
        );
    }
    let page = match params.get("cursor").map(String::as_str) {
        Some("-1") => json!({"ids": [10, 20], "next_cursor": 1400, "previous_cursor": 0}),
        Some("1400") => json!({"ids": [30], "next_cursor": 0, "previous_cursor": -1400}),
        _ => return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad cursor"}))).into_response(),
    };
    Json(page).into_response()
}

async fn users_lookup(State(stub): State<Arc<Stub>>, Query(params): Params) -> HttpResponse {
    stub.lookup_hits.fetch_add(1, Ordering::SeqCst);
    let mut users = Vec::new();
    if let Some(ids) = params.get("user_id") {
        for id in ids.split(',') {
            users.push(json!({
                "id": id.parse::<i64>().unwrap_or_default(),
                "screen_name": format!("user{id}"),
            }));
        }
    }
    if let Some(names) = params.get("screen_name") {
        for name in names.split(',') {
            users.push(json!({"id": 0, "screen_name": name}));
        }
    }
    Json(Value::Array(users)).into_response()
}

async fn favorite(Json(body): Json<Value>) -> HttpResponse {
    match body.get("id").and_then(Value::as_i64) {
        Some(1) => api_error(
            StatusCode::FORBIDDEN,
            "You have already favorited this status.",
            codes::ALREADY_FAVORITED,
        ),
        Some(id) => (
            [
                ("x-rate-limit-limit", "1000"),
                ("x-rate-limit-remaining", "999"),
            ],
            Json(json!({"id": id, "favorited": true})),
        )
            .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": ["Missing id\n"]})),
        )
            .into_response(),
    }
}

async fn rate_limited() -> HttpResponse {
    (
        StatusCode::TOO_MANY_REQUESTS,
        [
            ("x-rate-limit-limit", "180"),
            ("x-rate-limit-remaining", "0"),
            ("x-rate-limit-reset", "4102444800"),
        ],
        Json(json!({"errors": [{"message": "Rate limit exceeded", "code": 88}]})),
    )
        .into_response()
}

async fn plain_text() -> &'static str {
    "ok, but not json"
}

async fn empty_body() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn truncated_user() -> HttpResponse {
    (
        [
            ("content-type", "application/json; charset=utf-8"),
            ("x-rate-limit-remaining", "41"),
        ],
        r#"{"id": 1, "screen_name": "bo"#,
    )
        .into_response()
}

/// Helper: spawn the stub on port 0 (random available port).
async fn spawn_stub() -> (Arc<Stub>, String) {
    let stub = Arc::new(Stub::default());
    let router = Router::new()
        .route("/1.1/account/verify_credentials.json", get(verify_credentials))
        .route("/1.1/followers/ids.json", get(follower_ids))
        .route("/1.1/users/lookup.json", get(users_lookup))
        .route("/1.1/favorites/create.json", post(favorite))
        .route("/1.1/statuses/home_timeline.json", get(rate_limited))
        .route("/plain", get(plain_text))
        .route("/empty", get(empty_body))
        .route("/1.1/users/show.json", get(truncated_user))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (stub, format!("http://{addr}"))
}

fn client_for(base: &str) -> Client {
    Client::new(
        ClientConfig::default()
            .with_base_url(base)
            .with_bearer_token("test-token"),
    )
    .unwrap()
}

#[derive(Debug, Deserialize)]
struct Favorite {
    id: i64,
    favorited: bool,
    #[serde(skip)]
    rate_limit: RateLimit,
}

impl Hydrate for Favorite {
    fn from_record(record: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(record)
    }

    fn from_envelope(response: &Response) -> Result<Self, serde_json::Error> {
        let mut favorite = Self::from_record(response.body.clone())?;
        favorite.rate_limit = RateLimit::from_headers(&response.headers);
        Ok(favorite)
    }
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    screen_name: String,
}

impl Hydrate for User {
    fn from_record(record: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(record)
    }
}

impl Identified for User {
    fn id(&self) -> i64 {
        self.id
    }
}

fn favorite_request(id: i64) -> Request {
    Request::post("/1.1/favorites/create.json", Options::new()).with_option("id", id)
}

// ── Identity + cursors ───────────────────────────────────────────────

#[tokio::test]
async fn default_identity_drives_cursor_walk() {
    let (stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let options = client
        .merge_identifier_or_default(&Options::new(), None, None)
        .await
        .unwrap();
    assert_eq!(options["screen_name"], "sferik");

    let first: Cursor<Value> = client
        .cursor("ids", Request::get("/1.1/followers/ids.json", options))
        .await
        .unwrap();
    assert_eq!(first.next_cursor(), 1400);
    assert_eq!(first.request().option("cursor"), Some(&json!(-1)));

    let ids = first.collect_all().await.unwrap();
    assert_eq!(ids, vec![json!(10), json!(20), json!(30)]);

    assert_eq!(client.screen_name().await.unwrap(), "sferik");
    assert_eq!(stub.credentials_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_identity_lookups_share_one_request() {
    let (stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let ids = futures::future::join_all((0..10).map(|_| client.user_id())).await;
    assert!(ids.into_iter().all(|id| id.unwrap() == 7505382));
    assert_eq!(stub.credentials_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (stub, base) = spawn_stub().await;
    let client = Client::new(ClientConfig::default().with_base_url(&base)).unwrap();

    let err = client.identity().await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Unauthorized));
    assert_eq!(err.code(), Some(codes::AUTHENTICATION_PROBLEM));

    // Not cached: a second call hits the endpoint again.
    assert!(client.identity().await.is_err());
    assert_eq!(stub.credentials_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn walk_of_unknown_user_fails_first_page() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let options = merge_identifier(&Options::new(), &"nobody".into(), None);
    let err = client
        .cursor::<Value>("ids", Request::get("/1.1/followers/ids.json", options))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    assert_eq!(err.code(), Some(codes::RESOURCE_NOT_FOUND));
}

// ── Batched lookups ──────────────────────────────────────────────────

#[tokio::test]
async fn batched_lookup_over_http() {
    let (stub, base) = spawn_stub().await;
    let client = Client::new(
        ClientConfig::default()
            .with_base_url(&base)
            .with_bearer_token("test-token")
            .with_batch_size(2),
    )
    .unwrap();

    let known = User {
        id: 3,
        screen_name: "user3".into(),
    };
    let identifiers = vec![
        Identifier::NumericId(1),
        Identifier::from("alice"),
        Identifier::NumericId(2),
        Identifier::from("https://twitter.com/bob"),
        Identifier::object(&known),
    ];
    let users: Vec<User> = client
        .objects_in_batches(
            &Request::get("/1.1/users/lookup.json", Options::new()),
            &identifiers,
        )
        .await
        .unwrap();

    let names: Vec<&str> = users.iter().map(|u| u.screen_name.as_str()).collect();
    assert_eq!(names, vec!["user1", "alice", "user2", "bob", "user3"]);
    assert_eq!(stub.lookup_hits.load(Ordering::SeqCst), 3);
}

// ── Write calls and error classification ─────────────────────────────

#[tokio::test]
async fn post_sends_json_body_and_reads_rate_limit() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let favorite: Favorite = client.object(&favorite_request(2)).await.unwrap();
    assert_eq!(favorite.id, 2);
    assert!(favorite.favorited);
    assert_eq!(favorite.rate_limit.limit, Some(1000));
    assert_eq!(favorite.rate_limit.remaining, Some(999));
}

#[tokio::test]
async fn forbidden_is_narrowed_by_message() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let plain = client.object::<Favorite>(&favorite_request(1)).await;
    assert_eq!(plain.unwrap_err().kind(), Some(ErrorKind::Forbidden));

    let narrowed = client
        .object::<Favorite>(&favorite_request(1))
        .await
        .disambiguate(ErrorKind::AlreadyFavorited)
        .unwrap_err();
    assert_eq!(narrowed.kind(), Some(ErrorKind::AlreadyFavorited));
    assert_eq!(narrowed.code(), Some(codes::ALREADY_FAVORITED));

    // A different conflict kind leaves the error alone.
    let other = client
        .object::<Favorite>(&favorite_request(1))
        .await
        .disambiguate(ErrorKind::DuplicateStatus)
        .unwrap_err();
    assert_eq!(other.kind(), Some(ErrorKind::Forbidden));
}

#[tokio::test]
async fn parallel_favorites_skip_ignorable_conflicts() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let favorites: Vec<Favorite> = client
        .parallel_objects([3, 1, 2], &[ErrorKind::Forbidden], favorite_request)
        .await
        .unwrap();
    let ids: Vec<i64> = favorites.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![3, 2]);

    let strict = client
        .parallel_objects::<_, Favorite, _>([3, 1, 2], &[], favorite_request)
        .await;
    assert_eq!(strict.unwrap_err().kind(), Some(ErrorKind::Forbidden));
}

#[tokio::test]
async fn bare_string_error_is_chomped() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let err = client
        .object::<Favorite>(&Request::post("/1.1/favorites/create.json", Options::new()))
        .await
        .unwrap_err();
    match err {
        Error::Api(api) => {
            assert_eq!(api.kind(), ErrorKind::BadRequest);
            assert_eq!(api.message(), "Missing id");
            assert_eq!(api.code(), None);
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_error_carries_snapshot() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let err = client
        .objects::<Value>(&Request::get(
            "/1.1/statuses/home_timeline.json",
            Options::new(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::TooManyRequests));
    assert_eq!(err.code(), Some(codes::RATE_LIMIT_EXCEEDED));

    let rate_limit = err.rate_limit();
    assert_eq!(rate_limit.limit, Some(180));
    assert_eq!(rate_limit.remaining, Some(0));
    assert_eq!(rate_limit.reset_at.map(|t| t.timestamp()), Some(4102444800));
    assert!(rate_limit.reset_in().is_some_and(|secs| secs > 0));
}

#[tokio::test]
async fn empty_and_plain_text_bodies_decode_to_null() {
    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    for path in ["/plain", "/empty"] {
        let response = client
            .perform(&Request::get(path, Options::new()))
            .await
            .unwrap();
        assert!(response.is_success());
        assert!(response.body.is_null());
        assert!(response.decode_error.is_none());
    }
}

#[tokio::test]
async fn truncated_json_body_is_hydration_error() {
    use std::error::Error as _;

    let (_stub, base) = spawn_stub().await;
    let client = client_for(&base);

    let err = client
        .object::<Value>(&Request::get("/1.1/users/show.json", Options::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Hydration { .. }));
    assert!(err.source().is_some());
    assert_eq!(err.rate_limit().remaining, Some(41));
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let client = Client::new(
        ClientConfig::default()
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(std::time::Duration::from_secs(2)),
    )
    .unwrap();

    let err = client
        .perform(&Request::get("/1.1/help/configuration.json", Options::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(err.rate_limit().is_empty());
}
