use axum::body::{to_bytes, Body};
use axum::http::Request;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

struct TestApp {
    app: Router,
    _dir: TempDir,
}

async fn test_app(server: &MockServer) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ReviewStore::open(dir.path().join("reviews.json"))
        .await
        .expect("open store");
    let client = GeoapifyClient::with_base_urls(
        "test-key",
        5,
        &format!("{}/v1/geocode/search", server.uri()),
        &format!("{}/v2/places", server.uri()),
    )
    .expect("client");

    TestApp {
        app: build_app(AppState {
            client,
            store: Arc::new(store),
            default_radius_km: 1.0,
            attempt_timeout: Duration::from_secs(5),
        }),
        _dir: dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn mount_college_park(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/geocode/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "geometry": { "type": "Point", "coordinates": [-76.9378, 38.9897] },
                "properties": { "name": "College Park" }
            }]
        })))
        .mount(server)
        .await;
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("bad_request", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "message").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn normalize_limit_caps_at_backend_maximum() {
    assert_eq!(proxy::normalize_limit(None), None);
    assert_eq!(proxy::normalize_limit(Some(0)), Some(1));
    assert_eq!(proxy::normalize_limit(Some(10_000)), Some(500));
    assert_eq!(proxy::normalize_limit(Some(25)), Some(25));
}

#[tokio::test]
async fn health_reports_ok_with_request_id() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn geocode_proxy_requires_query() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/geocode")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn geocode_proxy_returns_backend_body() {
    let server = MockServer::start().await;
    mount_college_park(&server).await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/geocode?query=College%20Park")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["features"][0]["properties"]["name"], "College Park");
}

#[tokio::test]
async fn places_proxy_requires_filter() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/places?categories=catering.cafe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["message"], "filter parameter required");
}

#[tokio::test]
async fn places_proxy_accepts_bbox_shorthand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .and(query_param("filter", "rect:-77,38.9,-76.9,39"))
        .and(query_param("categories", "commercial"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "features": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/places?bbox=-77,38.9,-76.9,39")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["features"], serde_json::json!([]));
}

#[tokio::test]
async fn places_proxy_surfaces_upstream_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(serde_json::json!({ "error": "Too many requests" })),
        )
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/places?filter=circle:-76.9,38.9,1000")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
    assert_eq!(json["error"]["message"], "Too many requests");
}

#[tokio::test]
async fn search_rejects_blank_country_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/search?city=College%20Park&country=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["message"], "country is required");
}

#[tokio::test]
async fn search_returns_display_items_with_provenance() {
    let server = MockServer::start().await;
    mount_college_park(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .and(query_param("categories", "catering.cafe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "properties": {
                    "name": "Board and Brew",
                    "categories": ["catering.cafe"],
                    "lat": 38.98, "lon": -76.93,
                    "formatted": "8150 Baltimore Ave, College Park, MD",
                    "city": "College Park"
                }
            }]
        })))
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(
        &t.app,
        get("/api/search?city=College%20Park&state=MD&country=USA&category=coffee&radiusKm=2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["outcome"], "results");
    assert_eq!(data["radii"], serde_json::json!([2000, 4000, 10000, 20000]));
    assert_eq!(data["attempts"], 1);
    assert_eq!(data["items"][0]["title"], "Board and Brew");
    assert_eq!(
        data["items"][0]["subtitle"],
        "8150 Baltimore Ave, College Park, MD · College Park"
    );
    assert_eq!(data["items"][0]["stage_label"], "direct");
}

#[tokio::test]
async fn search_exhausting_every_radius_is_empty() {
    let server = MockServer::start().await;
    mount_college_park(&server).await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "features": [] })),
        )
        .expect(4)
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/search?city=College%20Park&country=USA")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["outcome"], "empty");
    assert_eq!(json["data"]["message"], "No places found.");
    assert_eq!(json["data"]["items"], serde_json::json!([]));
}

#[tokio::test]
async fn search_for_unknown_location_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/geocode/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "features": [] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/places"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let t = test_app(&server).await;

    let (status, json) = send(&t.app, get("/api/search?city=Nowhereville&country=USA")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json["error"]["message"],
        idmap_places::present::NOT_FOUND_MESSAGE
    );
}

#[tokio::test]
async fn reviews_round_trip_through_the_store() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let payload = serde_json::json!({
        "coords": { "lat": 38.99, "lng": -76.94 },
        "placeName": "Board and Brew",
        "location": { "city": "College Park", "state": "MD", "country": "USA", "address": "8150 Baltimore Ave" },
        "comments": "Loud at lunch.",
        "challenges": { "noise": 4, "lighting": null },
        "created": "2024-05-01T12:00:00.000Z"
    });
    let (status, created) = send(&t.app, post_json("/api/reviews", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());
    assert!(created["timestamp"].is_string());
    assert_eq!(created["placeName"], "Board and Brew");
    assert_eq!(created["created"], "2024-05-01T12:00:00.000Z");
    assert_eq!(created["coords"]["lng"], -76.94);

    let (status, listed) = send(&t.app, get("/api/reviews")).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = listed.as_array().expect("bare array");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["id"], created["id"]);
    assert_eq!(reviews[0]["challenges"]["noise"], 4);
}

#[tokio::test]
async fn review_list_honours_filter_terms() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    for (place, city) in [("Board and Brew", "College Park"), ("Giant Food", "Hyattsville")] {
        let payload = serde_json::json!({
            "coords": { "lat": 38.99, "lng": -76.94 },
            "placeName": place,
            "location": { "city": city, "state": "MD", "country": "USA" }
        });
        let (status, _) = send(&t.app, post_json("/api/reviews", &payload)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, listed) = send(&t.app, get("/api/reviews?city=college&country=usa")).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = listed.as_array().expect("bare array");
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["placeName"], "Board and Brew");

    let (_, listed) = send(&t.app, get("/api/reviews?category=giant")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (_, listed) = send(&t.app, get("/api/reviews?state=&category=")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn review_without_country_is_rejected() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let payload = serde_json::json!({
        "coords": { "lat": 38.99, "lon": -76.94 },
        "location": { "city": "College Park", "country": "" }
    });
    let (status, json) = send(&t.app, post_json("/api/reviews", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");

    let (_, listed) = send(&t.app, get("/api/reviews")).await;
    assert_eq!(listed, serde_json::json!([]));
}

#[tokio::test]
async fn malformed_review_body_uses_error_envelope() {
    let server = MockServer::start().await;
    let t = test_app(&server).await;

    let (status, json) = send(
        &t.app,
        post_json("/api/reviews", &serde_json::json!({ "placeName": "No coords" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}
