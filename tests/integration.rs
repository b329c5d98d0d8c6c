use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use routiqo::api::rest::router;
use routiqo::models::location::GeoPoint;
use routiqo::providers::{Geocoder, ProviderError, RoadGeometryProvider, RoadPath};
use routiqo::state::AppState;
use routiqo::store::{demo, InMemoryStore, UnavailableStore};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> axum::Router {
    router(Arc::new(AppState::new(Arc::new(InMemoryStore::new()))))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> Value {
    let res = app
        .clone()
        .oneshot(json_request("POST", uri, body))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_json(res).await
}

struct FailingRoads;

#[async_trait]
impl RoadGeometryProvider for FailingRoads {
    async fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Result<RoadPath, ProviderError> {
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

struct FixedGeocoder;

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn geocode(&self, _address: &str) -> Result<GeoPoint, ProviderError> {
        Ok(GeoPoint::new(53.5503, 10.0006))
    }
}

async fn seed_two_order_scenario(app: &axum::Router) {
    post(app, "/hubs", json!({ "name": "Depot", "location": { "lat": 0.0, "lng": 0.0 } })).await;
    post(
        app,
        "/parking-zones",
        json!({ "name": "A", "location": { "lat": 0.0, "lng": 0.0 }, "availability_score": 10 }),
    )
    .await;
    post(
        app,
        "/parking-zones",
        json!({ "name": "B", "location": { "lat": 1.0, "lng": 1.0 }, "availability_score": 80 }),
    )
    .await;
    post(
        app,
        "/orders",
        json!({
            "customer_name": "First",
            "address": "1 Origin Road",
            "location": { "lat": 0.0, "lng": 0.0 },
            "priority_score": 5
        }),
    )
    .await;
    post(
        app,
        "/orders",
        json!({
            "customer_name": "Second",
            "address": "2 Diagonal Road",
            "location": { "lat": 1.0, "lng": 1.0 },
            "priority_score": 1
        }),
    )
    .await;
}

#[tokio::test]
async fn health_reports_backend_and_providers() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["road_geometry"], false);
    assert_eq!(body["geocoding"], false);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("orders_routed"));
}

#[tokio::test]
async fn two_order_scenario_produces_one_hub_to_hub_route() {
    let app = setup();
    seed_two_order_scenario(&app).await;

    let res = app
        .oneshot(get_request("/optimize-routes?strategy=balanced&vehicle_count=1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["degraded"], false);
    assert_eq!(body["vehicle_count"], 1);

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);

    let route = &routes[0];
    assert_eq!(route["vehicle_id"], "V-1");
    let stops = route["stops"].as_array().unwrap();
    let kinds: Vec<&str> = stops.iter().map(|s| s["kind"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["HUB", "STOP", "STOP", "HUB"]);

    assert_eq!(stops[1]["label"], "First");
    assert_eq!(stops[1]["parking"]["zone"]["name"], "A");
    assert_eq!(stops[1]["parking"]["risk"], "HIGH_RISK");
    assert_eq!(stops[2]["label"], "Second");
    assert_eq!(stops[2]["parking"]["zone"]["name"], "B");
    assert_eq!(stops[2]["parking"]["risk"], "SAFE");
    assert_eq!(stops[0]["location"], stops[3]["location"]);
}

#[tokio::test]
async fn failing_road_provider_falls_back_to_straight_lines() {
    let state = AppState::new(Arc::new(InMemoryStore::new()))
        .with_road_geometry(Arc::new(FailingRoads));
    let app = router(Arc::new(state));
    seed_two_order_scenario(&app).await;

    let res = app
        .oneshot(get_request("/optimize-routes?vehicle_count=1"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let route = &body["routes"][0];
    let stops = route["stops"].as_array().unwrap();
    let legs = route["legs"].as_array().unwrap();
    assert_eq!(legs.len(), 3);

    for (i, leg) in legs.iter().enumerate() {
        assert_eq!(leg["source"], "STRAIGHT_LINE");
        assert_eq!(leg["path"], json!([stops[i]["location"], stops[i + 1]["location"]]));
    }
    assert_eq!(route["metrics"]["fallback_legs"], 3);
}

#[tokio::test]
async fn parking_strategy_puts_high_priority_orders_first() {
    let app = router(Arc::new(AppState::new(Arc::new(InMemoryStore::seeded(
        demo::dataset(),
    )))));

    let res = app
        .oneshot(get_request("/optimize-routes?strategy=parking&vehicle_count=2"))
        .await
        .unwrap();
    let body = body_json(res).await;

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 2);
    let first_route_priorities: Vec<i64> = routes[0]["stops"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|s| s["priority_score"].as_i64())
        .collect();
    assert_eq!(first_route_priorities, vec![5, 5, 4]);
}

#[tokio::test]
async fn weighted_scoring_reports_fit_scores() {
    let app = router(Arc::new(AppState::new(Arc::new(InMemoryStore::seeded(
        demo::dataset(),
    )))));

    let res = app
        .oneshot(get_request("/optimize-routes?scoring=weighted&vehicle_count=1"))
        .await
        .unwrap();
    let body = body_json(res).await;

    assert_eq!(body["scoring"], "weighted");
    let stops = body["routes"][0]["stops"].as_array().unwrap();
    assert!(stops
        .iter()
        .filter(|s| s["kind"] == "STOP")
        .all(|s| s["parking"]["fit_score"].is_number()));
}

#[tokio::test]
async fn unknown_scoring_returns_400() {
    let app = setup();
    let res = app
        .oneshot(get_request("/optimize-routes?scoring=psychic"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_vehicle_count_returns_400() {
    let app = setup();
    let res = app
        .oneshot(get_request("/optimize-routes?vehicle_count=many"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_without_location_is_geocoded() {
    let state =
        AppState::new(Arc::new(InMemoryStore::new())).with_geocoder(Arc::new(FixedGeocoder));
    let app = router(Arc::new(state));

    let order = post(
        &app,
        "/orders",
        json!({ "customer_name": "Rathaus", "address": "Rathausmarkt 1, Hamburg" }),
    )
    .await;

    assert_eq!(order["location"]["lat"], 53.5503);
    assert_eq!(order["location"]["lng"], 10.0006);
    assert_eq!(order["status"], "Pending");
    assert_eq!(order["priority_score"], 1);
}

#[tokio::test]
async fn order_without_location_or_geocoder_uses_default_point() {
    let app = setup();

    let order = post(
        &app,
        "/orders",
        json!({ "customer_name": "Somewhere", "address": "Unknown Lane" }),
    )
    .await;

    assert_eq!(order["location"]["lat"], demo::DEFAULT_POINT.lat);
    assert_eq!(order["location"]["lng"], demo::DEFAULT_POINT.lng);
}

#[tokio::test]
async fn order_with_out_of_range_coordinates_returns_400() {
    let app = setup();
    let res = app
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "customer_name": "Nowhere",
                "address": "Pole",
                "location": { "lat": 123.0, "lng": 9.0 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_status_update_removes_it_from_optimization() {
    let app = setup();
    seed_two_order_scenario(&app).await;

    let res = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/orders/1/status",
            json!({ "status": "delivered" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["status"], "Delivered");

    let res = app
        .oneshot(get_request("/optimize-routes?vehicle_count=3"))
        .await
        .unwrap();
    let body = body_json(res).await;
    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["stops"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn get_nonexistent_order_returns_404() {
    let app = setup();
    let response = app.oneshot(get_request("/orders/999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_vehicle_zero_capacity_returns_400() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/vehicles",
            json!({ "name": "Van", "type": "Electric Van", "capacity": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_vehicle_accepts_type_alias() {
    let app = setup();
    let vehicle = post(
        &app,
        "/vehicles",
        json!({ "name": "Van 07", "type": "Electric Van", "capacity": 80 }),
    )
    .await;

    assert_eq!(vehicle["vehicle_type"], "Electric Van");
    assert_eq!(vehicle["status"], "Available");

    let res = app.oneshot(get_request("/vehicles")).await.unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_vehicle_accepts_lowercase_status() {
    let app = setup();
    let vehicle = post(
        &app,
        "/vehicles",
        json!({ "name": "Bike 02", "type": "Cargo Bike", "capacity": 20, "status": "maintenance" }),
    )
    .await;

    assert_eq!(vehicle["status"], "Maintenance");
}

#[tokio::test]
async fn create_hub_empty_name_returns_400() {
    let app = setup();
    let response = app
        .oneshot(json_request(
            "POST",
            "/hubs",
            json!({ "name": "  ", "location": { "lat": 53.5, "lng": 10.0 } }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn broken_store_degrades_reads_and_rejects_writes() {
    let app = router(Arc::new(AppState::new(Arc::new(UnavailableStore::new("connection refused")))));

    let res = app.clone().oneshot(get_request("/orders")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await, json!([]));

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/orders",
            json!({
                "customer_name": "Lost",
                "address": "1 Void Street",
                "location": { "lat": 53.5, "lng": 10.0 }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = app
        .clone()
        .oneshot(get_request("/optimize-routes"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["degraded"], true);
    assert_eq!(body["routes"].as_array().unwrap().len(), 3);

    let res = app.clone().oneshot(get_request("/dashboard-stats")).await.unwrap();
    assert_eq!(body_json(res).await["degraded"], true);

    let res = app.oneshot(get_request("/health")).await.unwrap();
    let body = body_json(res).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["storage"], "unavailable");
}

#[tokio::test]
async fn dashboard_stats_count_store_contents() {
    let app = router(Arc::new(AppState::new(Arc::new(InMemoryStore::seeded(
        demo::dataset(),
    )))));

    let res = app.oneshot(get_request("/dashboard-stats")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    assert_eq!(body["total_orders"], 6);
    assert_eq!(body["pending_orders"], 6);
    assert_eq!(body["vehicles"], 3);
    assert_eq!(body["hubs"], 1);
    assert_eq!(body["parking_zones"], 4);
    assert_eq!(body["high_risk_zones"], 1);
    assert_eq!(body["degraded"], false);
}
