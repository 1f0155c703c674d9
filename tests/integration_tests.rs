//! Integration tests against local stand-ins for the geocoding, IP location
//! and gpsd services

use std::collections::HashMap;
use std::process::Command;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use routeplanner::config::RoutePlannerConfig;
use routeplanner::geolocation::{IpLocator, LocationStrategy, NominatimGeocoder, TextGeocoder};
use routeplanner::{Endpoint, LocationSource, RouteError, RoutePlanner, TollTable, VariantKind};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

async fn search(Query(params): Query<HashMap<String, String>>, headers: HeaderMap) -> Response {
    // Nominatim's usage policy requires an identifying User-Agent
    if !headers.contains_key(header::USER_AGENT) {
        return StatusCode::FORBIDDEN.into_response();
    }
    if params.get("format").map(String::as_str) != Some("json")
        || params.get("limit").map(String::as_str) != Some("1")
    {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let hit = match params.get("q").map(String::as_str) {
        Some("Interlaken") => json!([{"lat": "46.6863", "lon": "7.8632", "display_name": "Interlaken, Bern, Schweiz"}]),
        Some("Bern") => json!([{"lat": "46.9480", "lon": "7.4474", "display_name": "Bern, Schweiz"}]),
        Some("New York") => json!([{"lat": "40.7127", "lon": "-74.0060", "display_name": "New York, United States"}]),
        Some("Philadelphia") => json!([{"lat": "39.9526", "lon": "-75.1652", "display_name": "Philadelphia, United States"}]),
        _ => json!([]),
    };
    Json(hit).into_response()
}

async fn ip_bern() -> Json<Value> {
    Json(json!({
        "ip": "203.0.113.7",
        "city": "Bern",
        "country_name": "Switzerland",
        "latitude": 46.948,
        "longitude": 7.4474
    }))
}

async fn ip_rate_limited() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, Json(json!({"error": true, "reason": "RateLimited"}))).into_response()
}

async fn ip_broken() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Geocoding and IP location on one local server
async fn services() -> String {
    let app = Router::new()
        .route("/search", get(search))
        .route("/json/", get(ip_bern))
        .route("/limited/", get(ip_rate_limited))
        .route("/broken/", get(ip_broken));
    serve(app).await
}

fn config_for(base_url: &str, ip_path: &str) -> RoutePlannerConfig {
    let mut config = RoutePlannerConfig::default();
    config.geolocation.geocoding_url = base_url.to_string();
    config.geolocation.ip_location_url = format!("{base_url}{ip_path}");
    config.geolocation.gps_enabled = false;
    config.geolocation.timeout_seconds = 5;
    config.navigation.open_browser = false;
    config
}

#[tokio::test]
async fn test_nominatim_geocoder_against_local_service() {
    init_tracing();
    let base_url = services().await;
    let geocoder = NominatimGeocoder::new(&config_for(&base_url, "/json/").geolocation).unwrap();

    let fix = geocoder.geocode("Interlaken").await.unwrap();
    assert!((fix.coordinate.latitude() - 46.6863).abs() < 1e-9);
    assert_eq!(fix.display_name.as_deref(), Some("Interlaken, Bern, Schweiz"));

    let err = geocoder.geocode("Nowhere12345xyz").await.unwrap_err();
    assert!(matches!(err, RouteError::Geocode { ref query, .. } if query == "Nowhere12345xyz"));
}

#[tokio::test]
async fn test_ip_locator_against_local_service() {
    let base_url = services().await;

    let locator = IpLocator::new(&config_for(&base_url, "/json/").geolocation).unwrap();
    let fix = locator.locate().await.unwrap();
    assert_eq!(fix.display_name.as_deref(), Some("Bern, Switzerland"));

    let locator = IpLocator::new(&config_for(&base_url, "/limited/").geolocation).unwrap();
    let err = locator.locate().await.unwrap_err();
    assert!(matches!(err, RouteError::LocationUnavailable { .. }));
    assert!(err.to_string().contains("quota"));
}

#[tokio::test]
async fn test_plan_from_ip_location() {
    init_tracing();
    let base_url = services().await;
    let config = config_for(&base_url, "/json/");
    let tolls = TollTable::bundled().unwrap();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    let plan = planner.plan(None, "Interlaken").await.unwrap();
    assert_eq!(plan.origin.source, LocationSource::Ip);
    assert!(plan.distance_km > 40.0 && plan.distance_km < 45.0);
    assert_eq!(plan.estimated_toll, 42.0);
    assert_eq!(plan.options.cheapest().toll_cost, 0.0);
    assert_eq!(plan.chosen, VariantKind::Cheapest);
    assert!(plan.navigation_url.starts_with("https://www.google.com/maps/dir/?api=1&origin=46.948000%2C7.447400"));
    assert!(!planner.hand_off(&plan).unwrap());
}

#[tokio::test]
async fn test_plan_between_named_places() {
    let base_url = services().await;
    let mut config = config_for(&base_url, "/broken/");
    config.navigation.handoff_variant = VariantKind::Fastest;
    let tolls = TollTable::bundled().unwrap();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    // a named origin never touches the IP service
    let plan = planner.plan(Some("New York"), "Philadelphia").await.unwrap();
    assert_eq!(plan.origin.source, LocationSource::TextGeocode);
    assert!(plan.estimated_toll > 0.0);
    assert!(plan.options.fastest().total_cost > plan.options.cheapest().total_cost);
    assert!(!plan.navigation_url.contains("avoid=tolls"));
}

#[tokio::test]
async fn test_fallback_place_after_ip_failure() {
    let base_url = services().await;
    let mut config = config_for(&base_url, "/broken/");
    config.geolocation.fallback_place = Some("Bern".to_string());
    let tolls = TollTable::bundled().unwrap();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    let plan = planner.plan(Some("here"), "Interlaken").await.unwrap();
    assert_eq!(plan.origin.source, LocationSource::TextGeocode);
    assert_eq!(plan.origin.display_name.as_deref(), Some("Bern, Schweiz"));
}

#[tokio::test]
async fn test_no_location_source_fails_with_origin() {
    let base_url = services().await;
    let config = config_for(&base_url, "/broken/");
    let tolls = TollTable::bundled().unwrap();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    let err = planner.plan(None, "Interlaken").await.unwrap_err();
    assert_eq!(err.endpoint(), Some(Endpoint::Origin));
    assert!(err.to_string().contains("Location unavailable"));
}

#[tokio::test]
async fn test_unknown_destination_fails_with_destination() {
    let base_url = services().await;
    let config = config_for(&base_url, "/json/");
    let tolls = TollTable::bundled().unwrap();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    let err = planner.plan(None, "Nowhere12345xyz").await.unwrap_err();
    assert_eq!(err.endpoint(), Some(Endpoint::Destination));
    assert!(err.user_message().contains("Nowhere12345xyz"));
}

#[tokio::test]
async fn test_gpsd_is_preferred_over_ip() {
    let gpsd = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let gpsd_address = gpsd.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut socket, _) = gpsd.accept().await.unwrap();
        let mut watch = [0u8; 64];
        let _ = socket.read(&mut watch).await;
        socket
            .write_all(b"{\"class\":\"VERSION\",\"release\":\"3.25\"}\n{\"class\":\"TPV\",\"mode\":3,\"lat\":46.6863,\"lon\":7.8632}\n")
            .await
            .unwrap();
    });

    let base_url = services().await;
    let mut config = config_for(&base_url, "/json/");
    config.geolocation.gps_enabled = true;
    config.geolocation.gpsd_address = gpsd_address;
    let tolls = TollTable::empty();
    let planner = RoutePlanner::from_config(&config, &tolls).unwrap();

    let plan = planner.plan(None, "Bern").await.unwrap();
    assert_eq!(plan.origin.source, LocationSource::Gps);
    assert_eq!(plan.estimated_toll, 0.0);
}

fn run_cli(base_url: &str, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_routeplanner"))
        .args(["--config", "/nonexistent/routeplanner.toml"])
        .args(args)
        .env("ROUTEPLANNER_GEOLOCATION__GEOCODING_URL", base_url)
        .env("ROUTEPLANNER_GEOLOCATION__IP_LOCATION_URL", format!("{base_url}/json/"))
        .env("ROUTEPLANNER_GEOLOCATION__GPS_ENABLED", "false")
        .env("ROUTEPLANNER_NAVIGATION__OPEN_BROWSER", "false")
        .output()
        .expect("Failed to execute routeplanner")
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_routeplanner"))
        .arg("--help")
        .output()
        .expect("Failed to execute routeplanner");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("route"));
    assert!(stdout.contains("locate"));
}

#[tokio::test]
async fn test_cli_route_json() {
    let base_url = services().await;
    let output = tokio::task::spawn_blocking(move || {
        run_cli(&base_url, &["--format", "json", "route", "--to", "Interlaken"])
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["options"].as_array().unwrap().len(), 3);
    assert_eq!(plan["origin"]["source"], "IP");
    assert_eq!(plan["chosen"], "cheapest");
}

#[tokio::test]
async fn test_cli_ask_announces_options() {
    let base_url = services().await;
    let output = tokio::task::spawn_blocking(move || {
        run_cli(&base_url, &["ask", "best", "route", "from", "Bern", "to", "Interlaken", "please"])
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Option 1: Fastest Route"));
    assert!(stdout.contains("Option 2: Cheapest Route"));
    assert!(stdout.contains("Option 3: Balanced Route"));
}

#[tokio::test]
async fn test_cli_reports_failure() {
    let base_url = services().await;
    let output = tokio::task::spawn_blocking(move || {
        run_cli(&base_url, &["route", "--to", "Nowhere12345xyz"])
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Sorry, I couldn't plan the route."));
    assert!(stderr.contains("Nowhere12345xyz"));
}

#[tokio::test]
async fn test_cli_ask_navigate_home_geocodes_destination() {
    let base_url = services().await;
    let output = tokio::task::spawn_blocking(move || run_cli(&base_url, &["ask", "navigate", "home"]))
        .await
        .unwrap();

    // "home" is looked up as a place name, never planned as a zero-length trip
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("I could not work out the destination."));
    assert!(stderr.contains("I could not find a place called home."));
}
