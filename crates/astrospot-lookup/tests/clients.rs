//! Integration tests for the HTTP lookup clients using wiremock HTTP mocks.

use astrospot_core::Coordinate;
use astrospot_lookup::{
    BrightnessLookup, HttpBrightnessClient, HttpWeatherClient, LookupError, WeatherLookup,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn brightness_client(base_url: &str) -> HttpBrightnessClient {
    HttpBrightnessClient::new(base_url, 5, "astrospot-test")
        .expect("client construction should not fail")
}

fn weather_client(base_url: &str) -> HttpWeatherClient {
    HttpWeatherClient::new(base_url, "Europe/Warsaw", 5, "astrospot-test")
        .expect("client construction should not fail")
}

#[tokio::test]
async fn brightness_lookup_returns_parsed_reading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/darkness"))
        .and(query_param("latitude", "50.5"))
        .and(query_param("longitude", "20.25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 50.5,
            "longitude": 20.25,
            "relativeBrightness": 17.5
        })))
        .mount(&server)
        .await;

    let info = brightness_client(&server.uri())
        .lookup(Coordinate::new(50.5, 20.25))
        .await
        .expect("lookup should succeed")
        .expect("reading present");

    assert!((info.relative_brightness - 17.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn brightness_lookup_surfaces_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/darkness"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = brightness_client(&server.uri())
        .lookup(Coordinate::new(50.0, 20.0))
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::RateLimited { service: "brightness" }));
}

#[tokio::test]
async fn brightness_lookup_server_error_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/darkness"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = brightness_client(&server.uri())
        .lookup(Coordinate::new(50.0, 20.0))
        .await
        .expect("server errors are swallowed");

    assert!(result.is_none());
}

#[tokio::test]
async fn brightness_lookup_out_of_range_brightness_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/darkness"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 50.0,
            "longitude": 20.0,
            "relativeBrightness": 300.0
        })))
        .mount(&server)
        .await;

    let result = brightness_client(&server.uri())
        .lookup(Coordinate::new(50.0, 20.0))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn brightness_lookup_malformed_body_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/darkness"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = brightness_client(&server.uri())
        .lookup(Coordinate::new(50.0, 20.0))
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn weather_forecast_uses_default_timezone_when_blank() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "latitude": 50.0,
        "longitude": 20.0,
        "generationtime_ms": 0.2,
        "utc_offset_seconds": 7200,
        "timezone": "Europe/Warsaw",
        "timezone_abbreviation": "GMT+2",
        "elevation": 200.0,
        "hourly_units": { "time": "iso8601" },
        "data": [{
            "period": "2025-08-21/2025-08-22",
            "moon_illumination": 0.41,
            "hours": [{
                "timestamp": 1_755_810_000,
                "hour": "23:00",
                "temperature": 12.0,
                "cloudcover": 10,
                "visibility": 20000.0,
                "windspeed": 3.0,
                "windgust": 6.0
            }]
        }]
    });

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("timezone", "Europe/Warsaw"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let forecast = weather_client(&server.uri())
        .forecast(Coordinate::new(50.0, 20.0), Some(" "))
        .await
        .expect("forecast should parse");

    assert_eq!(forecast.data.len(), 1);
    assert_eq!(forecast.data[0].hours[0].hour, "23:00");
}

#[tokio::test]
async fn weather_forecast_passes_explicit_timezone() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("timezone", "UTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 50.0,
            "longitude": 20.0,
            "data": []
        })))
        .mount(&server)
        .await;

    let forecast = weather_client(&server.uri())
        .forecast(Coordinate::new(50.0, 20.0), Some("UTC"))
        .await
        .expect("forecast should parse");

    assert!(forecast.data.is_empty());
}

#[tokio::test]
async fn weather_forecast_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = weather_client(&server.uri())
        .forecast(Coordinate::new(50.0, 20.0), None)
        .await
        .unwrap_err();

    assert!(matches!(err, LookupError::UnexpectedStatus { status: 503, .. }));
}

#[tokio::test]
async fn weather_forecast_rate_limit_is_distinguishable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = weather_client(&server.uri())
        .forecast(Coordinate::new(50.0, 20.0), None)
        .await
        .unwrap_err();

    assert!(err.is_rate_limited());
}
