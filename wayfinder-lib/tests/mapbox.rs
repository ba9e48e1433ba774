//! Mapbox backend against a local stand-in for the geocoding service.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use wayfinder_lib::backend::{CacheConfig, CachedBackend, LocationBackend, MapboxGeocoder};
use wayfinder_lib::error::LookupError;
use wayfinder_lib::{Candidate, Coordinates};

const PIER_BODY: &str = r#"{"type":"FeatureCollection","features":[{"id":"a1","text":"Pier 1","place_name":"Pier 1, SF, CA","center":[-122.4,37.8]}]}"#;

/// Serves every request with `status` and `body`, recording request URIs.
struct FakeGeocoding {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeGeocoding {
    async fn start(status: StatusCode, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Arc<Mutex<Vec<String>>> = Arc::default();

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        recorded.lock().unwrap().push(req.uri().to_string());
                        async move {
                            Ok::<_, Infallible>(
                                Response::builder()
                                    .status(status)
                                    .header("Content-Type", "application/json")
                                    .body(Full::new(Bytes::from(body)))
                                    .unwrap(),
                            )
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    fn endpoint(&self) -> String {
        format!("http://{}/geocoding/v5/mapbox.places", self.addr)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[tokio::test]
async fn test_maps_features_to_candidates() {
    let server = FakeGeocoding::start(StatusCode::OK, PIER_BODY).await;
    let geocoder =
        MapboxGeocoder::new(Some("pk.test".to_string())).with_endpoint(server.endpoint());

    let candidates = geocoder.search("pier 1").await.unwrap();

    assert_eq!(
        candidates,
        vec![Candidate {
            id: "a1".to_string(),
            name: "Pier 1".to_string(),
            address: Some("Pier 1, SF, CA".to_string()),
            distance: None,
            coordinates: Some(Coordinates::new(-122.4, 37.8)),
        }]
    );
    assert_eq!(
        server.requests(),
        vec![
            "/geocoding/v5/mapbox.places/pier%201.json\
             ?access_token=pk.test&autocomplete=true&limit=5&types=place%2Caddress%2Cpoi"
                .to_string()
        ]
    );
}

#[tokio::test]
async fn test_missing_token_sends_nothing() {
    let server = FakeGeocoding::start(StatusCode::OK, PIER_BODY).await;
    let geocoder = MapboxGeocoder::new(None).with_endpoint(server.endpoint());

    for _ in 0..3 {
        let err = geocoder.search("pier").await.unwrap_err();
        assert!(matches!(err, LookupError::NotConfigured));
    }
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_error_status_is_an_http_error() {
    let server = FakeGeocoding::start(
        StatusCode::UNAUTHORIZED,
        r#"{"message":"Not Authorized - Invalid Token"}"#,
    )
    .await;
    let geocoder =
        MapboxGeocoder::new(Some("pk.bad".to_string())).with_endpoint(server.endpoint());

    let err = geocoder.search("pier").await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.to_string(), "HTTP 401: Not Authorized - Invalid Token");
    assert!(!err.is_configuration());
}

#[tokio::test]
async fn test_malformed_body_is_a_parse_error() {
    let server = FakeGeocoding::start(StatusCode::OK, "<html>oops</html>").await;
    let geocoder =
        MapboxGeocoder::new(Some("pk.test".to_string())).with_endpoint(server.endpoint());

    let err = geocoder.search("pier").await.unwrap_err();
    assert!(matches!(err, LookupError::Parse { .. }));
}

#[tokio::test]
async fn test_unreachable_service_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let geocoder = MapboxGeocoder::new(Some("pk.test".to_string()))
        .with_endpoint(format!("http://{addr}/geocoding"));

    let err = geocoder.search("pier").await.unwrap_err();
    assert!(matches!(err, LookupError::Network(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_cache_answers_repeated_queries_locally() {
    let server = FakeGeocoding::start(StatusCode::OK, PIER_BODY).await;
    let geocoder =
        MapboxGeocoder::new(Some("pk.test".to_string())).with_endpoint(server.endpoint());
    let cached = CachedBackend::new(geocoder, CacheConfig::default());

    let first = cached.search("Pier 1").await.unwrap();
    let second = cached.search("pier 1 ").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(server.requests().len(), 1);
    assert_eq!(cached.name(), "mapbox");
}
