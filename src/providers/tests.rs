//! Provider tests against mock HTTP servers.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::Credentials;
use crate::types::{CandidatePayload, SizeFilter, TypeFilter};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, credentials: Credentials) -> Arc<Config> {
    let mut config = Config::default().with_credentials(credentials);
    config.endpoints.serpapi = server.uri();
    config.endpoints.duckduckgo = server.uri();
    config.endpoints.logo_dev = server.uri();
    config.endpoints.unsplash = server.uri();
    config.endpoints.pexels = server.uri();
    Arc::new(config)
}

fn all_keys() -> Credentials {
    Credentials {
        serpapi_key: Some("serp-key".into()),
        unsplash_access_key: Some("unsplash-key".into()),
        pexels_api_key: Some("pexels-key".into()),
    }
}

/// A gradient PNG large enough to pass the minimum logo size
fn logo_png() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(32, 32, |x, y| {
        image::Rgba([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8, 255])
    });
    let mut out = Vec::new();
    img.write_with_encoder(image::codecs::png::PngEncoder::new(&mut out))
        .unwrap();
    out
}

fn urls(outcome: &ProviderOutcome) -> Vec<String> {
    match outcome {
        ProviderOutcome::Success(refs) => refs
            .iter()
            .map(|r| match &r.payload {
                CandidatePayload::Url(u) => u.clone(),
                CandidatePayload::Bytes(_) => panic!("expected URL candidate"),
            })
            .collect(),
        other => panic!("expected success, got {:?}", other),
    }
}

// -----------------------------------------------------------------------
// SerpApi
// -----------------------------------------------------------------------

#[tokio::test]
async fn serpapi_without_key_is_unavailable() {
    let server = MockServer::start().await;
    let config = config_for(&server, Credentials::default());
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 3)).await;

    assert!(matches!(outcome, ProviderOutcome::Unavailable(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn serpapi_returns_originals_and_forwards_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("engine", "google_images"))
        .and(query_param("q", "golden gate"))
        .and(query_param("num", "3"))
        .and(query_param("api_key", "serp-key"))
        .and(query_param("imgsz", "l"))
        .and(query_param("imgtype", "photo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "images_results": [
                { "original": "https://a.example/1.jpg" },
                { "thumbnail": "https://a.example/thumb.jpg" },
                { "original": "https://a.example/2.jpg" },
                { "original": "https://a.example/3.jpg" },
                { "original": "https://a.example/4.jpg" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);
    let mut query = SourceQuery::new("golden gate", 3);
    query.filters.size = Some(SizeFilter::Large);
    query.filters.kind = Some(TypeFilter::Photo);

    let outcome = source.resolve(&query).await;

    assert_eq!(
        urls(&outcome),
        vec![
            "https://a.example/1.jpg",
            "https://a.example/2.jpg",
            "https://a.example/3.jpg"
        ]
    );
}

#[tokio::test]
async fn serpapi_empty_results_is_error_not_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "images_results": [] })))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("nothing", 3)).await;

    assert_eq!(outcome, ProviderOutcome::Error("no results".to_string()));
}

#[tokio::test]
async fn serpapi_reported_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Your account has run out of searches."
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 3)).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Error("Your account has run out of searches.".to_string())
    );
}

#[tokio::test]
async fn serpapi_server_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 3)).await;

    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.contains("500")));
}

#[tokio::test]
async fn lookup_timeout_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "images_results": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let mut config = (*config_for(&server, all_keys())).clone();
    config.timeouts.lookup = Duration::from_millis(100);
    let config = Arc::new(config);
    let source = SerpApiSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 3)).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Error("request timed out".to_string())
    );
}

// -----------------------------------------------------------------------
// DuckDuckGo
// -----------------------------------------------------------------------

#[tokio::test]
async fn duckduckgo_uses_token_then_returns_images() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "cat"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><script>vqd='4-111-222';</script>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/i.js"))
        .and(query_param("q", "cat"))
        .and(query_param("vqd", "4-111-222"))
        .and(query_param("o", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "image": "https://d.example/1.png" },
                { "image": "https://d.example/2.png" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = DuckDuckGoSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 5)).await;

    assert_eq!(
        urls(&outcome),
        vec!["https://d.example/1.png", "https://d.example/2.png"]
    );
}

#[tokio::test]
async fn duckduckgo_missing_token_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = DuckDuckGoSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("cat", 5)).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Error("search token not found".to_string())
    );
}

// -----------------------------------------------------------------------
// Logo.dev
// -----------------------------------------------------------------------

#[tokio::test]
async fn logo_dev_returns_bytes_candidate() {
    let server = MockServer::start().await;
    let body = logo_png();
    assert!(body.len() > 100);
    Mock::given(method("GET"))
        .and(path("/stripe.com"))
        .and(query_param("size", "200"))
        .and(query_param("format", "png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = LogoDevSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("stripe.com", 1)).await;

    match outcome {
        ProviderOutcome::Success(refs) => {
            assert_eq!(refs.len(), 1);
            assert_eq!(refs[0].source, SourceId::LogoDev);
            assert_eq!(refs[0].payload, CandidatePayload::Bytes(body));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn logo_dev_tiny_body_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/unknown.com"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = LogoDevSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("unknown.com", 1)).await;

    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.contains("too small")));
}

#[tokio::test]
async fn logo_dev_non_image_body_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme.com"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'<'; 500]))
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = LogoDevSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("acme.com", 1)).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Error("logo response is not an image".to_string())
    );
}

#[tokio::test]
async fn logo_dev_not_found_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.com"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = config_for(&server, Credentials::default());
    let source = LogoDevSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("missing.com", 1)).await;

    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.contains("404")));
}

// -----------------------------------------------------------------------
// Stock providers
// -----------------------------------------------------------------------

#[tokio::test]
async fn unsplash_sends_client_id_and_reads_regular_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .and(header("Authorization", "Client-ID unsplash-key"))
        .and(query_param("query", "office meeting"))
        .and(query_param("per_page", "2"))
        .and(query_param("orientation", "landscape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "urls": { "regular": "https://u.example/1.jpg", "small": "x" } },
                { "urls": { "regular": "https://u.example/2.jpg" } }
            ]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = UnsplashSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("office meeting", 2)).await;

    assert_eq!(
        urls(&outcome),
        vec!["https://u.example/1.jpg", "https://u.example/2.jpg"]
    );
}

#[tokio::test]
async fn unsplash_without_key_is_unavailable() {
    let server = MockServer::start().await;
    let config = config_for(&server, Credentials::default());
    let source = UnsplashSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("office", 2)).await;

    assert!(matches!(outcome, ProviderOutcome::Unavailable(_)));
}

#[tokio::test]
async fn unsplash_unauthorized_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/photos"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = UnsplashSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("office", 2)).await;

    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.contains("401")));
}

#[tokio::test]
async fn pexels_sends_raw_key_and_reads_large_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("Authorization", "pexels-key"))
        .and(query_param("query", "forest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "photos": [
                { "src": { "large": "https://p.example/1.jpg" } },
                { "src": { "original": "https://p.example/orig.jpg" } }
            ]
        })))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = PexelsSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("forest", 3)).await;

    assert_eq!(urls(&outcome), vec!["https://p.example/1.jpg"]);
}

#[tokio::test]
async fn pexels_malformed_body_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let config = config_for(&server, all_keys());
    let source = PexelsSource::new(lookup_client(&config).unwrap(), config);

    let outcome = source.resolve(&SourceQuery::new("forest", 3)).await;

    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.starts_with("malformed response")));
}

// -----------------------------------------------------------------------
// Direct
// -----------------------------------------------------------------------

#[tokio::test]
async fn direct_passes_http_urls_through() {
    let outcome = DirectSource::new()
        .resolve(&SourceQuery::new("https://example.com/img.png", 1))
        .await;
    assert_eq!(urls(&outcome), vec!["https://example.com/img.png"]);
}

#[tokio::test]
async fn direct_rejects_non_urls() {
    let outcome = DirectSource::new()
        .resolve(&SourceQuery::new("not a url", 1))
        .await;
    assert!(matches!(outcome, ProviderOutcome::Error(_)));

    let outcome = DirectSource::new()
        .resolve(&SourceQuery::new("ftp://example.com/img.png", 1))
        .await;
    assert!(matches!(outcome, ProviderOutcome::Error(ref c) if c.contains("ftp")));
}

#[test]
fn lookup_client_reports_builder_failure_as_network_error() {
    let mut config = Config::default();
    config.search.user_agent = "bad\nagent".into();

    assert!(matches!(lookup_client(&config), Err(Error::Network(_))));
}

#[tokio::test]
async fn default_sources_cover_every_id() {
    let sources = default_sources(Arc::new(Config::default())).unwrap();
    for id in [
        SourceId::SerpApi,
        SourceId::DuckDuckGo,
        SourceId::LogoDev,
        SourceId::Unsplash,
        SourceId::Pexels,
        SourceId::Direct,
    ] {
        assert_eq!(sources.get(&id).map(|s| s.id()), Some(id));
    }
}
