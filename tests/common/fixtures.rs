//! Image fixtures and acquirer builders

use image::RgbaImage;
use image::codecs::png::PngEncoder;
use image_acquire::{
    Acquirer, CandidateSource, ChainTable, Config, Normalizer, Resolver, SourceId,
    fetch::PayloadFetcher,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use super::sources::ScriptedSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes that no image decoder accepts
pub const GARBAGE: &[u8] = b"<html><body>not an image</body></html>";

/// Encode a solid RGBA image as PNG
pub fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba(pixel));
    let mut out = Vec::new();
    img.write_with_encoder(PngEncoder::new(&mut out))
        .expect("encode fixture png");
    out
}

/// A small opaque red PNG
pub fn red_png() -> Vec<u8> {
    png_bytes(4, 3, [255, 0, 0, 255])
}

/// Config with short timeouts and no retry delays
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.timeouts.lookup = Duration::from_secs(2);
    config.timeouts.download = Duration::from_secs(2);
    config.retry.max_attempts = 0;
    config.retry.jitter = false;
    config
}

/// Serve `body` at `route` on `server`
pub async fn serve(server: &MockServer, route: &str, status: u16, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
        .mount(server)
        .await;
}

/// The standard source set with `overrides` swapped in
///
/// Sources not overridden report `Unavailable`.
pub fn standard_sources(
    overrides: Vec<Arc<dyn CandidateSource>>,
) -> HashMap<SourceId, Arc<dyn CandidateSource>> {
    let mut sources: HashMap<SourceId, Arc<dyn CandidateSource>> = HashMap::new();
    for id in [
        SourceId::SerpApi,
        SourceId::DuckDuckGo,
        SourceId::LogoDev,
        SourceId::Unsplash,
        SourceId::Pexels,
        SourceId::Direct,
    ] {
        sources.insert(id, ScriptedSource::unavailable(id));
    }
    for source in overrides {
        sources.insert(source.id(), source);
    }
    sources
}

/// Acquirer over the standard chains and `config`, with scripted sources
pub fn acquirer_with_config(overrides: Vec<Arc<dyn CandidateSource>>, config: &Config) -> Acquirer {
    let resolver = Resolver::new(ChainTable::default(), standard_sources(overrides))
        .expect("standard chains resolve")
        .with_overfetch(config.search.overfetch_factor);
    let fetcher = PayloadFetcher::new(config).expect("build fetcher");
    Acquirer::from_parts(resolver, fetcher, Normalizer::new())
}

/// Acquirer over the standard chains with scripted sources
pub fn acquirer_with(overrides: Vec<Arc<dyn CandidateSource>>) -> Acquirer {
    acquirer_with_config(overrides, &test_config())
}
