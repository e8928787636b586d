//! Artifact normalization: decode, flatten transparency, re-encode, store.
//!
//! Every artifact ends up as an 8-bit RGB PNG. Transparent areas are always
//! composited over opaque white; this is not configurable.

use crate::error::NormalizeError;
use crate::types::{ArtifactFormat, StoredArtifact};
use image::codecs::png::PngEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Background used when flattening transparency
const BACKGROUND: u8 = 255;

/// Decode `raw`, flatten it and encode it to the canonical format
///
/// Pure function; no I/O.
pub fn normalize_bytes(raw: &[u8]) -> Result<Vec<u8>, NormalizeError> {
    let img = image::load_from_memory(raw).map_err(NormalizeError::Decode)?;
    let rgb = flatten(img);

    let mut buf = Vec::new();
    let encoder = PngEncoder::new(&mut buf);
    rgb.write_with_encoder(encoder)
        .map_err(NormalizeError::Encode)?;
    Ok(buf)
}

/// Drop the alpha channel, compositing over white when there is one
///
/// Fully opaque pixels keep their exact colour; fully transparent pixels become white.
pub fn flatten(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        out.put_pixel(x, y, Rgb([blend(r, a), blend(g, a), blend(b, a)]));
    }
    out
}

fn blend(channel: u8, alpha: u8) -> u8 {
    let c = u32::from(channel);
    let a = u32::from(alpha);
    let bg = u32::from(BACKGROUND);
    // Rounded integer blend; exact at a == 0 and a == 255
    ((c * a + bg * (255 - a) + 127) / 255) as u8
}

/// Writes normalized artifacts to disk
///
/// Each call performs at most one visible file write: the image is encoded in memory,
/// written to a sibling temporary file and renamed into place, so a failure never
/// leaves a partial artifact behind.
#[derive(Clone, Debug, Default)]
pub struct Normalizer;

impl Normalizer {
    /// Create a normalizer
    pub fn new() -> Self {
        Self
    }

    /// Normalize `raw` and store it at `path`
    ///
    /// Decoding and encoding run on the blocking thread pool.
    pub async fn normalize(
        &self,
        raw: Vec<u8>,
        path: &Path,
    ) -> Result<StoredArtifact, NormalizeError> {
        let encoded = tokio::task::spawn_blocking(move || normalize_bytes(&raw))
            .await
            .map_err(|e| NormalizeError::Join(e.to_string()))??;

        write_atomic(path, &encoded).await?;

        tracing::debug!(path = %path.display(), bytes = encoded.len(), "artifact written");

        Ok(StoredArtifact {
            path: path.to_path_buf(),
            byte_size: encoded.len() as u64,
            format: ArtifactFormat::Png,
        })
    }
}

/// Write `data` to `path` via a temporary sibling and a rename
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), NormalizeError> {
    let io_err = |source: std::io::Error| NormalizeError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = tokio::fs::write(&tmp, data).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(io_err(e));
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
