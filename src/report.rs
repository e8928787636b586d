//! Rendering of acquisition reports for people and documents.

use crate::paths::slugify;
use crate::types::{AcquisitionReport, StoredArtifact};

/// Default width of Typst figures
pub const DEFAULT_FIGURE_WIDTH: &str = "80%";

/// Maximum slug length used for generated captions
const CAPTION_SLUG_LEN: usize = 60;

const MIB: u64 = 1024 * 1024;

/// Human-readable file size: `N KB` below one MiB, `N.N MB` above
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    } else {
        format!("{:.0} KB", bytes as f64 / 1024.0)
    }
}

/// Caption derived from a query: slugified, dashes to spaces, title-cased
///
/// # Examples
///
/// ```
/// use image_acquire::report::caption_from_query;
///
/// assert_eq!(caption_from_query("golden gate bridge!"), "Golden Gate Bridge");
/// ```
#[must_use]
pub fn caption_from_query(query: &str) -> String {
    let words = slugify(query, CAPTION_SLUG_LEN).replace('-', " ");
    title_case(&words)
}

// A letter is capitalized when it does not follow another letter
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// `#figure(...)` markup referencing a stored artifact
#[must_use]
pub fn typst_figure(artifact: &StoredArtifact, width: &str, caption: &str) -> String {
    format!(
        "#figure(\n  image(\"{}\", width: {}),\n  caption: [{}],\n)",
        artifact.path.display(),
        width,
        caption
    )
}

impl AcquisitionReport {
    /// One `Saved: path (size)` line per artifact
    pub fn saved_lines(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .map(|a| format!("Saved: {} ({})", a.path.display(), format_size(a.byte_size)))
            .collect()
    }

    /// One Typst figure per artifact
    ///
    /// Without an explicit caption the caption is derived from the query.
    pub fn typst_figures(&self, width: &str, caption: Option<&str>) -> Vec<String> {
        let caption = caption
            .map(str::to_string)
            .unwrap_or_else(|| caption_from_query(&self.query));
        self.artifacts
            .iter()
            .map(|a| typst_figure(a, width, &caption))
            .collect()
    }

    /// Shortfall note, if fewer artifacts were stored than requested
    pub fn shortfall_line(&self) -> Option<String> {
        let shortfall = self.shortfall();
        (shortfall > 0).then(|| {
            format!(
                "Stored {} of {} requested images ({} missing)",
                self.artifacts.len(),
                self.requested,
                shortfall
            )
        })
    }
}
