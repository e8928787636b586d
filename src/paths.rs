//! Output path generation
//!
//! All functions here are pure so that output naming is reproducible: the same base
//! path and count always produce the same slot paths.

use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Default maximum slug length for filenames
pub const DEFAULT_SLUG_LEN: usize = 40;

/// Filename suffix for ordinary artifacts
pub const DEFAULT_SUFFIX: &str = ".png";

/// Filename suffix for logo artifacts
pub const LOGO_SUFFIX: &str = "-logo.png";

#[allow(clippy::expect_used)]
static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug pattern is valid"));

#[allow(clippy::expect_used)]
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_]+").expect("separator pattern is valid"));

/// Convert text to a filename-safe slug of at most `max_len` characters
///
/// # Examples
///
/// ```
/// use image_acquire::paths::slugify;
///
/// assert_eq!(slugify("Golden Gate Bridge!", 40), "golden-gate-bridge");
/// assert_eq!(slugify("a b c d", 3), "a-b");
/// ```
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let lower = text.to_lowercase();
    let cleaned = NON_SLUG_CHARS.replace_all(&lower, "");
    let dashed = SEPARATORS.replace_all(&cleaned, "-");
    let trimmed = dashed.trim_matches('-');
    let truncated: String = trimmed.chars().take(max_len).collect();
    truncated.trim_end_matches('-').to_string()
}

/// Build `{dir}/{YYYY-MM-DD}-{slug}{suffix}` for `query`
///
/// The date is supplied by the caller so the result is deterministic.
#[must_use]
pub fn auto_filename(query: &str, dir: &Path, date: NaiveDate, suffix: &str) -> PathBuf {
    let slug = slugify(query, DEFAULT_SLUG_LEN);
    dir.join(format!("{}-{}{}", date.format("%Y-%m-%d"), slug, suffix))
}

/// Output path for slot `index` (0-based) of a `count`-image request
///
/// With `count == 1` the base path is returned unchanged. Otherwise a 1-based
/// `_N` ordinal is inserted before the extension.
///
/// # Examples
///
/// ```
/// use image_acquire::paths::slot_path;
/// use std::path::{Path, PathBuf};
///
/// let base = Path::new("images/2024-01-01-cat.png");
/// assert_eq!(slot_path(base, 0, 1), PathBuf::from("images/2024-01-01-cat.png"));
/// assert_eq!(slot_path(base, 2, 3), PathBuf::from("images/2024-01-01-cat_3.png"));
/// ```
#[must_use]
pub fn slot_path(base: &Path, index: usize, count: usize) -> PathBuf {
    if count <= 1 {
        return base.to_path_buf();
    }

    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, index + 1, ext.to_string_lossy()),
        None => format!("{}_{}", stem, index + 1),
    };
    base.with_file_name(name)
}
