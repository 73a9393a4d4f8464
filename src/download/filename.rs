//! Filename helpers for saved assets.

use std::path::{Component, Path, PathBuf};

/// Extension used when the asset host sends no usable Content-Type.
pub(crate) const DEFAULT_EXTENSION: &str = "jpg";

/// Guess file extension (without dot) from a Content-Type header.
pub(crate) fn extension_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        "image/svg+xml" => "svg",
        "image/tiff" => "tiff",
        _ => DEFAULT_EXTENSION,
    }
}

/// Reduces an arbitrary string to a filesystem-safe filename component.
pub(crate) fn sanitize_filename_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            c if c.is_ascii_alphanumeric() || c == '-' => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches('_').to_string()
}

/// Builds `<provider>-<id>.<ext>` for a downloaded asset.
pub(crate) fn asset_filename(provider_label: &str, id: &str, extension: &str) -> String {
    let label = sanitize_filename_component(provider_label);
    let label = if label.is_empty() { "image" } else { &label };
    let id = sanitize_filename_component(id);
    let id = if id.is_empty() { "asset" } else { &id };
    format!("{label}-{id}.{extension}")
}

/// Resolves a unique path in `dir`: `name.jpg`, then `name_2.jpg`, `name_3.jpg`, ...
///
/// `filename` must already be a single safe segment; anything else is
/// replaced by `download.jpg`.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = if is_safe_filename_segment(filename) {
        filename.to_string()
    } else {
        format!("download.{DEFAULT_EXTENSION}")
    };
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename.as_str(), ""),
    };

    for i in 2..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}
