// ABOUTME: Content classification, domain matching, and deterministic image file naming.
// ABOUTME: Decides whether a response is plausibly an image and which extension and filename it gets.

use sha1::{Digest, Sha1};
use url::Url;

/// Mapping from declared image MIME types to conventional file suffixes.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/jpg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/svg+xml", ".svg"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("image/avif", ".avif"),
    ("image/x-icon", ".ico"),
];

/// Fallback suffix when neither the URL nor the Content-Type says anything.
const DEFAULT_EXTENSION: &str = ".jpg";

/// True iff the Content-Type header's primary type is `image`.
pub fn looks_like_image(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.trim().to_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

/// Pick a file extension for a fetched resource.
///
/// Precedence: the URL path's own suffix, then the declared MIME type,
/// then a fixed default. The URL wins over the server because many CDNs
/// omit or misreport Content-Type while the URL path is reliable.
pub fn infer_extension(content_type: Option<&str>, url: &str) -> String {
    if let Some(ext) = url_path_extension(url) {
        return ext;
    }

    if let Some(ct) = content_type {
        let mime = ct.split(';').next().unwrap_or("").trim().to_lowercase();
        for (known, ext) in MIME_EXTENSIONS {
            if mime == *known {
                return (*ext).to_string();
            }
        }
    }

    DEFAULT_EXTENSION.to_string()
}

/// Lowercased extension of the URL's path, dot included, if any.
fn url_path_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let file = path.rsplit('/').next()?;
    let dot = file.rfind('.')?;
    let ext = &file[dot..];
    if ext.len() < 2 {
        return None;
    }
    Some(ext.to_lowercase())
}

/// True iff the candidate's host equals the base's host or is a strict
/// subdomain of it. Pure; no network access.
pub fn same_domain(base: &Url, candidate: &Url) -> bool {
    let (Some(b), Some(t)) = (base.host_str(), candidate.host_str()) else {
        return false;
    };
    b == t || t.ends_with(&format!(".{}", b))
}

/// Deterministic filename for a saved image: a 4-digit zero-padded
/// sequence index plus the first 12 hex chars of the SHA-1 of the source
/// URL, e.g. `0003_2ef7bde608ce.png`.
pub fn image_file_name(url: &str, index: usize, ext: &str) -> String {
    let digest = Sha1::digest(url.as_bytes());
    let hash12 = &hex::encode(digest)[..12];
    format!("{:04}_{}{}", index, hash12, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_content_types() {
        assert!(looks_like_image(Some("image/png")));
        assert!(looks_like_image(Some("image/jpeg; charset=binary")));
        assert!(!looks_like_image(Some("text/html")));
        assert!(!looks_like_image(None));
    }

    #[test]
    fn url_extension_beats_content_type() {
        assert_eq!(
            infer_extension(Some("image/jpeg"), "https://a.com/pic.png"),
            ".png"
        );
    }

    #[test]
    fn content_type_used_when_url_has_no_suffix() {
        assert_eq!(
            infer_extension(Some("image/webp"), "https://cdn.com/resize?id=9"),
            ".webp"
        );
    }

    #[test]
    fn default_extension_when_nothing_known() {
        assert_eq!(infer_extension(None, "https://cdn.com/resize"), ".jpg");
        assert_eq!(
            infer_extension(Some("application/octet-stream"), "https://cdn.com/x"),
            ".jpg"
        );
    }

    #[test]
    fn extension_is_lowercased_and_query_ignored() {
        assert_eq!(
            infer_extension(None, "https://a.com/PHOTO.JPG?w=300"),
            ".jpg"
        );
    }

    #[test]
    fn same_domain_accepts_exact_and_subdomain() {
        let base = Url::parse("https://a.com").unwrap();
        assert!(same_domain(&base, &Url::parse("https://a.com/p.png").unwrap()));
        assert!(same_domain(
            &base,
            &Url::parse("https://img.a.com/p.png").unwrap()
        ));
    }

    #[test]
    fn same_domain_rejects_foreign_hosts() {
        let base = Url::parse("https://a.com").unwrap();
        assert!(!same_domain(&base, &Url::parse("https://b.com/p.png").unwrap()));
        // Suffix match without the dot boundary must not count.
        assert!(!same_domain(
            &base,
            &Url::parse("https://notaa.com/p.png").unwrap()
        ));
    }

    #[test]
    fn naming_is_deterministic() {
        let a = image_file_name("https://a.com/p.png", 3, ".png");
        let b = image_file_name("https://a.com/p.png", 3, ".png");
        assert_eq!(a, b);
        assert!(a.starts_with("0003_"));
        assert!(a.ends_with(".png"));
        assert_eq!(a.len(), "0003_".len() + 12 + ".png".len());
    }

    #[test]
    fn naming_differs_with_sequence_index() {
        let a = image_file_name("https://a.com/p.png", 1, ".png");
        let b = image_file_name("https://a.com/p.png", 2, ".png");
        assert_ne!(a, b);
    }

    #[test]
    fn naming_differs_between_urls() {
        let a = image_file_name("https://a.com/p.png", 1, ".png");
        let b = image_file_name("https://a.com/q.png", 1, ".png");
        assert_ne!(a, b);
    }
}
