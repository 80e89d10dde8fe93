// ABOUTME: Candidate image URL extraction from page markup.
// ABOUTME: Collects img/srcset/meta/inline-style references, resolves them against the base URL, and dedups.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

/// Plain source attributes checked on every `<img>` element: the primary
/// src plus conventional lazy-load fallbacks.
const IMG_SOURCE_ATTRS: &[&str] = &["src", "data-src", "data-original", "data-lazy", "data-original-src"];

/// Responsive source-list attributes (primary and lazy-load variant).
const SRCSET_ATTRS: &[&str] = &["srcset", "data-srcset"];

/// Social-preview meta properties whose content attribute names an image.
const META_IMAGE_PROPS: &[&str] = &["og:image", "twitter:image", "twitter:image:src"];

/// Extensions that are obviously images. Used for classification only;
/// candidates without a matching extension are still kept, because many
/// CDN image endpoints have no extension at all.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp", ".svg", ".tiff", ".tif", ".avif",
];

/// Inline-style background reference, e.g. `url('/img/bg.png')`.
static CSS_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)url\(([^)]+)\)").expect("valid css url regex"));

/// Resolve a possibly-relative reference against the page's base URL.
///
/// Handles absolute, scheme-relative, path-relative, and query/fragment-only
/// forms. Returns None for references the url crate cannot make sense of;
/// the caller simply drops those.
pub fn resolve(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    base.join(reference).ok().map(|u| u.to_string())
}

/// Extract every candidate image reference from the markup, resolved
/// against `base`, in discovery order and with duplicates intact.
///
/// The four collection rules are independent and additive; a resource
/// found by more than one rule is collapsed later by [`dedup_candidates`].
pub fn extract_candidates(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut found = Vec::new();

    // Rule 1 + 2: <img> sources, lazy-load fallbacks, and srcset lists.
    if let Ok(img_sel) = Selector::parse("img") {
        for img in doc.select(&img_sel) {
            for attr in IMG_SOURCE_ATTRS {
                if let Some(val) = img.value().attr(attr) {
                    if let Some(resolved) = resolve(base, val) {
                        found.push(resolved);
                    }
                }
            }
            for attr in SRCSET_ATTRS {
                if let Some(srcset) = img.value().attr(attr) {
                    collect_srcset(srcset, base, &mut found);
                }
            }
        }
    }

    // Rule 2 continued: <source srcset> inside <picture>/<video> elements.
    if let Ok(source_sel) = Selector::parse("source") {
        for source in doc.select(&source_sel) {
            for attr in SRCSET_ATTRS {
                if let Some(srcset) = source.value().attr(attr) {
                    collect_srcset(srcset, base, &mut found);
                }
            }
        }
    }

    // Rule 3: social-preview metadata.
    for prop in META_IMAGE_PROPS {
        let selectors = [
            format!("meta[property='{}']", prop),
            format!("meta[name='{}']", prop),
        ];
        for sel_str in &selectors {
            let sel = match Selector::parse(sel_str) {
                Ok(s) => s,
                Err(_) => continue,
            };
            for el in doc.select(&sel) {
                if let Some(content) = el.value().attr("content") {
                    if let Some(resolved) = resolve(base, content) {
                        found.push(resolved);
                    }
                }
            }
        }
    }

    // Rule 4: inline-style url(...) references over the raw markup, not
    // just parsed elements. Embedded data URIs are never fetchable.
    for cap in CSS_URL_RE.captures_iter(html) {
        let raw = cap[1].trim().trim_matches(|c| c == '\'' || c == '"');
        if raw.is_empty() || raw.to_lowercase().starts_with("data:") {
            continue;
        }
        if let Some(resolved) = resolve(base, raw) {
            found.push(resolved);
        }
    }

    found
}

/// Split a srcset value on commas and take the URL token preceding any
/// whitespace-separated descriptor.
fn collect_srcset(srcset: &str, base: &Url, out: &mut Vec<String>) {
    for part in srcset.split(',') {
        let url_part = part.trim().split(' ').next().unwrap_or("").trim();
        if url_part.is_empty() {
            continue;
        }
        if let Some(resolved) = resolve(base, url_part) {
            out.push(resolved);
        }
    }
}

/// Collapse resolved URLs into an order-preserving unique sequence.
///
/// Each URL is also classified against the image extension allow-list,
/// but an unmatched or missing extension never excludes a candidate.
pub fn dedup_candidates(urls: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for url in urls {
        if !seen.insert(url.clone()) {
            continue;
        }
        if !has_image_extension(&url) {
            debug!(url = %url, "candidate has no recognized image extension, keeping anyway");
        }
        out.push(url);
    }
    out
}

/// True if the URL path ends with a known image extension.
pub fn has_image_extension(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(u) => u.path().to_lowercase(),
        Err(_) => return false,
    };
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://site.test/page").unwrap()
    }

    #[test]
    fn resolve_parent_relative() {
        let base = Url::parse("https://a.com/x/y").unwrap();
        assert_eq!(
            resolve(&base, "../z.png"),
            Some("https://a.com/z.png".to_string())
        );
    }

    #[test]
    fn resolve_scheme_relative_inherits_scheme() {
        let base = Url::parse("https://a.com/x/y").unwrap();
        assert_eq!(
            resolve(&base, "//cdn.com/i.jpg"),
            Some("https://cdn.com/i.jpg".to_string())
        );
    }

    #[test]
    fn resolve_absolute_passthrough() {
        assert_eq!(
            resolve(&base(), "https://other.test/a.png"),
            Some("https://other.test/a.png".to_string())
        );
    }

    #[test]
    fn resolve_empty_is_none() {
        assert_eq!(resolve(&base(), ""), None);
        assert_eq!(resolve(&base(), "   "), None);
    }

    #[test]
    fn extracts_img_src_and_lazy_attrs() {
        let html = r#"<img src="/a.png" data-src="/b.png" data-original="c.png">"#;
        let got = extract_candidates(html, &base());
        assert_eq!(
            got,
            vec![
                "https://site.test/a.png".to_string(),
                "https://site.test/b.png".to_string(),
                "https://site.test/c.png".to_string(),
            ]
        );
    }

    #[test]
    fn extracts_srcset_url_tokens() {
        let html = r#"<img srcset="/small.jpg 480w, /big.jpg 1024w">"#;
        let got = extract_candidates(html, &base());
        assert_eq!(
            got,
            vec![
                "https://site.test/small.jpg".to_string(),
                "https://site.test/big.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn extracts_source_element_srcset() {
        let html = r#"<picture><source srcset="/hero.webp 2x"><img src="/hero.jpg"></picture>"#;
        let got = extract_candidates(html, &base());
        assert!(got.contains(&"https://site.test/hero.jpg".to_string()));
        assert!(got.contains(&"https://site.test/hero.webp".to_string()));
    }

    #[test]
    fn extracts_meta_preview_images() {
        let html = r#"
            <meta property="og:image" content="/og.png">
            <meta name="twitter:image" content="https://cdn.test/tw.png">
        "#;
        let got = extract_candidates(html, &base());
        assert_eq!(
            got,
            vec![
                "https://site.test/og.png".to_string(),
                "https://cdn.test/tw.png".to_string(),
            ]
        );
    }

    #[test]
    fn extracts_inline_style_urls_and_skips_data_uris() {
        let html = r#"
            <div style="background-image: url('/bg.png')"></div>
            <div style="background: url(&quot;https://cdn.test/x.jpg&quot;)"></div>
            <div style="background: url(data:image/gif;base64,R0lGOD)"></div>
        "#;
        let got = extract_candidates(html, &base());
        assert!(got.contains(&"https://site.test/bg.png".to_string()));
        assert!(!got.iter().any(|u| u.starts_with("data:")));
    }

    #[test]
    fn extraction_is_idempotent() {
        let html = r#"<img src="/a.png"><img srcset="/b.png 1x, /c.png 2x">
            <meta property="og:image" content="/d.png">"#;
        let first = dedup_candidates(extract_candidates(html, &base()));
        let second = dedup_candidates(extract_candidates(html, &base()));
        assert_eq!(first, second);
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let urls = vec![
            "https://a.com/1.png".to_string(),
            "https://a.com/2.png".to_string(),
            "https://a.com/1.png".to_string(),
            "https://a.com/3.png".to_string(),
            "https://a.com/2.png".to_string(),
        ];
        let raw_len = urls.len();
        let deduped = dedup_candidates(urls);
        assert_eq!(
            deduped,
            vec![
                "https://a.com/1.png".to_string(),
                "https://a.com/2.png".to_string(),
                "https://a.com/3.png".to_string(),
            ]
        );
        assert!(deduped.len() <= raw_len);
    }

    #[test]
    fn dedup_never_drops_extensionless_urls() {
        let urls = vec![
            "https://cdn.test/resize?id=42".to_string(),
            "https://a.com/pic.png".to_string(),
        ];
        let deduped = dedup_candidates(urls.clone());
        assert_eq!(deduped, urls);
    }

    #[test]
    fn image_extension_check() {
        assert!(has_image_extension("https://a.com/p.PNG"));
        assert!(has_image_extension("https://a.com/p.jpeg?v=2"));
        assert!(!has_image_extension("https://a.com/page.html"));
        assert!(!has_image_extension("https://a.com/resize?id=42"));
    }

    #[test]
    fn end_to_end_discovery_order() {
        // One img src, one responsive list with two tokens, one metadata
        // image: exactly 4 distinct absolute URLs in discovery order.
        let html = r#"
            <img src="/a.png" srcset="/s1.png 1x, /s2.png 2x">
            <meta property="og:image" content="/meta.png">
        "#;
        let candidates = dedup_candidates(extract_candidates(html, &base()));
        assert_eq!(
            candidates,
            vec![
                "https://site.test/a.png".to_string(),
                "https://site.test/s1.png".to_string(),
                "https://site.test/s2.png".to_string(),
                "https://site.test/meta.png".to_string(),
            ]
        );
    }
}
