// ABOUTME: Configuration options for the imgrab scraper including ScrapeOptions and ScraperBuilder.
// ABOUTME: ScraperBuilder provides a fluent API for constructing Scraper instances with custom settings.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::scrape::Scraper;

/// Default user agent sent with every request, page and image alike.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; imgrab/0.1; +https://example.com/bot)";

/// Configuration options for the scraper.
///
/// Immutable once the Scraper is built; there is no process-global state.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Directory the saved images are written to (created if absent).
    pub out_dir: PathBuf,
    /// Hard ceiling on the number of images saved per run.
    pub max_images: usize,
    /// Politeness delay observed after each fetch attempt.
    pub delay: Duration,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Only download images hosted on the page's host or a subdomain of it.
    pub same_domain: bool,
    /// Minimum accepted pixel width; 0 disables the check.
    pub min_width: u32,
    /// Minimum accepted pixel height; 0 disables the check.
    pub min_height: u32,
    /// Skip the robots.txt check entirely.
    pub skip_robots: bool,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    pub http_client: Option<reqwest::Client>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("images"),
            max_images: 500,
            delay: Duration::from_millis(300),
            timeout: Duration::from_secs(20),
            same_domain: false,
            min_width: 0,
            min_height: 0,
            skip_robots: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            http_client: None,
        }
    }
}

/// Builder for constructing Scraper instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct ScraperBuilder {
    opts: ScrapeOptions,
}

impl ScraperBuilder {
    /// Create a new ScraperBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output directory.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.opts.out_dir = dir.into();
        self
    }

    /// Set the maximum number of images to save.
    pub fn max_images(mut self, max: usize) -> Self {
        self.opts.max_images = max;
        self
    }

    /// Set the inter-request politeness delay.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.opts.delay = delay;
        self
    }

    /// Set the per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Restrict downloads to the page's own host and its subdomains.
    pub fn same_domain(mut self, restrict: bool) -> Self {
        self.opts.same_domain = restrict;
        self
    }

    /// Reject images narrower than this many pixels (0 disables).
    pub fn min_width(mut self, px: u32) -> Self {
        self.opts.min_width = px;
        self
    }

    /// Reject images shorter than this many pixels (0 disables).
    pub fn min_height(mut self, px: u32) -> Self {
        self.opts.min_height = px;
        self
    }

    /// Bypass the robots.txt check.
    pub fn skip_robots(mut self, skip: bool) -> Self {
        self.opts.skip_robots = skip;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Use a custom HTTP client instead of building one from the options.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Scraper with the configured options.
    pub fn build(self) -> Scraper {
        Scraper::new(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = ScrapeOptions::default();
        assert_eq!(opts.max_images, 500);
        assert_eq!(opts.delay, Duration::from_millis(300));
        assert_eq!(opts.timeout, Duration::from_secs(20));
        assert!(!opts.same_domain);
        assert_eq!(opts.min_width, 0);
        assert_eq!(opts.min_height, 0);
        assert!(!opts.skip_robots);
    }

    #[test]
    fn builder_overrides_fields() {
        let scraper = ScraperBuilder::new()
            .max_images(3)
            .delay(Duration::ZERO)
            .same_domain(true)
            .min_width(100)
            .user_agent("test-agent")
            .build();
        let opts = scraper.options();
        assert_eq!(opts.max_images, 3);
        assert_eq!(opts.delay, Duration::ZERO);
        assert!(opts.same_domain);
        assert_eq!(opts.min_width, 100);
        assert_eq!(opts.user_agent, "test-agent");
    }
}
