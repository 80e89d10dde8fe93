// ABOUTME: The Scraper orchestrator tying the pipeline together.
// ABOUTME: Robots gate, page fetch, extraction, then the rate-limited filtered download loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use crate::classify::{image_file_name, infer_extension, looks_like_image, same_domain};
use crate::dimensions::{below_minimum, DimensionProbe, RasterProbe};
use crate::error::ScrapeError;
use crate::extract::{dedup_candidates, extract_candidates, has_image_extension};
use crate::options::ScrapeOptions;
use crate::resource::{fetch, FetchOptions};
use crate::result::{SavedImage, ScrapeReport, SkipReason, SkippedCandidate};
use crate::robots::robots_allow;

/// The main imgrab scraper.
///
/// Holds the immutable run configuration, one shared HTTP client, and the
/// optional dimension-probing capability. One candidate is fully resolved
/// (fetched, classified, possibly saved) before the next begins; the
/// configured delay is a deliberate politeness pause between attempts.
pub struct Scraper {
    opts: ScrapeOptions,
    http_client: reqwest::Client,
    probe: Box<dyn DimensionProbe>,
    cancel: Arc<AtomicBool>,
}

impl Scraper {
    /// Create a new ScraperBuilder for configuring the scraper.
    pub fn builder() -> crate::options::ScraperBuilder {
        crate::options::ScraperBuilder::new()
    }

    /// Create a new Scraper with the given options.
    pub fn new(opts: ScrapeOptions) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .expect("failed to build HTTP client")
        });

        Self {
            opts,
            http_client,
            probe: Box::new(RasterProbe),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the dimension probe, e.g. with [`crate::dimensions::NoProbe`]
    /// when raster decoding is unwanted.
    pub fn with_probe(mut self, probe: Box<dyn DimensionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// The run configuration.
    pub fn options(&self) -> &ScrapeOptions {
        &self.opts
    }

    /// Flag that stops candidate iteration promptly when set. The partial
    /// report accumulated so far is still returned as success.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Scrape images from the page at `page_url`.
    ///
    /// Fatal errors (bad URL, robots disallow, page fetch failure, zero
    /// candidates) abort the run; per-candidate failures are recorded in
    /// the report and never propagated.
    pub async fn scrape(&self, page_url: &str) -> Result<ScrapeReport, ScrapeError> {
        let base = Url::parse(page_url).map_err(|e| {
            ScrapeError::invalid_url(
                page_url,
                "Scrape",
                Some(anyhow::anyhow!("malformed URL: {}", e)),
            )
        })?;

        if !self.opts.skip_robots
            && !robots_allow(&self.http_client, &base, &self.opts.user_agent).await
        {
            return Err(ScrapeError::robots(page_url, "Scrape"));
        }

        let page_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            tolerate_errors: false,
        };
        let page = fetch(&self.http_client, page_url, &page_opts).await?;
        let html = page.text_utf8();

        // Redirects may have moved us; candidates resolve against where
        // the markup actually came from.
        let base = Url::parse(&page.final_url).unwrap_or(base);

        let candidates = dedup_candidates(extract_candidates(&html, &base));
        if candidates.is_empty() {
            return Err(ScrapeError::extract(
                page_url,
                "Scrape",
                Some(anyhow::anyhow!("no image candidates found on page")),
            ));
        }
        info!(count = candidates.len(), page = %page.final_url, "extracted image candidates");

        self.download_all(&base, candidates).await
    }

    /// Run the download loop over an already-extracted candidate list.
    async fn download_all(
        &self,
        base: &Url,
        candidates: Vec<String>,
    ) -> Result<ScrapeReport, ScrapeError> {
        tokio::fs::create_dir_all(&self.opts.out_dir)
            .await
            .map_err(|e| {
                ScrapeError::io(
                    base.as_str(),
                    "Save",
                    Some(anyhow::anyhow!(
                        "cannot create output directory {:?}: {}",
                        self.opts.out_dir,
                        e
                    )),
                )
            })?;

        let mut report = ScrapeReport {
            page_url: base.to_string(),
            candidates: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            if report.saved.len() >= self.opts.max_images {
                info!(max = self.opts.max_images, "image cap reached, stopping");
                break;
            }
            if self.cancel.load(Ordering::Relaxed) {
                warn!("interrupted, stopping with partial results");
                report.cancelled = true;
                break;
            }

            // Domain-mismatch skips make no network request and therefore
            // observe no politeness delay.
            if self.opts.same_domain {
                let matches = Url::parse(&candidate)
                    .map(|u| same_domain(base, &u))
                    .unwrap_or(false);
                if !matches {
                    debug!(url = %candidate, "skipping off-domain candidate");
                    report.skipped.push(SkippedCandidate {
                        url: candidate,
                        reason: SkipReason::DomainMismatch,
                    });
                    continue;
                }
            }

            if let Some(skip) = self.attempt(&candidate, &mut report).await {
                debug!(url = %candidate, reason = %skip, "candidate skipped");
                report.skipped.push(SkippedCandidate {
                    url: candidate,
                    reason: skip,
                });
            }

            if !self.opts.delay.is_zero() {
                tokio::time::sleep(self.opts.delay).await;
            }
        }

        Ok(report)
    }

    /// Fetch, classify, filter, and possibly save one candidate.
    ///
    /// Returns the skip reason, or None when the image was saved. Nothing
    /// here aborts the run; one candidate's failure never does.
    async fn attempt(
        &self,
        candidate: &str,
        report: &mut ScrapeReport,
    ) -> Option<SkipReason> {
        let image_opts = FetchOptions {
            headers: self.opts.headers.clone(),
            tolerate_errors: true,
        };

        let resource = match fetch(&self.http_client, candidate, &image_opts).await {
            Ok(r) => r,
            Err(e) => {
                warn!(url = %candidate, error = %e, "image fetch failed");
                return Some(SkipReason::Network);
            }
        };
        if resource.status >= 400 {
            return Some(SkipReason::HttpStatus(resource.status));
        }

        let content_type = resource.content_type.as_deref();
        if !looks_like_image(content_type) && !has_image_extension(candidate) {
            return Some(SkipReason::NotAnImage);
        }

        if below_minimum(
            self.probe.as_ref(),
            &resource.body,
            self.opts.min_width,
            self.opts.min_height,
        ) {
            return Some(SkipReason::TooSmall);
        }

        let ext = infer_extension(content_type, candidate);
        let sequence_index = report.saved.len() + 1;
        let filename = image_file_name(candidate, sequence_index, &ext);
        let path = self.opts.out_dir.join(&filename);

        if let Err(e) = tokio::fs::write(&path, &resource.body).await {
            // A failing output directory will fail for every candidate;
            // surface it in the log and move on like any other skip.
            warn!(url = %candidate, path = %path.display(), error = %e, "failed to write image");
            return Some(SkipReason::Network);
        }

        info!(
            index = sequence_index,
            url = %candidate,
            file = %path.display(),
            "saved image"
        );
        report.saved.push(SavedImage {
            filename,
            source_url: candidate.to_string(),
            sequence_index,
        });
        None
    }
}
