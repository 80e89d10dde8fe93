// ABOUTME: Main library entry point for the imgrab single-page image scraper.
// ABOUTME: Re-exports the public API: Scraper, ScraperBuilder, ScrapeOptions, ScrapeReport, ScrapeError.

//! imgrab - download the images referenced by a single web page.
//!
//! The pipeline fetches one page, extracts candidate image references
//! (img/lazy-load attributes, srcset lists, social-preview metadata,
//! inline-style backgrounds), resolves and deduplicates them against the
//! page URL, then downloads a bounded subset with domain, size, and
//! politeness constraints.
//!
//! # Example
//!
//! ```no_run
//! use imgrab::{Scraper, ScrapeError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ScrapeError> {
//!     let scraper = Scraper::builder().out_dir("./images").max_images(50).build();
//!     let report = scraper.scrape("https://example.com/post").await?;
//!     println!("saved {} image(s)", report.saved_count());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod dimensions;
pub mod error;
pub mod extract;
pub mod options;
pub mod resource;
pub mod result;
pub mod robots;
pub mod scrape;

pub use crate::classify::{image_file_name, infer_extension, looks_like_image, same_domain};
pub use crate::dimensions::{DimensionProbe, NoProbe, RasterProbe};
pub use crate::error::{ErrorCode, ScrapeError};
pub use crate::extract::{dedup_candidates, extract_candidates, resolve};
pub use crate::options::{ScrapeOptions, ScraperBuilder, DEFAULT_USER_AGENT};
pub use crate::result::{SavedImage, ScrapeReport, SkipReason, SkippedCandidate};
pub use crate::scrape::Scraper;
