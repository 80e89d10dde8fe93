// ABOUTME: Result types for a scrape run: SavedImage, SkipReason, and ScrapeReport.
// ABOUTME: All types serialize to JSON for the CLI's --json output.

use serde::Serialize;

/// One image written to the output directory.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SavedImage {
    pub filename: String,
    pub source_url: String,
    /// 1-based count of images saved so far, not the candidate's position
    /// in the candidate list.
    pub sequence_index: usize,
}

/// Why a candidate was passed over without being saved.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Same-domain restriction enabled and the host did not match.
    DomainMismatch,
    /// The server answered with an error status.
    HttpStatus(u16),
    /// The request itself failed (connect, timeout, bad scheme).
    Network,
    /// Neither the Content-Type nor the URL suffix looks like an image.
    NotAnImage,
    /// Decoded dimensions fell below the configured minimums.
    TooSmall,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DomainMismatch => write!(f, "domain mismatch"),
            SkipReason::HttpStatus(code) => write!(f, "HTTP status {}", code),
            SkipReason::Network => write!(f, "network error"),
            SkipReason::NotAnImage => write!(f, "not an image"),
            SkipReason::TooSmall => write!(f, "below minimum dimensions"),
        }
    }
}

/// A candidate that was not saved, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedCandidate {
    pub url: String,
    pub reason: SkipReason,
}

/// Summary of one scrape run. Partial results (cap reached, cancelled)
/// are valid output, not an error.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ScrapeReport {
    pub page_url: String,
    /// Number of unique candidates discovered on the page.
    pub candidates: usize,
    pub saved: Vec<SavedImage>,
    pub skipped: Vec<SkippedCandidate>,
    /// True when an external interrupt stopped iteration early.
    pub cancelled: bool,
}

impl ScrapeReport {
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}
