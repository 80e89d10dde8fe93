// ABOUTME: Optional pixel-dimension probing for downloaded image bytes.
// ABOUTME: DimensionProbe is an injectable capability; decode failures always fail open.

use image::GenericImageView;
use tracing::debug;

/// A capability that may be able to read pixel dimensions from an
/// in-memory image. Implementations must never fail hard: when the bytes
/// cannot be decoded the answer is simply "unknown".
pub trait DimensionProbe: Send + Sync {
    fn dimensions(&self, bytes: &[u8]) -> Option<(u32, u32)>;
}

/// Probe backed by the `image` crate's generic raster decoder.
#[derive(Debug, Default)]
pub struct RasterProbe;

impl DimensionProbe for RasterProbe {
    fn dimensions(&self, bytes: &[u8]) -> Option<(u32, u32)> {
        match image::load_from_memory(bytes) {
            Ok(img) => Some(img.dimensions()),
            Err(e) => {
                // Vector and unusual formats are valid images this decoder
                // cannot read; the caller treats None as "do not reject".
                debug!(error = %e, "image bytes not decodable, skipping size check");
                None
            }
        }
    }
}

/// Absent decoding capability: every input is "unknown".
#[derive(Debug, Default)]
pub struct NoProbe;

impl DimensionProbe for NoProbe {
    fn dimensions(&self, _bytes: &[u8]) -> Option<(u32, u32)> {
        None
    }
}

/// Decide whether a body should be rejected for being under the
/// configured minimum dimensions. Inactive thresholds (0) never reject;
/// undecodable bytes never reject.
pub fn below_minimum(
    probe: &dyn DimensionProbe,
    bytes: &[u8],
    min_width: u32,
    min_height: u32,
) -> bool {
    if min_width == 0 && min_height == 0 {
        return false;
    }
    match probe.dimensions(bytes) {
        Some((w, h)) => (min_width > 0 && w < min_width) || (min_height > 0 && h < min_height),
        None => false,
    }
}
