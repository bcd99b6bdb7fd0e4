use crate::models::analysis::{Suitability, SuitabilityTag};

/// Flux (kWh/m²/day) that maps to a score of 100.
pub const REFERENCE_FLUX: f64 = 6.5;
pub const MIN_SCORE: f64 = 40.0;
pub const MAX_SCORE: f64 = 98.0;

/// Irradiance-only suitability of a site.
pub fn suitability(flux: f64) -> Suitability {
    let raw = if flux.is_finite() { flux / REFERENCE_FLUX * 100.0 } else { 0.0 };
    let score = raw.clamp(MIN_SCORE, MAX_SCORE).round() as u8;

    let tag = if score > 85 {
        SuitabilityTag::Excellent
    } else if score > 70 {
        SuitabilityTag::Great
    } else {
        SuitabilityTag::Good
    };

    Suitability { score, tag }
}
