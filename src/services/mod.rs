pub mod analysis_service;
pub mod benchmark;
pub mod finance;
pub mod geocoding_service;
pub mod insight_service;
pub mod production_service;
pub mod projection;
pub mod scoring;
pub mod sizing;

/// Rounds to the given number of decimal places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
