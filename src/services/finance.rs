//! Installation cost, subsidy and payback figures.
//!
//! All amounts are INR. Subsidy follows the residential rooftop scheme:
//! 30 000/kW for the first 2 kW, 18 000/kW for the third, capped at 78 000.

use crate::models::analysis::FinancialSummary;
use crate::services::round_to;

/// Installed cost per kW (INR).
pub const COST_PER_KW: f64 = 45_000.0;
/// Grid tariff per unit (INR/kWh).
pub const PRICE_PER_UNIT: f64 = 8.0;
/// Grid emission factor (kg CO2/kWh).
pub const EMISSION_FACTOR: f64 = 0.82;

pub const SUBSIDY_TIER1_RATE: f64 = 30_000.0;
pub const SUBSIDY_TIER2_RATE: f64 = 18_000.0;
pub const SUBSIDY_TIER1_LIMIT_KW: f64 = 2.0;
pub const SUBSIDY_TIER2_LIMIT_KW: f64 = 3.0;
pub const SUBSIDY_CAP: f64 = 78_000.0;

/// Payback years reported when the system saves nothing.
pub const ROI_UNBOUNDED_YEARS: f64 = 99.0;

/// Subsidy for a system of the given capacity. Tier upper bounds are inclusive.
pub fn subsidy_for(capacity_kw: f64) -> f64 {
    let capacity_kw = capacity_kw.max(0.0);
    if capacity_kw <= SUBSIDY_TIER1_LIMIT_KW {
        capacity_kw * SUBSIDY_TIER1_RATE
    } else if capacity_kw <= SUBSIDY_TIER2_LIMIT_KW {
        SUBSIDY_TIER1_LIMIT_KW * SUBSIDY_TIER1_RATE + (capacity_kw - SUBSIDY_TIER1_LIMIT_KW) * SUBSIDY_TIER2_RATE
    } else {
        SUBSIDY_CAP
    }
}

pub fn financial_summary(capacity_kw: f64, annual_kwh: f64) -> FinancialSummary {
    // Rounded to the rupee so float artefacts like 2.3 * 45000 = 103499.99.. don't lose one
    let gross_cost = (capacity_kw * COST_PER_KW).round() as i64;
    let annual_savings = (annual_kwh * PRICE_PER_UNIT).round() as i64;
    let co2_tonnes = round_to(annual_kwh * EMISSION_FACTOR / 1000.0, 1);

    let subsidy = (subsidy_for(capacity_kw).round() as i64).clamp(0, gross_cost.max(0));
    let net_cost = gross_cost - subsidy;

    let roi_years = if annual_savings > 0 {
        round_to(net_cost as f64 / annual_savings as f64, 1)
    } else {
        ROI_UNBOUNDED_YEARS
    };

    FinancialSummary {
        gross_cost,
        subsidy,
        net_cost,
        annual_savings,
        roi_years,
        co2_tonnes,
    }
}
