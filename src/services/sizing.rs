//! Rule-of-thumb system sizing from the electricity bill and the free roof area.

use crate::services::finance::PRICE_PER_UNIT;
use crate::services::round_to;

/// Average monthly units (kWh) produced by 1 kW of panels.
pub const MONTHLY_UNITS_PER_KW: f64 = 120.0;
/// Roof area (sq ft) taken by 1 kW of panels.
pub const ROOF_AREA_PER_KW: f64 = 100.0;
pub const MIN_CAPACITY_KW: f64 = 1.0;
/// Returned when the bill or the roof area is missing.
pub const DEFAULT_CAPACITY_KW: f64 = 3.0;

/// Recommended capacity (kW) for a monthly bill (INR) and roof area (sq ft).
///
/// The capacity that covers the bill is rounded to one decimal, capped by what
/// fits on the roof and never goes below 1 kW. A zero bill or area yields the
/// 3 kW default.
pub fn estimate_system_size(bill: f64, area: f64) -> f64 {
    if bill <= 0.0 || area <= 0.0 {
        return DEFAULT_CAPACITY_KW;
    }

    let monthly_units = bill / PRICE_PER_UNIT;
    let needed_kw = round_to(monthly_units / MONTHLY_UNITS_PER_KW, 1);
    let max_roof_kw = area / ROOF_AREA_PER_KW;

    needed_kw.min(max_roof_kw).max(MIN_CAPACITY_KW)
}
