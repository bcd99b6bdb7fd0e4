use crate::models::analysis::{ProjectionSeries, SensitivitySeries};
use crate::services::finance::PRICE_PER_UNIT;

pub const PROJECTION_YEARS: usize = 25;
/// Yearly rise of the grid tariff.
pub const GRID_INFLATION: f64 = 0.05;
/// Yearly output loss of the panels.
pub const PANEL_DEGRADATION: f64 = 0.005;
/// System sizes (kW) shown in the sensitivity graph.
pub const SENSITIVITY_SIZES: [u32; 4] = [3, 5, 8, 10];

/// 25-year cumulative cash flow without solar (grid) and with solar.
///
/// The grid track adds the yearly bill avoided by the system, growing with
/// tariff inflation. The solar track starts at minus the installation cost and
/// adds the yearly savings, shrinking with panel degradation. Values are
/// truncated to whole rupees.
pub fn generate_projections(annual_savings: f64, gross_cost: f64) -> ProjectionSeries {
    let mut grid = Vec::with_capacity(PROJECTION_YEARS);
    let mut solar = Vec::with_capacity(PROJECTION_YEARS);

    let mut yearly_bill = annual_savings;
    let mut yearly_savings = annual_savings;
    let mut total_grid = 0.0;
    let mut total_solar = -gross_cost;

    for _ in 0..PROJECTION_YEARS {
        total_grid += yearly_bill;
        grid.push(total_grid as i64);
        yearly_bill *= 1.0 + GRID_INFLATION;

        total_solar += yearly_savings;
        solar.push(total_solar as i64);
        yearly_savings *= 1.0 - PANEL_DEGRADATION;
    }

    ProjectionSeries { grid, solar }
}

/// Annual savings the user's site would give at a few standard system sizes.
pub fn sensitivity(user_yield: i64) -> SensitivitySeries {
    let savings = SENSITIVITY_SIZES
        .iter()
        .map(|&size| (size as f64 * user_yield as f64 * PRICE_PER_UNIT) as i64)
        .collect();

    SensitivitySeries { sizes: SENSITIVITY_SIZES.to_vec(), savings }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_year_values() {
        let series = generate_projections(33_600.0, 135_000.0);
        assert_eq!(series.grid.len(), PROJECTION_YEARS);
        assert_eq!(series.solar.len(), PROJECTION_YEARS);
        assert_eq!(series.grid[0], 33_600);
        assert_eq!(series.solar[0], -101_400);
        // second year: bill grew 5%, savings shrank 0.5%
        assert_eq!(series.grid[1], 33_600 + 35_280);
        assert_eq!(series.solar[1], -101_400 + 33_432);
    }

    #[test]
    fn fractional_values_are_truncated() {
        let series = generate_projections(1000.7, 5000.0);
        assert_eq!(series.grid[0], 1000);
        assert_eq!(series.solar[0], -3999);
    }

    #[test]
    fn both_tracks_grow_every_year() {
        let series = generate_projections(20_000.0, 90_000.0);
        for year in 1..PROJECTION_YEARS {
            assert!(series.grid[year] > series.grid[year - 1]);
            assert!(series.solar[year] > series.solar[year - 1]);
        }
        // solar pays back within the horizon
        assert!(series.solar[PROJECTION_YEARS - 1] > 0);
    }

    #[test]
    fn zero_savings_keeps_tracks_flat() {
        let series = generate_projections(0.0, 45_000.0);
        assert!(series.grid.iter().all(|&v| v == 0));
        assert!(series.solar.iter().all(|&v| v == -45_000));
    }

    #[test]
    fn sensitivity_scales_with_size() {
        let series = sensitivity(1400);
        assert_eq!(series.sizes, vec![3, 5, 8, 10]);
        assert_eq!(series.savings, vec![33_600, 56_000, 89_600, 112_000]);
    }
}
