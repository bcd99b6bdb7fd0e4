use crate::models::analysis::CityComparison;

/// Reference specific yields (kWh per kW per year).
pub const REFERENCE_CITIES: [(&str, u32); 3] = [
    ("Jodhpur", 1650),
    ("Ahmedabad", 1550),
    ("Bangalore", 1450),
];

/// Annual generation per installed kW, truncated; zero for a zero-size system.
pub fn user_yield(annual_kwh: f64, capacity_kw: f64) -> i64 {
    if capacity_kw > 0.0 {
        (annual_kwh / capacity_kw) as i64
    } else {
        0
    }
}

pub fn compare_with_cities(user_yield: i64) -> Vec<CityComparison> {
    REFERENCE_CITIES
        .iter()
        .map(|&(city, reference_yield)| CityComparison {
            city: city.to_string(),
            reference_yield,
            user: user_yield,
        })
        .collect()
}
