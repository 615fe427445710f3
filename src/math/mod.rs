//! Numeric utilities: min-max and winsorized scaling, quantiles.

pub mod normalize;

pub use normalize::*;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round_to(12.344, 2), 12.34);
        assert_eq!(round_to(12.346, 2), 12.35);
        assert_eq!(round_to(100.0, 2), 100.0);
    }
}
