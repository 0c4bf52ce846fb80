//! Fixed-point transport units to engineering units.
//!
//! Every producer on the bus transmits scaled signed integers; the scale is
//! fixed per tag. These helpers are pure and branch-free so they can run on
//! every frame without cycle-count concerns.

/// ISA sea-level reference pressure, hPa.
pub const SEA_LEVEL_HPA: f32 = 1013.25;

/// ISA altitude scale height numerator, metres.
const ISA_SCALE_M: f32 = 44330.0;

/// ISA barometric exponent, 1 / 5.255.
const ISA_EXPONENT: f32 = 1.0 / 5.255;

/// Pressure producer transmits hundredths of hPa (pascal); scale to hPa.
pub fn pressure_hpa(raw: i32) -> f32 {
    raw as f32 / 100.0
}

/// The temperature producer already transmits whole degrees Celsius.
pub fn temperature_c(raw: i32) -> f32 {
    raw as f32
}

/// Milli-g to g.
pub fn accel_g(raw: i32) -> f32 {
    raw as f32 / 1000.0
}

/// Angular rate is kept in milli-rps; the estimator prefers the raw scale.
pub fn gyro_mrps(raw: i32) -> f32 {
    raw as f32
}

/// Millimetres to metres (horizontal dilution of precision).
pub fn hdop_m(raw: i32) -> f32 {
    raw as f32 / 1000.0
}

/// Micro-degrees to degrees.
pub fn coordinate_deg(raw: i32) -> f32 {
    raw as f32 / 1e6
}

/// Centimetres to whole metres. GNSS altitude stays integral downstream.
pub fn gnss_altitude_m(raw: i32) -> i32 {
    raw / 100
}

/// Millimetres (or mm/s) to metres (or m/s); used for the filtered
/// altitude and vertical-velocity estimates.
pub fn estimate_m(raw: i32) -> f32 {
    raw as f32 / 1000.0
}

/// Barometric altitude from static pressure, standard atmosphere.
///
/// `h = 44330 * (1 - (p / p0)^(1/5.255))`
pub fn altitude_from_pressure(pressure_hpa: f32) -> f32 {
    ISA_SCALE_M * (1.0 - libm::powf(pressure_hpa / SEA_LEVEL_HPA, ISA_EXPONENT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_factors_match_table() {
        assert_eq!(pressure_hpa(10_132_500), 101_325.0);
        assert_eq!(pressure_hpa(-250), -2.5);
        assert_eq!(temperature_c(20), 20.0);
        assert_eq!(accel_g(1000), 1.0);
        assert_eq!(accel_g(-2000), -2.0);
        assert_eq!(gyro_mrps(1500), 1500.0);
        assert_eq!(hdop_m(2500), 2.5);
        assert_eq!(coordinate_deg(46_518_000), 46.518);
        assert_eq!(gnss_altitude_m(12_345), 123);
        assert_eq!(gnss_altitude_m(-150), -1);
        assert_eq!(estimate_m(1250), 1.25);
    }

    /// Asserts `got` is within one ULP of the exact product `raw * factor`.
    fn assert_scaled(got: f32, raw: i32, factor: f64) {
        let exact = raw as f64 * factor;
        let err = (got as f64 - exact).abs();
        let bound = (got.abs().max(f32::MIN_POSITIVE) * f32::EPSILON) as f64;
        assert!(err <= bound, "raw={raw} factor={factor} got={got} err={err}");
    }

    #[test]
    fn factors_hold_over_wide_range() {
        // Output must equal raw * factor to within 1 ULP for |raw| <= 2^30.
        for raw in [1, -1, 1 << 10, -(1 << 20), 1 << 30, -(1 << 30)] {
            assert_scaled(accel_g(raw), raw, 1e-3);
            assert_scaled(hdop_m(raw), raw, 1e-3);
            assert_scaled(estimate_m(raw), raw, 1e-3);
            assert_scaled(coordinate_deg(raw), raw, 1e-6);
            assert_scaled(pressure_hpa(raw), raw, 1e-2);
        }
    }

    #[test]
    fn sea_level_pressure_maps_to_zero_altitude() {
        assert!(altitude_from_pressure(SEA_LEVEL_HPA).abs() < 1e-3);
    }

    #[test]
    fn altitude_inverts_isa_pressure() {
        // p(h) = p0 * (1 - h/44330)^5.255, the inverse of the formula under test.
        for target_m in [0.0f32, 500.0, 1500.0, 4000.0] {
            let pressure = SEA_LEVEL_HPA * libm::powf(1.0 - target_m / 44330.0, 5.255);
            let recovered = altitude_from_pressure(pressure);
            assert!(
                (recovered - target_m).abs() < 0.5,
                "h={target_m} recovered={recovered}"
            );
        }
    }

    #[test]
    fn altitude_is_monotonic_in_falling_pressure() {
        assert!(altitude_from_pressure(900.0) > altitude_from_pressure(1000.0));
    }
}
