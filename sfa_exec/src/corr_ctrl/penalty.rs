//! Penalty curve for correction control
//!
//! Maps the distance between the drone and the safe path into the magnitude
//! of the corrective command. Inside the free range the penalty is zero, a
//! dead zone where the pilot flies uncorrected. Beyond it the penalty grows
//! as a shifted cubic with a constant offset, gentle through the warning
//! zone and steep once outside it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the magnitude of the corrective command for a given distance
/// from the path.
///
/// Zero for distances strictly inside the free range, otherwise
/// `(dist - shift)^3 / divisor + offset`.
pub fn correction_mag(dist_m: f64, params: &Params) -> f64 {
    if dist_m < params.free_range_m {
        0.0
    } else {
        (dist_m - params.penalty_shift_m).powi(3) / params.penalty_divisor + params.penalty_offset
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_dead_zone() {
        let params = Params::default();

        assert_eq!(correction_mag(0.0, &params), 0.0);
        assert_eq!(correction_mag(0.5, &params), 0.0);
        assert_eq!(correction_mag(0.999, &params), 0.0);
    }

    #[test]
    fn test_known_values() {
        let params = Params::default();

        // The boundary is outside the dead zone: (1 - 2)^3 / 10 + 0.5
        assert!((correction_mag(params.free_range_m, &params) - 0.4).abs() < TOL);

        // At the warning range boundary the cubic term vanishes
        assert!((correction_mag(2.0, &params) - 0.5).abs() < TOL);

        // Well outside: (5 - 2)^3 / 10 + 0.5
        assert!((correction_mag(5.0, &params) - 3.2).abs() < TOL);
    }

    #[test]
    fn test_monotonic_outside_free_range() {
        let params = Params::default();

        let mut prev = correction_mag(1.0 + 1e-6, &params);
        let mut d = 1.1;
        while d < 20.0 {
            let mag = correction_mag(d, &params);
            assert!(mag >= prev);
            prev = mag;
            d += 0.1;
        }
    }
}
