//! # Geometry primitives
//!
//! Point-to-segment projections in 3D, used by the path nearest-point query,
//! plus small vector helpers shared by the correction control module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Squared segment lengths below this value are treated as degenerate
/// (start and end coincident).
const DEGENERATE_LEN_SQ_M2: f64 = 1e-12;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Project a point onto the segment between `start` and `end`.
///
/// Returns the distance from `point` to the closest point on the segment and
/// the closest point itself. The projection parameter is clamped to [0, 1] so
/// the closest point never lies beyond either endpoint.
///
/// A degenerate segment (start and end coincident) collapses to its start
/// point, which avoids the division by the squared length.
pub fn pnt2seg(
    point: &Vector3<f64>,
    start: &Vector3<f64>,
    end: &Vector3<f64>,
) -> (f64, Vector3<f64>) {
    let seg = end - start;
    let len_sq_m2 = seg.norm_squared();

    if len_sq_m2 < DEGENERATE_LEN_SQ_M2 {
        return ((point - start).norm(), *start);
    }

    // Projection parameter along the segment, clamped so we never extrapolate
    // past the endpoints
    let t = clamp(&((point - start).dot(&seg) / len_sq_m2), &0f64, &1f64);

    let closest = start + seg * t;

    ((point - closest).norm(), closest)
}

/// Rescale a vector to the given magnitude.
///
/// A zero vector is returned unchanged since its direction is undefined, no
/// matter what magnitude is requested.
pub fn set_mag(vec: &Vector3<f64>, mag: f64) -> Vector3<f64> {
    let norm = vec.norm();

    if norm == 0f64 {
        Vector3::zeros()
    } else {
        vec * (mag / norm)
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
    fn test_pnt2seg_perpendicular_foot() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(10.0, 0.0, 0.0);
        let p = Vector3::new(4.0, 3.0, 0.0);

        let (dist, closest) = pnt2seg(&p, &a, &b);

        assert!((dist - 3.0).abs() < TOL);
        assert!((closest - Vector3::new(4.0, 0.0, 0.0)).norm() < TOL);
    }

    #[test]
    fn test_pnt2seg_clamps_to_endpoints() {
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(10.0, 0.0, 0.0);

        // Beyond the start
        let (dist, closest) = pnt2seg(&Vector3::new(-5.0, 0.0, 0.0), &a, &b);
        assert!((dist - 5.0).abs() < TOL);
        assert!((closest - a).norm() < TOL);

        // Beyond the end
        let (dist, closest) = pnt2seg(&Vector3::new(13.0, 4.0, 0.0), &a, &b);
        assert!((dist - 5.0).abs() < TOL);
        assert!((closest - b).norm() < TOL);
    }

    #[test]
    fn test_pnt2seg_never_further_than_endpoints() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(-4.0, 0.0, 7.0);

        let points = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, -2.0, 5.0),
            Vector3::new(-3.0, 8.0, 1.5),
        ];

        for p in points.iter() {
            let (dist, _) = pnt2seg(p, &a, &b);
            assert!(dist <= (p - a).norm() + TOL);
            assert!(dist <= (p - b).norm() + TOL);
        }
    }

    #[test]
    fn test_pnt2seg_degenerate_segment() {
        let a = Vector3::new(2.0, 2.0, 2.0);
        let p = Vector3::new(2.0, 6.0, 2.0);

        let (dist, closest) = pnt2seg(&p, &a, &a);

        assert!((dist - 4.0).abs() < TOL);
        assert!((closest - a).norm() < TOL);
    }

    #[test]
    fn test_set_mag() {
        let v = set_mag(&Vector3::new(0.0, -2.0, 0.0), 3.2);
        assert!((v - Vector3::new(0.0, -3.2, 0.0)).norm() < TOL);

        // Zero vector has no direction so stays zero
        let z = set_mag(&Vector3::zeros(), 5.0);
        assert_eq!(z, Vector3::zeros());
        assert!(z.iter().all(|c| c.is_finite()));
    }
}
