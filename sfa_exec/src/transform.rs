//! # Coordinate transform context
//!
//! The display layer works in pixels while the core works in the local metric
//! frame. The context needed to convert between the two (window size, zoom
//! level and the geodetic centre of the map) is carried as a plain value and
//! passed explicitly into every conversion, rather than shared mutably
//! between components. On zoom or recentre the owner builds a new context and
//! hands it out again.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Context for conversions between the local metric frame and display space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct TransformCtx {
    /// Display width in pixels
    pub width: f64,

    /// Display height in pixels
    pub height: f64,

    /// Zoom level, pixels per centimetre
    pub zoom: f64,

    /// Geodetic coordinates (latitude, longitude) of the display centre
    pub center_latlon: [f64; 2],
}

impl Default for TransformCtx {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            zoom: 0.2,
            center_latlon: [0.0, 0.0],
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TransformCtx {
    /// Convert a position in the local metric frame into display pixels.
    ///
    /// Only the horizontal components are used. The display y axis points
    /// down, so the metric y axis is inverted.
    pub fn metres2pixels(&self, pos_m: &Vector3<f64>) -> Vector2<f64> {
        Vector2::new(
            pos_m[0] * self.zoom * 100.0 + self.width / 2.0,
            -pos_m[1] * self.zoom * 100.0 + self.height / 2.0,
        )
    }

    /// Convert a display pixel position into the local metric frame (x, y).
    pub fn pixels2metres(&self, pos_pix: &Vector2<f64>) -> Vector2<f64> {
        Vector2::new(
            (pos_pix[0] - self.width / 2.0) / (self.zoom * 100.0),
            -(pos_pix[1] - self.height / 2.0) / (self.zoom * 100.0),
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_centre_maps_to_display_centre() {
        let ctx = TransformCtx::default();

        let pix = ctx.metres2pixels(&Vector3::zeros());
        assert_eq!(pix, Vector2::new(ctx.width / 2.0, ctx.height / 2.0));
    }

    #[test]
    fn test_pixels_metres_round_trip() {
        let ctx = TransformCtx {
            width: 1280.0,
            height: 720.0,
            zoom: 0.5,
            center_latlon: [49.226, 16.596],
        };

        let pos_m = Vector3::new(12.5, -3.75, 2.0);
        let pix = ctx.metres2pixels(&pos_m);
        let back = ctx.pixels2metres(&pix);

        assert!((back[0] - pos_m[0]).abs() < 1e-9);
        assert!((back[1] - pos_m[1]).abs() < 1e-9);
    }
}
