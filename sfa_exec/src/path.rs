//! # Path
//!
//! This module defines the safe path the assistant corrects towards: an
//! ordered sequence of waypoints in the local metric frame. Segments are
//! derived pairwise from consecutive waypoints, so a path needs at least two
//! waypoints before any correction can take place.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// Internal
use crate::geom::pnt2seg;
use crate::transform::TransformCtx;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single control point of a [`Path`].
///
/// The metric position is what all calculations use. The geodetic tags and
/// display coordinates are carried for persistence and the display layer.
#[derive(Clone, Debug)]
pub struct Waypoint {
    /// Geodetic latitude in degrees
    pub latitude: f64,

    /// Geodetic longitude in degrees
    pub longitude: f64,

    /// GPS altitude in metres, if known
    pub altitude: Option<f64>,

    /// Position in the local metric frame
    pub position_m: Vector3<f64>,

    /// Position in display pixels
    pub visual: [f64; 2],
}

/// A path defining the safe trajectory of the drone.
#[derive(Clone, Debug, Default)]
pub struct Path {
    waypoints: Vec<Waypoint>,
}

/// Result of a nearest-point query against a path.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct NearestPoint {
    /// The closest point on the path to the query point
    pub point_m: Vector3<f64>,

    /// Distance from the query point to `point_m`
    pub dist_m: f64,

    /// Index of the winning segment (segment i joins waypoints i and i + 1)
    pub seg_index: usize,
}

/// One waypoint as stored in a mission file.
///
/// Each record duplicates the transform context so existing mission files
/// round-trip unchanged; on load the context is reconstructed from the first
/// record. The dotted context keys match the files written by the planning
/// tool, do not rename.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,

    pub metres_x: f64,
    pub metres_y: f64,
    pub metres_z: f64,

    pub visual_x: f64,
    pub visual_y: f64,

    #[serde(rename = "transformer.width")]
    pub width: f64,
    #[serde(rename = "transformer.height")]
    pub height: f64,
    #[serde(rename = "transformer.zoom")]
    pub zoom: f64,
    #[serde(rename = "transformer.center_latlon")]
    pub center_latlon: [f64; 2],
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with loading and saving mission files.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot read the mission file: {0}")]
    FileReadError(std::io::Error),

    #[error("The mission file is malformed: {0}")]
    MalformedFile(serde_json::Error),

    #[error("The mission file contains no waypoints")]
    EmptyMission,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    /// Create a new waypoint at the given metric position.
    ///
    /// The display coordinates are derived from the transform context.
    pub fn new(
        ctx: &TransformCtx,
        latitude: f64,
        longitude: f64,
        position_m: Vector3<f64>,
    ) -> Self {
        let visual = ctx.metres2pixels(&position_m);

        Self {
            latitude,
            longitude,
            altitude: None,
            position_m,
            visual: [visual[0], visual[1]],
        }
    }

    /// Move the waypoint to a new metric position, rederiving the display
    /// coordinates.
    pub fn set_position_m(&mut self, ctx: &TransformCtx, position_m: Vector3<f64>) {
        self.position_m = position_m;

        let visual = ctx.metres2pixels(&position_m);
        self.visual = [visual[0], visual[1]];
    }
}

impl Path {
    /// Create a new empty path
    pub fn new_empty() -> Self {
        Path {
            waypoints: Vec::new(),
        }
    }

    /// Append a waypoint to the end of the path.
    pub fn add_waypoint(&mut self, wp: Waypoint) {
        self.waypoints.push(wp);
    }

    /// Remove the waypoint at the given index, or `None` if out of range.
    pub fn remove_waypoint(&mut self, index: usize) -> Option<Waypoint> {
        if index < self.waypoints.len() {
            Some(self.waypoints.remove(index))
        } else {
            None
        }
    }

    /// Get a mutable reference to the waypoint at the given index.
    pub fn waypoint_mut(&mut self, index: usize) -> Option<&mut Waypoint> {
        self.waypoints.get_mut(index)
    }

    /// Get the waypoints of the path.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Get the number of waypoints in the path
    pub fn num_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// True if the path has at least one segment, i.e. at least two
    /// waypoints. Paths without segments disable correction entirely.
    pub fn has_segments(&self) -> bool {
        self.waypoints.len() >= 2
    }

    /// Get the number of segments in the path.
    pub fn num_segments(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    /// Iterate over the (start, end) position pairs of each segment.
    pub fn segments(&self) -> impl Iterator<Item = (Vector3<f64>, Vector3<f64>)> + '_ {
        self.waypoints
            .windows(2)
            .map(|pair| (pair[0].position_m, pair[1].position_m))
    }

    /// Return the length of the path in metres.
    ///
    /// If the path has no segments then `None` is returned.
    pub fn length_m(&self) -> Option<f64> {
        if !self.has_segments() {
            return None;
        }

        Some(
            self.segments()
                .map(|(start, end)| (end - start).norm())
                .sum(),
        )
    }

    /// Find the point on the path closest to the query point, searching every
    /// segment.
    ///
    /// Ties are broken in favour of the first segment in path order (the
    /// comparison is a strict less-than). Returns `None` if the path has no
    /// segments, which callers must treat as "correction disabled".
    pub fn nearest_point(&self, query_m: &Vector3<f64>) -> Option<NearestPoint> {
        let mut nearest: Option<NearestPoint> = None;

        for (i, (start, end)) in self.segments().enumerate() {
            let (dist_m, point_m) = pnt2seg(query_m, &start, &end);

            let closer = match nearest {
                Some(ref n) => dist_m < n.dist_m,
                None => true,
            };

            if closer {
                nearest = Some(NearestPoint {
                    point_m,
                    dist_m,
                    seg_index: i,
                });
            }
        }

        nearest
    }

    /// Convert the path into flat mission records for persistence.
    ///
    /// The transform context is duplicated onto every record for
    /// compatibility with existing mission files.
    pub fn to_records(&self, ctx: &TransformCtx) -> Vec<WaypointRecord> {
        self.waypoints
            .iter()
            .map(|wp| WaypointRecord {
                latitude: wp.latitude,
                longitude: wp.longitude,
                altitude: wp.altitude,
                metres_x: wp.position_m[0],
                metres_y: wp.position_m[1],
                metres_z: wp.position_m[2],
                visual_x: wp.visual[0],
                visual_y: wp.visual[1],
                width: ctx.width,
                height: ctx.height,
                zoom: ctx.zoom,
                center_latlon: ctx.center_latlon,
            })
            .collect()
    }

    /// Rebuild a path and its transform context from mission records.
    ///
    /// The context comes from the first record. An empty record list is an
    /// error since there would be no context to reconstruct.
    pub fn from_records(records: &[WaypointRecord]) -> Result<(Self, TransformCtx), PathError> {
        let first = records.first().ok_or(PathError::EmptyMission)?;

        let ctx = TransformCtx {
            width: first.width,
            height: first.height,
            zoom: first.zoom,
            center_latlon: first.center_latlon,
        };

        let waypoints = records
            .iter()
            .map(|rec| Waypoint {
                latitude: rec.latitude,
                longitude: rec.longitude,
                altitude: rec.altitude,
                position_m: Vector3::new(rec.metres_x, rec.metres_y, rec.metres_z),
                visual: [rec.visual_x, rec.visual_y],
            })
            .collect();

        Ok((Path { waypoints }, ctx))
    }

    /// Load a mission file from disk.
    ///
    /// Malformed files fail here with no partial load.
    pub fn load_json<P: AsRef<std::path::Path>>(
        file_path: P,
    ) -> Result<(Self, TransformCtx), PathError> {
        let json = std::fs::read_to_string(file_path).map_err(PathError::FileReadError)?;

        let records: Vec<WaypointRecord> =
            serde_json::from_str(&json).map_err(PathError::MalformedFile)?;

        Self::from_records(&records)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_path(points: &[[f64; 3]]) -> Path {
        let ctx = TransformCtx::default();
        let mut path = Path::new_empty();

        for p in points {
            path.add_waypoint(Waypoint::new(
                &ctx,
                0.0,
                0.0,
                Vector3::new(p[0], p[1], p[2]),
            ));
        }

        path
    }

    #[test]
    fn test_no_segments_without_two_waypoints() {
        let empty = test_path(&[]);
        assert!(!empty.has_segments());
        assert!(empty.nearest_point(&Vector3::zeros()).is_none());
        assert!(empty.length_m().is_none());

        let single = test_path(&[[1.0, 2.0, 3.0]]);
        assert!(!single.has_segments());
        assert!(single.nearest_point(&Vector3::zeros()).is_none());
    }

    #[test]
    fn test_nearest_point_on_l_shaped_path() {
        let path = test_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]]);

        // Off the side of the first segment
        let n = path.nearest_point(&Vector3::new(3.0, 4.0, 0.0)).unwrap();
        assert_eq!(n.seg_index, 0);
        assert!((n.dist_m - 4.0).abs() < 1e-9);
        assert!((n.point_m - Vector3::new(3.0, 0.0, 0.0)).norm() < 1e-9);

        // Off the side of the second segment
        let n = path.nearest_point(&Vector3::new(7.0, 6.0, 0.0)).unwrap();
        assert_eq!(n.seg_index, 1);
        assert!((n.dist_m - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_point_tie_break_first_segment() {
        // Two segments meeting at (10, 0, 0): a point past the corner along
        // the bisector is equidistant to both, the first must win
        let path = test_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]]);

        let n = path.nearest_point(&Vector3::new(12.0, -2.0, 0.0)).unwrap();
        assert_eq!(n.seg_index, 0);
        assert!((n.point_m - Vector3::new(10.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn test_degenerate_path_all_points_coincident() {
        let path = test_path(&[[5.0, 5.0, 5.0], [5.0, 5.0, 5.0], [5.0, 5.0, 5.0]]);

        let n = path.nearest_point(&Vector3::new(5.0, 9.0, 5.0)).unwrap();
        assert!((n.dist_m - 4.0).abs() < 1e-9);
        assert!((n.point_m - Vector3::new(5.0, 5.0, 5.0)).norm() < 1e-9);
    }

    #[test]
    fn test_length() {
        let path = test_path(&[[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0]]);
        assert!((path.length_m().unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_round_trip() {
        let ctx = TransformCtx {
            width: 800.0,
            height: 600.0,
            zoom: 0.3,
            center_latlon: [49.2265, 16.5968],
        };

        let mut path = Path::new_empty();
        path.add_waypoint(Waypoint::new(
            &ctx,
            49.2265,
            16.5968,
            Vector3::new(1.25, -2.5, 3.0),
        ));
        path.add_waypoint(Waypoint::new(
            &ctx,
            49.2266,
            16.5970,
            Vector3::new(4.0, 5.5, 2.0),
        ));

        let records = path.to_records(&ctx);
        let json = serde_json::to_string_pretty(&records).unwrap();

        // Context keys carry the dotted names the planning tool writes
        assert!(json.contains("\"transformer.width\""));
        assert!(json.contains("\"transformer.center_latlon\""));
        assert!(!json.contains("\"width\""));

        let parsed: Vec<WaypointRecord> = serde_json::from_str(&json).unwrap();
        let (loaded, loaded_ctx) = Path::from_records(&parsed).unwrap();

        assert_eq!(loaded_ctx, ctx);
        assert_eq!(loaded.num_waypoints(), path.num_waypoints());

        for (orig, load) in path.waypoints().iter().zip(loaded.waypoints()) {
            assert!((orig.position_m - load.position_m).norm() < 1e-6);
            assert!((orig.latitude - load.latitude).abs() < 1e-6);
            assert!((orig.longitude - load.longitude).abs() < 1e-6);
        }
    }

    #[test]
    fn test_from_records_rejects_empty() {
        assert!(matches!(
            Path::from_records(&[]),
            Err(PathError::EmptyMission)
        ));
    }

    #[test]
    fn test_malformed_mission_fails_fast() {
        let mut file = std::env::temp_dir();
        file.push("sfa_malformed_mission.json");
        std::fs::write(&file, r#"[{"latitude": "not a number"}]"#).unwrap();

        assert!(matches!(
            Path::load_json(&file),
            Err(PathError::MalformedFile(_))
        ));
    }

    #[test]
    fn test_edit_waypoint_updates_visual() {
        let ctx = TransformCtx::default();
        let mut path = test_path(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);

        let wp = path.waypoint_mut(1).unwrap();
        wp.set_position_m(&ctx, Vector3::new(2.0, 2.0, 1.0));

        let expected = ctx.metres2pixels(&Vector3::new(2.0, 2.0, 1.0));
        assert_eq!(path.waypoints()[1].visual, [expected[0], expected[1]]);
    }
}
