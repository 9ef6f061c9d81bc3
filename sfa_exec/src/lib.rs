//! # Safe Flight Assistant library.
//!
//! This library allows other crates in the workspace (and the exec's own
//! binary) to access items defined inside the assistant crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Correction control module - blends pilot commands with path corrections
pub mod corr_ctrl;

/// Global data store for the executable
pub mod data_store;

/// Flight log module - per-tick records and post-flight summary statistics
pub mod flight_log;

/// Geometry primitives - point to segment projections
pub mod geom;

/// Exec-level parameters
pub mod params;

/// Path module - waypoints, segments and mission persistence
pub mod path;

/// Coordinate transform context - local metric frame to display space
pub mod transform;

/// Vehicle module - the capability trait and the simulated backend
pub mod vehicle;
