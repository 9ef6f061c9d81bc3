//! Correction control module
//!
//! CorrCtrl runs once per control cycle, blending the pilot's raw command
//! with two path corrections:
//!   - a present correction pulling the drone back towards the nearest point
//!     on the safe path, and
//!   - a future correction doing the same for the position the drone is
//!     predicted to reach after the lookahead time under its current
//!     velocity.
//!
//! Each correction is weighted by a penalty magnitude derived from the
//! distance to the path, so corrections vanish inside the free range and grow
//! cubically beyond the warning range.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod penalty;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use penalty::*;
pub use state::*;
