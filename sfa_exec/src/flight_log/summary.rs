//! Post-flight summary statistics
//!
//! Derived from the recorded distance samples in a single linear pass. Time
//! is accounted with the deltas between consecutive samples, bucketed into
//! "inside" or "outside" per corridor by comparing each sample's distance
//! against the corridor threshold.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Post-flight summary, serialised as `summary.json` in the session
/// directory.
///
/// The flat key set matches the summaries the analysis tooling already
/// consumes, do not rename: `_d` is the raw distance distribution, `_df` and
/// `_dw` the distributions shifted down by the free and warning ranges
/// (clipped to zero below the threshold).
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    // Free corridor accounting
    pub time_in_free_zone: f64,
    pub time_out_free_zone: f64,
    #[serde(rename = "% time_in_free_zone")]
    pub pct_time_in_free_zone: f64,
    #[serde(rename = "% time_out_free_zone")]
    pub pct_time_out_free_zone: f64,
    pub free_zone_left_count: usize,
    pub time_out_free_zone_list: Vec<f64>,
    pub average_duration_out_free_zone: f64,

    // Warning corridor accounting
    pub time_in_warning_zone: f64,
    pub time_out_warning_zone: f64,
    #[serde(rename = "% time_in_warning_zone")]
    pub pct_time_in_warning_zone: f64,
    #[serde(rename = "% time_out_warning_zone")]
    pub pct_time_out_warning_zone: f64,
    pub warning_zone_left_count: usize,
    pub time_out_warning_zone_list: Vec<f64>,
    pub average_duration_out_warning_zone: f64,

    // Raw distance distribution
    pub minimum_d: f64,
    pub maximum_d: f64,
    pub mean_d: f64,
    pub variance_d: f64,
    pub standard_deviation_d: f64,

    // Distance beyond the free range
    pub minimum_df: f64,
    pub maximum_df: f64,
    pub mean_df: f64,
    pub variance_df: f64,
    pub standard_deviation_df: f64,

    // Distance beyond the warning range
    pub minimum_dw: f64,
    pub maximum_dw: f64,
    pub mean_dw: f64,
    pub variance_dw: f64,
    pub standard_deviation_dw: f64,
}

/// Time accounting for one corridor, an intermediate of [`Summary::build`].
struct ZoneStats {
    time_in_s: f64,
    time_out_s: f64,
    pct_in: f64,
    pct_out: f64,
    left_count: usize,
    time_out_list_s: Vec<f64>,
    average_out_s: f64,
}

/// Min/max/mean/variance/stdev over a sample distribution.
struct DistStats {
    min: f64,
    max: f64,
    mean: f64,
    variance: f64,
    stdev: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Summary {
    /// Build a summary from parallel distance and flight-time sample arrays.
    ///
    /// Returns `None` when there is no distance data to summarise, either no
    /// samples at all or every sample zero (no path was loaded during the
    /// flight).
    pub fn build(
        dists_m: &[f64],
        fly_times_s: &[f64],
        free_range_m: f64,
        warning_range_m: f64,
    ) -> Option<Self> {
        if dists_m.is_empty() || dists_m.iter().sum::<f64>() == 0.0 {
            return None;
        }

        let free = ZoneStats::build(dists_m, fly_times_s, free_range_m);
        let warning = ZoneStats::build(dists_m, fly_times_s, warning_range_m);

        let d = DistStats::from_samples(dists_m);
        let df = DistStats::from_shifted_samples(dists_m, free_range_m);
        let dw = DistStats::from_shifted_samples(dists_m, warning_range_m);

        Some(Self {
            time_in_free_zone: free.time_in_s,
            time_out_free_zone: free.time_out_s,
            pct_time_in_free_zone: free.pct_in,
            pct_time_out_free_zone: free.pct_out,
            free_zone_left_count: free.left_count,
            time_out_free_zone_list: free.time_out_list_s,
            average_duration_out_free_zone: free.average_out_s,

            time_in_warning_zone: warning.time_in_s,
            time_out_warning_zone: warning.time_out_s,
            pct_time_in_warning_zone: warning.pct_in,
            pct_time_out_warning_zone: warning.pct_out,
            warning_zone_left_count: warning.left_count,
            time_out_warning_zone_list: warning.time_out_list_s,
            average_duration_out_warning_zone: warning.average_out_s,

            minimum_d: d.min,
            maximum_d: d.max,
            mean_d: d.mean,
            variance_d: d.variance,
            standard_deviation_d: d.stdev,

            minimum_df: df.min,
            maximum_df: df.max,
            mean_df: df.mean,
            variance_df: df.variance,
            standard_deviation_df: df.stdev,

            minimum_dw: dw.min,
            maximum_dw: dw.max,
            mean_dw: dw.mean,
            variance_dw: dw.variance,
            standard_deviation_dw: dw.stdev,
        })
    }
}

impl ZoneStats {
    /// Accumulate in/out time and excursion durations for one corridor.
    ///
    /// The delta between consecutive flight times is attributed to whichever
    /// side of the threshold the current sample falls on. The first sample
    /// contributes no time (its delta is zero).
    fn build(dists_m: &[f64], fly_times_s: &[f64], range_m: f64) -> Self {
        let mut time_in_s = 0.0;
        let mut time_out_s = 0.0;
        let mut left_count = 0usize;
        let mut time_out_list_s: Vec<f64> = Vec::new();
        let mut inside = true;

        let mut prev_time_s = fly_times_s.first().copied().unwrap_or(0.0);

        for (&dist_m, &time_s) in dists_m.iter().zip(fly_times_s) {
            let delta_s = time_s - prev_time_s;

            if dist_m < range_m {
                inside = true;
                time_in_s += delta_s;
            } else {
                if inside {
                    left_count += 1;
                    time_out_list_s.push(0.0);
                    inside = false;
                }

                time_out_s += delta_s;
                if let Some(current) = time_out_list_s.last_mut() {
                    *current += delta_s;
                }
            }

            prev_time_s = time_s;
        }

        // Instantaneous excursions (single sample, zero delta) carry no time
        time_out_list_s.retain(|&t| t != 0.0);

        let total_s = time_in_s + time_out_s;
        let (pct_in, pct_out) = if total_s > 0.0 {
            (time_in_s / total_s * 100.0, time_out_s / total_s * 100.0)
        } else {
            (0.0, 0.0)
        };

        let average_out_s = if time_out_list_s.is_empty() {
            0.0
        } else {
            time_out_list_s.iter().sum::<f64>() / time_out_list_s.len() as f64
        };

        Self {
            time_in_s,
            time_out_s,
            pct_in,
            pct_out,
            left_count,
            time_out_list_s,
            average_out_s,
        }
    }
}

impl DistStats {
    /// Compute statistics over raw samples.
    ///
    /// The caller guarantees `samples` is non-empty.
    fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len() as f64;

        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / n;

        let variance = if samples.len() < 2 {
            0.0
        } else {
            samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)
        };

        Self {
            min,
            max,
            mean,
            variance,
            stdev: variance.sqrt(),
        }
    }

    /// Compute statistics over samples shifted down by a threshold, with
    /// values below the threshold clipped to zero.
    fn from_shifted_samples(samples: &[f64], threshold: f64) -> Self {
        let shifted: Vec<f64> = samples
            .iter()
            .map(|&s| if s - threshold > 0.0 { s - threshold } else { 0.0 })
            .collect();

        Self::from_samples(&shifted)
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
    fn test_no_summary_without_distance_data() {
        assert!(Summary::build(&[], &[], 1.0, 2.0).is_none());
        assert!(Summary::build(&[0.0, 0.0, 0.0], &[0.0, 1.0, 2.0], 1.0, 2.0).is_none());
    }

    #[test]
    fn test_zone_accounting_single_excursion() {
        // 1 Hz samples: inside for 2 s, outside for 3 s, back inside for 2 s
        let d = [0.5, 0.5, 0.5, 1.5, 1.5, 1.5, 0.5, 0.5];
        let t = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];

        let summary = Summary::build(&d, &t, 1.0, 2.0).unwrap();

        assert!((summary.time_in_free_zone - 4.0).abs() < TOL);
        assert!((summary.time_out_free_zone - 3.0).abs() < TOL);
        assert_eq!(summary.free_zone_left_count, 1);
        assert_eq!(summary.time_out_free_zone_list.len(), 1);
        assert!((summary.time_out_free_zone_list[0] - 3.0).abs() < TOL);
        assert!((summary.average_duration_out_free_zone - 3.0).abs() < TOL);
        assert!((summary.pct_time_in_free_zone - 4.0 / 7.0 * 100.0).abs() < TOL);

        // Never beyond the warning range
        assert_eq!(summary.warning_zone_left_count, 0);
        assert!((summary.time_out_warning_zone - 0.0).abs() < TOL);
        assert_eq!(summary.average_duration_out_warning_zone, 0.0);
    }

    #[test]
    fn test_zone_accounting_repeated_excursions() {
        let d = [0.5, 1.5, 0.5, 1.5, 1.5, 0.5];
        let t = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

        let summary = Summary::build(&d, &t, 1.0, 2.0).unwrap();

        assert_eq!(summary.free_zone_left_count, 2);
        assert_eq!(summary.time_out_free_zone_list.len(), 2);
        assert!((summary.time_out_free_zone_list[0] - 1.0).abs() < TOL);
        assert!((summary.time_out_free_zone_list[1] - 2.0).abs() < TOL);
        assert!((summary.average_duration_out_free_zone - 1.5).abs() < TOL);
    }

    #[test]
    fn test_dist_stats() {
        let d = [1.0, 2.0, 3.0, 4.0];
        let t = [0.0, 1.0, 2.0, 3.0];

        let summary = Summary::build(&d, &t, 1.0, 2.0).unwrap();

        assert!((summary.minimum_d - 1.0).abs() < TOL);
        assert!((summary.maximum_d - 4.0).abs() < TOL);
        assert!((summary.mean_d - 2.5).abs() < TOL);

        // Sample variance of [1, 2, 3, 4] is 5/3
        assert!((summary.variance_d - 5.0 / 3.0).abs() < TOL);
        assert!((summary.standard_deviation_d - (5.0f64 / 3.0).sqrt()).abs() < TOL);

        // Shifted by the warning range 2: [0, 0, 1, 2]
        assert!((summary.minimum_dw - 0.0).abs() < TOL);
        assert!((summary.maximum_dw - 2.0).abs() < TOL);
        assert!((summary.mean_dw - 0.75).abs() < TOL);
    }

    #[test]
    fn test_single_sample_has_zero_variance() {
        let summary = Summary::build(&[3.0], &[0.0], 1.0, 2.0).unwrap();

        assert_eq!(summary.variance_d, 0.0);
        assert_eq!(summary.standard_deviation_d, 0.0);
        assert!((summary.mean_d - 3.0).abs() < TOL);
    }

    #[test]
    fn test_json_keys_match_tooling() {
        let d = [0.5, 1.5, 2.5];
        let t = [0.0, 1.0, 2.0];

        let summary = Summary::build(&d, &t, 1.0, 2.0).unwrap();
        let json = serde_json::to_string(&summary).unwrap();

        // The flat descriptive key set the analysis tooling reads
        assert!(json.contains("\"time_in_free_zone\""));
        assert!(json.contains("\"time_out_free_zone\""));
        assert!(json.contains("\"% time_in_free_zone\""));
        assert!(json.contains("\"free_zone_left_count\""));
        assert!(json.contains("\"time_out_warning_zone_list\""));
        assert!(json.contains("\"average_duration_out_warning_zone\""));
        assert!(json.contains("\"minimum_d\""));
        assert!(json.contains("\"variance_df\""));
        assert!(json.contains("\"standard_deviation_dw\""));
    }
}
