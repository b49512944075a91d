//! Running-aggregate math for route statistics.
//!
//! Routes keep incremental weighted means and best/worst fuel-economy
//! records across every drive that matched them. The fold logic is pure so
//! the route matcher can be tested without a database.

// ---------------------------------------------------------------------------
// Incremental mean
// ---------------------------------------------------------------------------

/// Fold a new value into a running mean that currently covers `old_count`
/// observations.
///
/// Formula: `new_avg = (old_avg * old_count + new_value) / (old_count + 1)`
pub fn incremental_mean(old_avg: f64, old_count: i64, new_value: f64) -> f64 {
    (old_avg * old_count as f64 + new_value) / (old_count + 1) as f64
}

/// Fold an optional observation into an optional running mean.
///
/// An absent observation leaves the mean untouched. A first observation for
/// a metric the route has never seen seeds the mean directly, regardless of
/// `old_count`; the count tracks drives, not per-metric samples.
pub fn fold_mean(old_avg: Option<f64>, old_count: i64, value: Option<f64>) -> Option<f64> {
    match (old_avg, value) {
        (_, None) => old_avg,
        (None, Some(v)) => Some(v),
        (Some(avg), Some(v)) => Some(incremental_mean(avg, old_count, v)),
    }
}

// ---------------------------------------------------------------------------
// Best/worst tracking
// ---------------------------------------------------------------------------

/// True when `candidate` should replace the current best value: nothing
/// recorded yet, or strictly greater.
pub fn beats_best(current: Option<f64>, candidate: f64) -> bool {
    current.map_or(true, |best| candidate > best)
}

/// True when `candidate` should replace the current worst value: nothing
/// recorded yet, or strictly smaller.
pub fn beats_worst(current: Option<f64>, candidate: f64) -> bool {
    current.map_or(true, |worst| candidate < worst)
}

// ---------------------------------------------------------------------------
// Route aggregate state
// ---------------------------------------------------------------------------

/// The per-drive metrics a route aggregates over. Every field is optional;
/// absent fields leave the corresponding average untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveMetrics {
    pub mpg: Option<f64>,
    pub duration_secs: Option<f64>,
    pub peak_egt: Option<f64>,
    pub peak_boost: Option<f64>,
    pub peak_trans_temp: Option<f64>,
}

/// Running aggregate state carried on a route row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteAggregates {
    pub drive_count: i64,
    pub avg_mpg: Option<f64>,
    pub avg_duration_secs: Option<f64>,
    pub avg_peak_egt: Option<f64>,
    pub avg_peak_boost: Option<f64>,
    pub avg_peak_trans_temp: Option<f64>,
    pub best_mpg: Option<f64>,
    pub best_mpg_drive_id: Option<String>,
    pub worst_mpg: Option<f64>,
    pub worst_mpg_drive_id: Option<String>,
}

impl RouteAggregates {
    /// Fold one drive into the aggregates: bump the count, update each
    /// present metric's mean with the pre-increment count as weight, and
    /// take best/worst fuel economy on strict comparison.
    pub fn fold_drive(&mut self, drive_id: &str, metrics: DriveMetrics) {
        let old_count = self.drive_count;
        self.drive_count += 1;

        self.avg_mpg = fold_mean(self.avg_mpg, old_count, metrics.mpg);
        self.avg_duration_secs = fold_mean(self.avg_duration_secs, old_count, metrics.duration_secs);
        self.avg_peak_egt = fold_mean(self.avg_peak_egt, old_count, metrics.peak_egt);
        self.avg_peak_boost = fold_mean(self.avg_peak_boost, old_count, metrics.peak_boost);
        self.avg_peak_trans_temp =
            fold_mean(self.avg_peak_trans_temp, old_count, metrics.peak_trans_temp);

        if let Some(mpg) = metrics.mpg {
            if beats_best(self.best_mpg, mpg) {
                self.best_mpg = Some(mpg);
                self.best_mpg_drive_id = Some(drive_id.to_string());
            }
            if beats_worst(self.worst_mpg, mpg) {
                self.worst_mpg = Some(mpg);
                self.worst_mpg_drive_id = Some(drive_id.to_string());
            }
        }
    }

    /// Aggregates for a brand-new route seeded from its first drive:
    /// `drive_count = 1`, means taken directly from the drive's values,
    /// best and worst both pointing at it when fuel economy is present.
    pub fn seed(drive_id: &str, metrics: DriveMetrics) -> Self {
        let mut aggregates = Self::default();
        aggregates.fold_drive(drive_id, metrics);
        aggregates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incremental_mean_matches_weighted_formula() {
        // (20.0 * 4 + 30.0) / 5 = 22.0
        let result = incremental_mean(20.0, 4, 30.0);
        assert!((result - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sequential_folds_equal_arithmetic_mean() {
        let values = [18.5, 21.0, 19.2, 24.7, 16.3];
        let mut avg: Option<f64> = None;
        for (i, v) in values.iter().enumerate() {
            avg = fold_mean(avg, i as i64, Some(*v));
        }
        let expected: f64 = values.iter().sum::<f64>() / values.len() as f64;
        assert!((avg.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn absent_value_leaves_mean_untouched() {
        assert_eq!(fold_mean(Some(17.5), 3, None), Some(17.5));
        assert_eq!(fold_mean(None, 3, None), None);
    }

    #[test]
    fn first_observation_seeds_mean() {
        assert_eq!(fold_mean(None, 7, Some(12.0)), Some(12.0));
    }

    #[test]
    fn best_requires_strict_improvement() {
        assert!(beats_best(None, 20.0));
        assert!(beats_best(Some(19.9), 20.0));
        assert!(!beats_best(Some(20.0), 20.0));
        assert!(!beats_best(Some(20.1), 20.0));
    }

    #[test]
    fn worst_requires_strict_decline() {
        assert!(beats_worst(None, 20.0));
        assert!(beats_worst(Some(20.1), 20.0));
        assert!(!beats_worst(Some(20.0), 20.0));
        assert!(!beats_worst(Some(19.9), 20.0));
    }

    #[test]
    fn seed_sets_count_and_extremes() {
        let metrics = DriveMetrics {
            mpg: Some(18.0),
            duration_secs: Some(1800.0),
            ..Default::default()
        };
        let aggregates = RouteAggregates::seed("d-1", metrics);

        assert_eq!(aggregates.drive_count, 1);
        assert_eq!(aggregates.avg_mpg, Some(18.0));
        assert_eq!(aggregates.avg_duration_secs, Some(1800.0));
        assert_eq!(aggregates.avg_peak_egt, None);
        assert_eq!(aggregates.best_mpg, Some(18.0));
        assert_eq!(aggregates.best_mpg_drive_id.as_deref(), Some("d-1"));
        assert_eq!(aggregates.worst_mpg, Some(18.0));
        assert_eq!(aggregates.worst_mpg_drive_id.as_deref(), Some("d-1"));
    }

    #[test]
    fn seed_without_mpg_leaves_extremes_unset() {
        let metrics = DriveMetrics {
            duration_secs: Some(600.0),
            ..Default::default()
        };
        let aggregates = RouteAggregates::seed("d-1", metrics);

        assert_eq!(aggregates.drive_count, 1);
        assert_eq!(aggregates.best_mpg, None);
        assert_eq!(aggregates.worst_mpg, None);
    }

    #[test]
    fn fold_updates_count_and_means() {
        let mut aggregates = RouteAggregates::seed(
            "d-1",
            DriveMetrics {
                mpg: Some(20.0),
                duration_secs: Some(1000.0),
                ..Default::default()
            },
        );
        aggregates.fold_drive(
            "d-2",
            DriveMetrics {
                mpg: Some(30.0),
                peak_egt: Some(900.0),
                ..Default::default()
            },
        );

        assert_eq!(aggregates.drive_count, 2);
        assert!((aggregates.avg_mpg.unwrap() - 25.0).abs() < f64::EPSILON);
        // d-2 had no duration: mean unchanged.
        assert_eq!(aggregates.avg_duration_secs, Some(1000.0));
        // First EGT observation seeds directly.
        assert_eq!(aggregates.avg_peak_egt, Some(900.0));
        assert_eq!(aggregates.best_mpg, Some(30.0));
        assert_eq!(aggregates.best_mpg_drive_id.as_deref(), Some("d-2"));
        assert_eq!(aggregates.worst_mpg, Some(20.0));
        assert_eq!(aggregates.worst_mpg_drive_id.as_deref(), Some("d-1"));
    }

    #[test]
    fn equal_mpg_does_not_steal_records() {
        let mut aggregates = RouteAggregates::seed(
            "d-1",
            DriveMetrics {
                mpg: Some(20.0),
                ..Default::default()
            },
        );
        aggregates.fold_drive(
            "d-2",
            DriveMetrics {
                mpg: Some(20.0),
                ..Default::default()
            },
        );

        assert_eq!(aggregates.best_mpg_drive_id.as_deref(), Some("d-1"));
        assert_eq!(aggregates.worst_mpg_drive_id.as_deref(), Some("d-1"));
    }
}
