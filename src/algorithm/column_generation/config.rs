//! # Fixing settings
use serde::Deserialize;

/// Parameters of the fixing heuristic of `SetPartitioningProblem`.
///
/// Deserializes from any `serde` format; missing fields take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixingConfig {
    /// Coverage from which a constraint is fixed to a member.
    pub fix_threshold: f64,
    /// Factor applied to the threshold when nothing could be fixed.
    pub threshold_decay: f64,
    /// The threshold is not lowered below this value.
    pub minimum_threshold: f64,
    /// Constraints whose coverage history is at most this value are fixed to zero.
    pub zero_fix_threshold: f64,
    /// No fixing happens while the objective decreases by more than this per iteration.
    pub objective_change_before_fixing: f64,
    /// Weight of the old value in the exponential average of the coverage.
    pub history_update_fraction: f64,
    /// No fixing happens in the first iterations.
    pub minimum_iterations: usize,
}

impl Default for FixingConfig {
    fn default() -> Self {
        Self {
            fix_threshold: 0.75,
            threshold_decay: 0.9,
            minimum_threshold: 0.51,
            zero_fix_threshold: 0.05,
            objective_change_before_fixing: 1.0,
            history_update_fraction: 0.95,
            minimum_iterations: 4,
        }
    }
}

impl FixingConfig {
    /// Set `fix_threshold`.
    #[must_use]
    pub fn with_fix_threshold(mut self, threshold: f64) -> Self {
        self.fix_threshold = threshold;
        self
    }

    /// Set `zero_fix_threshold`.
    #[must_use]
    pub fn with_zero_fix_threshold(mut self, threshold: f64) -> Self {
        self.zero_fix_threshold = threshold;
        self
    }

    /// Set `objective_change_before_fixing`.
    #[must_use]
    pub fn with_objective_change_before_fixing(mut self, change: f64) -> Self {
        self.objective_change_before_fixing = change;
        self
    }

    /// Set `minimum_iterations`.
    #[must_use]
    pub fn with_minimum_iterations(mut self, iterations: usize) -> Self {
        self.minimum_iterations = iterations;
        self
    }
}

#[cfg(test)]
mod test {
    use super::FixingConfig;

    #[test]
    fn partial_deserialization() {
        let config: FixingConfig = serde_json::from_str(r#"{"fix_threshold": 0.8, "minimum_iterations": 2}"#).unwrap();
        assert_eq!(config, FixingConfig::default().with_fix_threshold(0.8).with_minimum_iterations(2));
        assert_eq!(config.threshold_decay, 0.9);
    }
}
