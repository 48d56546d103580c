//! # Model settings
use serde::Deserialize;

/// Numerical settings of an `IntegerProgram`.
///
/// Deserializes from any `serde` format; missing fields take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Variable bounds beyond this magnitude are considered infinite when deriving a big-M value.
    pub finite_bound_limit: f64,
    /// Big-M value of an exists block when a constraint contains an unbounded variable.
    pub big_m_fallback: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            finite_bound_limit: 1e10,
            big_m_fallback: 10_000.0,
        }
    }
}

impl ModelConfig {
    /// Set `finite_bound_limit`.
    #[must_use]
    pub fn with_finite_bound_limit(mut self, limit: f64) -> Self {
        self.finite_bound_limit = limit;
        self
    }

    /// Set `big_m_fallback`.
    #[must_use]
    pub fn with_big_m_fallback(mut self, big_m: f64) -> Self {
        self.big_m_fallback = big_m;
        self
    }
}

#[cfg(test)]
mod test {
    use super::ModelConfig;

    #[test]
    fn partial_deserialization() {
        let config: ModelConfig = serde_json::from_str(r#"{"big_m_fallback": 50.0}"#).unwrap();
        assert_eq!(config, ModelConfig::default().with_big_m_fallback(50.0));
        assert_eq!(config.finite_bound_limit, 1e10);
    }
}
