//! Tolerances for comparing parameter values.

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

/// Relative and absolute tolerance of an approximate float comparison.
///
/// `x` is close to `y` if `|x - y| <= atol + |y| * rtol`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloatCmp {
    /// Relative tolerance.
    pub rtol: f64,
    /// Absolute tolerance.
    pub atol: f64,
}

impl Default for FloatCmp {
    fn default() -> Self {
        Self {
            rtol: 1e-14,
            atol: 1e-14,
        }
    }
}

impl FloatCmp {
    /// Whether `x` is close to `y`.
    pub fn close(&self, x: f64, y: f64) -> bool {
        (x - y).abs() <= self.atol + y.abs() * self.rtol
    }

    /// Whether both tensors have the same shape and all entries are close.
    pub fn all_close(&self, x: &ArrayD<f64>, y: &ArrayD<f64>) -> bool {
        x.shape() == y.shape() && x.iter().zip(y.iter()).all(|(&a, &b)| self.close(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() -> anyhow::Result<()> {
        let cmp: FloatCmp = serde_json::from_str(r#"{"rtol": 1e-8}"#)?;
        assert_eq!(cmp.rtol, 1e-8);
        assert_eq!(cmp.atol, 1e-14);
        assert!(cmp.close(1.0 + 1e-9, 1.0));
        assert!(!FloatCmp::default().close(1.0 + 1e-9, 1.0));
        Ok(())
    }
}
