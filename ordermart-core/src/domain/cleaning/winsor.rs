// ordermart-core/src/domain/cleaning/winsor.rs

use serde::{Deserialize, Serialize};

/// How a quartile is picked when it falls between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantileMethod {
    /// Lower of the two neighbouring observations (never interpolates).
    #[default]
    Lower,
    Higher,
    Nearest,
    Midpoint,
    /// Linear interpolation between neighbours.
    Linear,
}

/// q-th quantile of an ascending slice. `None` for an empty slice.
pub fn quantile(sorted: &[f64], q: f64, method: QuantileMethod) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    let value = match method {
        QuantileMethod::Lower => sorted[lower],
        QuantileMethod::Higher => sorted[upper],
        QuantileMethod::Nearest => {
            // Ties go to the even index.
            if frac > 0.5 || (frac == 0.5 && lower % 2 == 1) {
                sorted[upper]
            } else {
                sorted[lower]
            }
        }
        QuantileMethod::Midpoint => (sorted[lower] + sorted[upper]) / 2.0,
        QuantileMethod::Linear => sorted[lower] + (sorted[upper] - sorted[lower]) * frac,
    };
    Some(value)
}

/// IQR fences computed once over the whole amount population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinsorBounds {
    pub method: QuantileMethod,
    pub multiplier: f64,
    pub population: usize,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
}

impl WinsorBounds {
    /// Fit fences on the non-missing values. `None` when there is nothing to
    /// fit on (every amount missing).
    pub fn fit(values: &[f64], multiplier: f64, method: QuantileMethod) -> Option<WinsorBounds> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25, method)?;
        let q3 = quantile(&sorted, 0.75, method)?;
        let iqr = q3 - q1;

        Some(WinsorBounds {
            method,
            multiplier,
            population: sorted.len(),
            q1,
            q3,
            iqr,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        })
    }

    /// Clip into `[lower, upper]`. Returns the value and whether it moved.
    /// Values already inside (bounds included) are returned untouched.
    pub fn clip(&self, value: f64) -> (f64, bool) {
        if value < self.lower {
            (self.lower, true)
        } else if value > self.upper {
            (self.upper, true)
        } else {
            (value, false)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_methods_on_even_population() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        // pos(0.25) = 0.75
        assert_eq!(quantile(&sorted, 0.25, QuantileMethod::Lower), Some(1.0));
        assert_eq!(quantile(&sorted, 0.25, QuantileMethod::Higher), Some(2.0));
        assert_eq!(quantile(&sorted, 0.25, QuantileMethod::Nearest), Some(2.0));
        assert_eq!(quantile(&sorted, 0.25, QuantileMethod::Midpoint), Some(1.5));
        assert_eq!(quantile(&sorted, 0.25, QuantileMethod::Linear), Some(1.75));
    }

    #[test]
    fn test_quantile_empty_is_none() {
        assert_eq!(quantile(&[], 0.5, QuantileMethod::Linear), None);
        assert!(WinsorBounds::fit(&[], 1.5, QuantileMethod::Lower).is_none());
    }

    #[test]
    fn test_fit_two_values_clips_large_outlier() {
        let bounds = WinsorBounds::fit(&[10000.0, 10.0], 1.5, QuantileMethod::Lower).unwrap();
        assert_eq!(bounds.q1, 10.0);
        assert_eq!(bounds.q3, 10.0);
        assert_eq!(bounds.upper, 10.0);
        assert_eq!(bounds.clip(10000.0), (10.0, true));
        assert_eq!(bounds.clip(10.0), (10.0, false));
    }

    #[test]
    fn test_linear_fences() {
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        let bounds = WinsorBounds::fit(&values, 1.5, QuantileMethod::Linear).unwrap();
        assert_eq!(bounds.q1, 3.0);
        assert_eq!(bounds.q3, 7.0);
        assert_eq!(bounds.lower, -3.0);
        assert_eq!(bounds.upper, 13.0);
        assert_eq!(bounds.population, 9);
    }

    #[test]
    fn test_clip_is_idempotent() {
        let bounds = WinsorBounds::fit(&[1.0, 2.0, 3.0, 4.0, 100.0], 1.5, QuantileMethod::Linear)
            .unwrap();
        for v in [-50.0, 1.0, 3.5, 100.0, 1e9] {
            let (once, _) = bounds.clip(v);
            let (twice, moved) = bounds.clip(once);
            assert_eq!(once, twice);
            assert!(!moved);
        }
    }
}
