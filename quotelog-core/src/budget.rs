//! Conversion of an hourly call ceiling into a per-call spacing.

use std::time::Duration;

use quotelog_types::QuotelogError;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Minimum spacing between consecutive quote source calls.
///
/// The budget is global: it applies to every call regardless of which instrument
/// is being polled.
///
/// ```
/// use quotelog_core::RateBudget;
///
/// let budget = RateBudget::new(400.0).unwrap();
/// assert_eq!(budget.spacing_seconds(), 9.0);
/// assert!(RateBudget::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBudget {
    calls_per_hour: f64,
    spacing_seconds: f64,
}

impl RateBudget {
    /// Compute the spacing `3600 / calls_per_hour` once.
    ///
    /// # Errors
    /// Returns `ConfigInvalid` if `calls_per_hour` is zero, negative, NaN or infinite.
    pub fn new(calls_per_hour: f64) -> Result<Self, QuotelogError> {
        if !(calls_per_hour.is_finite() && calls_per_hour > 0.0) {
            return Err(QuotelogError::config(format!(
                "calls_per_hour must be a positive number, got {calls_per_hour}"
            )));
        }
        Ok(Self {
            calls_per_hour,
            spacing_seconds: SECONDS_PER_HOUR / calls_per_hour,
        })
    }

    /// The configured ceiling.
    #[must_use]
    pub const fn calls_per_hour(&self) -> f64 {
        self.calls_per_hour
    }

    /// Spacing in seconds.
    #[must_use]
    pub const fn spacing_seconds(&self) -> f64 {
        self.spacing_seconds
    }

    /// Spacing as a `Duration`.
    #[must_use]
    pub fn spacing(&self) -> Duration {
        Duration::from_secs_f64(self.spacing_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_hundred_per_hour_is_nine_seconds() {
        let b = RateBudget::new(400.0).unwrap();
        assert!((b.spacing_seconds() - 9.0).abs() < f64::EPSILON);
        assert_eq!(b.spacing(), Duration::from_secs(9));
    }

    #[test]
    fn fractional_budgets() {
        let b = RateBudget::new(7200.0).unwrap();
        assert_eq!(b.spacing(), Duration::from_millis(500));
        let b = RateBudget::new(0.5).unwrap();
        assert_eq!(b.spacing(), Duration::from_secs(7200));
    }

    #[test]
    fn rejects_degenerate_budgets() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = RateBudget::new(bad).unwrap_err();
            assert!(matches!(err, QuotelogError::ConfigInvalid(_)), "{bad}");
        }
    }
}
