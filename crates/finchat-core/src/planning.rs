//! Required interest rate for a savings plan
//!
//! Solves `FV = P(1+r)^n + A((1+r)^n - 1)/r` for the per-period rate `r`
//! with Newton-Raphson.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

const INITIAL_GUESS: f64 = 0.05;
const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-6;

/// Savings plan inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsPlan {
    /// Lump sum invested up front (`P`)
    pub initial_investment: f64,
    /// Amount added every period (`A`)
    pub periodic_investment: f64,
    /// Target value (`FV`)
    pub final_value: f64,
    /// Number of periods (`n`)
    pub number_of_periods: u32,
}

impl SavingsPlan {
    /// Reject plans with no positive rate solution
    ///
    /// # Errors
    /// `InvalidInput` when `n` is zero, a value is not finite, or the
    /// contributions alone already reach the target
    pub fn validate(&self) -> Result<()> {
        if self.number_of_periods == 0 {
            return Err(Error::InvalidInput(
                "numberOfPeriods must be greater than zero.".to_string(),
            ));
        }
        if ![self.initial_investment, self.periodic_investment, self.final_value]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::InvalidInput("All amounts must be finite numbers.".to_string()));
        }
        let contributed = self.initial_investment + self.periodic_investment * f64::from(self.number_of_periods);
        if contributed >= self.final_value {
            return Err(Error::InvalidInput(
                "The combined initial and periodic investments must be less than the desired final value to calculate an interest rate.".to_string(),
            ));
        }
        Ok(())
    }

    fn residual(&self, r: f64) -> f64 {
        let (p, a, fv) = (self.initial_investment, self.periodic_investment, self.final_value);
        let n = f64::from(self.number_of_periods);
        if r == 0.0 {
            return p + a * n - fv;
        }
        let growth = (1.0 + r).powf(n);
        p * growth + a * (growth - 1.0) / r - fv
    }

    fn slope(&self, r: f64) -> f64 {
        let (p, a) = (self.initial_investment, self.periodic_investment);
        let n = f64::from(self.number_of_periods);
        if r == 0.0 {
            return p * n + a * n * (n - 1.0) / 2.0;
        }
        let growth = (1.0 + r).powf(n);
        let growth_prev = (1.0 + r).powf(n - 1.0);
        p * n * growth_prev + a * (n * growth_prev * r - (growth - 1.0)) / (r * r)
    }
}

/// Required per-period rate, in percent
///
/// # Errors
/// `InvalidInput` for invalid plans or when the iteration diverges
pub fn required_rate(plan: &SavingsPlan) -> Result<f64> {
    plan.validate()?;

    let mut r = INITIAL_GUESS;
    for _ in 0..MAX_ITERATIONS {
        let slope = plan.slope(r);
        if slope == 0.0 || !slope.is_finite() {
            break;
        }
        let next = r - plan.residual(r) / slope;
        if (next - r).abs() < TOLERANCE {
            r = next;
            break;
        }
        r = next;
    }

    if !r.is_finite() {
        return Err(Error::InvalidInput("Interest rate did not converge.".to_string()));
    }
    Ok(r * 100.0)
}
