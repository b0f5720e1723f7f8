//! Equated Monthly Installment (EMI) calculation.
//!
//! EMI = P × r × (1 + r)^n / [(1 + r)^n − 1]
//!
//! where P is the principal, r the monthly rate (annual percent / 12 / 100)
//! and n the tenure in whole months. A zero rate degenerates to P / n.
//!
//! The formula is evaluated as P × r / [1 − (1 + r)^−n] through `ln_1p` and
//! `exp_m1`, which stays finite for rates too small to change `1 + r` and for
//! tenures long enough to overflow `(1 + r)^n`.
//!
//! Money outputs are rounded to 2 decimal places, half away from zero
//! (see [`round_money`]). Totals are derived from the unrounded installment
//! and rounded once at the end.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::policy::CURRENCY;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculatorError {
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

/// Arguments of one `calculateEmi` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiInput {
    /// Principal in currency units.
    pub loan_amount: f64,
    /// Annual rate in percent, e.g. 4.5 for 4.5%.
    pub annual_interest_rate: f64,
    pub tenure_years: f64,
}

impl EmiInput {
    /// Wire names of the fields, in declaration order.
    pub const FIELDS: [&'static str; 3] = ["loanAmount", "annualInterestRate", "tenureYears"];

    pub fn new(loan_amount: f64, annual_interest_rate: f64, tenure_years: f64) -> Self {
        Self {
            loan_amount,
            annual_interest_rate,
            tenure_years,
        }
    }

    pub fn validate(&self) -> Result<(), CalculatorError> {
        if !self.loan_amount.is_finite() || self.loan_amount <= 0.0 {
            return Err(invalid("loanAmount", "must be a positive number", self.loan_amount));
        }
        if !self.annual_interest_rate.is_finite() || self.annual_interest_rate < 0.0 {
            return Err(invalid(
                "annualInterestRate",
                "must be zero or a positive percentage",
                self.annual_interest_rate,
            ));
        }
        if !self.tenure_years.is_finite() || self.tenure_years <= 0.0 {
            return Err(invalid("tenureYears", "must be a positive number", self.tenure_years));
        }
        if self.number_of_months() < 1 {
            return Err(invalid(
                "tenureYears",
                "must cover at least one month",
                self.tenure_years,
            ));
        }
        Ok(())
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_interest_rate / 12.0 / 100.0
    }

    /// Tenure rounded to the nearest whole month.
    pub fn number_of_months(&self) -> u32 {
        let months = (self.tenure_years * 12.0).round();
        if months < 1.0 {
            0
        } else if months > u32::MAX as f64 {
            u32::MAX
        } else {
            months as u32
        }
    }
}

fn invalid(field: &'static str, reason: &str, value: f64) -> CalculatorError {
    CalculatorError::InvalidInput {
        field,
        reason: format!("{} (got {})", reason, value),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiResult {
    #[serde(rename = "monthlyEMI")]
    pub monthly_emi: f64,
    #[serde(rename = "totalInterest")]
    pub total_interest: f64,
    #[serde(rename = "totalPayment")]
    pub total_payment: f64,
    pub currency: String,
}

pub fn calculate_emi(input: &EmiInput) -> Result<EmiResult, CalculatorError> {
    input.validate()?;

    let principal = input.loan_amount;
    let monthly_rate = input.monthly_rate();
    let months = input.number_of_months() as f64;

    // 1 - (1 + r)^-n
    let discount = -(-months * monthly_rate.ln_1p()).exp_m1();
    let emi = if monthly_rate == 0.0 || discount <= 0.0 {
        principal / months
    } else {
        principal * monthly_rate / discount
    };

    let total_payment = emi * months;
    let result = EmiResult {
        monthly_emi: round_money(emi),
        total_interest: round_money(total_payment - principal),
        total_payment: round_money(total_payment),
        currency: CURRENCY.to_string(),
    };

    if ![result.monthly_emi, result.total_interest, result.total_payment]
        .iter()
        .all(|v| v.is_finite())
    {
        return Err(invalid(
            "loanAmount",
            "is too large to amortize over the given tenure",
            principal,
        ));
    }

    Ok(result)
}

/// Round to 2 decimal places, halves away from zero.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
