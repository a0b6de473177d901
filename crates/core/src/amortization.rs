//! Loan amortization tables.
//!
//! Fixed-payment ("French") schedules: every period pays the same amount,
//! interest is charged on the outstanding balance, and the remainder of the
//! payment reduces principal. Amounts are rounded to cents per row and the
//! last row absorbs the accumulated rounding so the loan closes at exactly
//! zero.
//!
//! ```
//! use prestamos_core::{AmortizationSchedule, LoanTerms};
//! use rust_decimal::Decimal;
//!
//! let terms = LoanTerms::new(Decimal::new(10_000, 0), Decimal::new(12, 0), 12);
//! let schedule = AmortizationSchedule::calculate(&terms).unwrap();
//!
//! assert_eq!(schedule.rows().len(), 12);
//! assert_eq!(schedule.payment(), Decimal::new(88_849, 2));
//! assert!(schedule.rows().last().unwrap().balance.is_zero());
//! ```

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Amount, CurrencyCode};

/// Longest term accepted, in months (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Errors produced while building a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmortizationError {
    /// Principal is zero or negative.
    #[error("loan amount must be greater than zero")]
    NonPositivePrincipal,

    /// Interest rate is negative.
    #[error("interest rate cannot be negative")]
    NegativeRate,

    /// Term is zero or longer than [`MAX_TERM_MONTHS`].
    #[error("term must be between 1 and {max} months")]
    InvalidTerm {
        /// Longest accepted term.
        max: u32,
    },

    /// Rate and term compound past decimal range.
    #[error("interest rate is too high for this term")]
    Overflow,
}

/// Inputs of a loan simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Decimal,
    /// Nominal annual rate, in percent (12 means 12%).
    pub annual_rate_percent: Decimal,
    /// Number of monthly payments.
    pub months: u32,
    /// Due date of the first payment, if the table should carry dates.
    pub first_due: Option<NaiveDate>,
    /// Currency of every amount in the table.
    pub currency: CurrencyCode,
}

impl LoanTerms {
    /// Terms without dates, in the default currency.
    #[must_use]
    pub fn new(principal: Decimal, annual_rate_percent: Decimal, months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            months,
            first_due: None,
            currency: CurrencyCode::default(),
        }
    }

    /// Attach a first due date; later rows fall on the same day of each
    /// following month, clamped to the month's last day.
    #[must_use]
    pub const fn with_first_due(mut self, first_due: NaiveDate) -> Self {
        self.first_due = Some(first_due);
        self
    }

    /// Set the currency.
    #[must_use]
    pub const fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    /// Monthly rate as a fraction (12% a year is 0.01).
    #[must_use]
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(12)
    }

    fn validate(&self) -> Result<(), AmortizationError> {
        if self.principal <= Decimal::ZERO {
            return Err(AmortizationError::NonPositivePrincipal);
        }
        if self.annual_rate_percent.is_sign_negative() && !self.annual_rate_percent.is_zero() {
            return Err(AmortizationError::NegativeRate);
        }
        if self.months == 0 || self.months > MAX_TERM_MONTHS {
            return Err(AmortizationError::InvalidTerm {
                max: MAX_TERM_MONTHS,
            });
        }
        Ok(())
    }
}

/// One period of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period number.
    pub period: u32,
    /// Due date, when the terms carry a first due date.
    pub due_date: Option<NaiveDate>,
    /// Total paid this period.
    pub payment: Decimal,
    /// Interest portion.
    pub interest: Decimal,
    /// Principal portion.
    pub principal: Decimal,
    /// Outstanding balance after this payment.
    pub balance: Decimal,
}

/// A full amortization table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    terms: LoanTerms,
    payment: Decimal,
    rows: Vec<AmortizationRow>,
}

impl AmortizationSchedule {
    /// Build the table for `terms`.
    ///
    /// # Errors
    ///
    /// Returns an [`AmortizationError`] for non-positive principal, negative
    /// rate, an out-of-range term, or a rate that compounds past decimal range.
    pub fn calculate(terms: &LoanTerms) -> Result<Self, AmortizationError> {
        terms.validate()?;

        let rate = terms.monthly_rate();
        let payment = Amount::round_cents(level_payment(terms.principal, rate, terms.months)?);

        let mut rows = Vec::with_capacity(terms.months as usize);
        let mut balance = terms.principal;

        for period in 1..=terms.months {
            let interest = Amount::round_cents(balance * rate);
            let last = period == terms.months;

            let (row_payment, principal) = if last {
                (balance + interest, balance)
            } else {
                let principal = (payment - interest).min(balance);
                (principal + interest, principal)
            };
            balance -= principal;

            rows.push(AmortizationRow {
                period,
                due_date: terms
                    .first_due
                    .and_then(|first| first.checked_add_months(Months::new(period - 1))),
                payment: row_payment,
                interest,
                principal,
                balance,
            });
        }

        Ok(Self {
            terms: terms.clone(),
            payment,
            rows,
        })
    }

    /// The terms this table was built from.
    #[must_use]
    pub const fn terms(&self) -> &LoanTerms {
        &self.terms
    }

    /// The level payment (every row but possibly the last).
    #[must_use]
    pub const fn payment(&self) -> Decimal {
        self.payment
    }

    /// All periods in order.
    #[must_use]
    pub fn rows(&self) -> &[AmortizationRow] {
        &self.rows
    }

    /// Sum of all payments.
    #[must_use]
    pub fn total_paid(&self) -> Decimal {
        self.rows.iter().map(|row| row.payment).sum()
    }

    /// Sum of all interest.
    #[must_use]
    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|row| row.interest).sum()
    }
}

/// `P * r / (1 - (1 + r)^-n)`, or `P / n` when the rate is zero.
fn level_payment(principal: Decimal, rate: Decimal, months: u32) -> Result<Decimal, AmortizationError> {
    if rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let base = Decimal::ONE + rate;
    let mut growth = Decimal::ONE;
    for _ in 0..months {
        growth = growth.checked_mul(base).ok_or(AmortizationError::Overflow)?;
    }

    principal
        .checked_mul(rate)
        .and_then(|numerator| numerator.checked_mul(growth))
        .and_then(|numerator| numerator.checked_div(growth - Decimal::ONE))
        .ok_or(AmortizationError::Overflow)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    #[test]
    fn test_twelve_month_loan() {
        let terms = LoanTerms::new(dec(10_000, 0), dec(12, 0), 12);
        let schedule = AmortizationSchedule::calculate(&terms).unwrap();

        assert_eq!(schedule.payment(), dec(88_849, 2));

        let first = &schedule.rows()[0];
        assert_eq!(first.interest, dec(100, 0));
        assert_eq!(first.principal, dec(78_849, 2));
        assert_eq!(first.balance, dec(921_151, 2));

        let last = schedule.rows().last().unwrap();
        assert!(last.balance.is_zero());

        let principal_sum: Decimal = schedule.rows().iter().map(|r| r.principal).sum();
        assert_eq!(principal_sum, dec(10_000, 0));
        assert_eq!(schedule.total_paid(), dec(10_000, 0) + schedule.total_interest());
    }

    #[test]
    fn test_zero_rate_splits_evenly() {
        let terms = LoanTerms::new(dec(1_000, 0), Decimal::ZERO, 3);
        let schedule = AmortizationSchedule::calculate(&terms).unwrap();

        assert_eq!(schedule.payment(), dec(33_333, 2));
        assert!(schedule.total_interest().is_zero());
        let last = schedule.rows().last().unwrap();
        assert_eq!(last.payment, dec(33_334, 2));
        assert!(last.balance.is_zero());
    }

    #[test]
    fn test_single_period() {
        let terms = LoanTerms::new(dec(500, 0), dec(24, 0), 1);
        let schedule = AmortizationSchedule::calculate(&terms).unwrap();

        assert_eq!(schedule.rows().len(), 1);
        assert_eq!(schedule.rows()[0].payment, dec(510, 0));
        assert_eq!(schedule.rows()[0].interest, dec(10, 0));
    }

    #[test]
    fn test_due_dates_clamp_to_month_end() {
        let terms = LoanTerms::new(dec(3_000, 0), dec(10, 0), 3)
            .with_first_due(NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        let schedule = AmortizationSchedule::calculate(&terms).unwrap();

        let dates: Vec<_> = schedule.rows().iter().map(|r| r.due_date.unwrap()).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }

    #[test]
    fn test_rejects_bad_terms() {
        let bad_principal = LoanTerms::new(Decimal::ZERO, dec(12, 0), 12);
        assert_eq!(
            AmortizationSchedule::calculate(&bad_principal),
            Err(AmortizationError::NonPositivePrincipal)
        );

        let bad_rate = LoanTerms::new(dec(100, 0), dec(-1, 0), 12);
        assert_eq!(
            AmortizationSchedule::calculate(&bad_rate),
            Err(AmortizationError::NegativeRate)
        );

        let bad_term = LoanTerms::new(dec(100, 0), dec(12, 0), 0);
        assert!(matches!(
            AmortizationSchedule::calculate(&bad_term),
            Err(AmortizationError::InvalidTerm { .. })
        ));
    }

    #[test]
    fn test_overflow_is_reported() {
        let terms = LoanTerms::new(dec(1_000, 0), dec(1_000, 0), MAX_TERM_MONTHS);
        assert_eq!(
            AmortizationSchedule::calculate(&terms),
            Err(AmortizationError::Overflow)
        );
    }
}
