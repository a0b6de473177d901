//! Loan amortization table.
//!
//! # Usage
//!
//! ```bash
//! prestamos amortize --principal 10000 --rate 12 --months 12 --start 2026-01-31
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use prestamos_core::{AmortizationSchedule, Amount, CurrencyCode, LoanTerms};

use super::{CommandError, print_lines};

/// Print the schedule for the given terms.
pub fn run(
    principal: Decimal,
    rate: Decimal,
    months: u32,
    start: Option<NaiveDate>,
    currency: &str,
) -> Result<(), CommandError> {
    let currency: CurrencyCode = currency.parse()?;
    let mut terms = LoanTerms::new(principal, rate, months).with_currency(currency);
    if let Some(start) = start {
        terms = terms.with_first_due(start);
    }

    let schedule = AmortizationSchedule::calculate(&terms)?;
    print_lines(&render(&schedule));
    Ok(())
}

fn render(schedule: &AmortizationSchedule) -> Vec<String> {
    let currency = schedule.terms().currency;
    let amount = |value: Decimal| Amount::new(value, currency).to_string();

    let mut lines = Vec::with_capacity(schedule.rows().len() + 4);
    lines.push(format!(
        "{:>4}  {:<10}  {:>16}  {:>16}  {:>16}  {:>16}",
        "#", "due", "payment", "interest", "principal", "balance"
    ));
    for row in schedule.rows() {
        let due = row
            .due_date
            .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string());
        lines.push(format!(
            "{:>4}  {:<10}  {:>16}  {:>16}  {:>16}  {:>16}",
            row.period,
            due,
            amount(row.payment),
            amount(row.interest),
            amount(row.principal),
            amount(row.balance),
        ));
    }
    lines.push(String::new());
    lines.push(format!("Monthly payment: {}", amount(schedule.payment())));
    lines.push(format!(
        "Total paid: {}  Total interest: {}",
        amount(schedule.total_paid()),
        amount(schedule.total_interest())
    ));
    lines
}
