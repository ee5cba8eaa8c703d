// 🏦 Amortization Engine - Fixed-rate mortgage math
// Monthly payment and a lazy, year-by-year amortization schedule.
//
// Following the standard annuity formula:
//   payment = P × r(1 + r)^n / ((1 + r)^n − 1)
// where r = annual rate / 100 / 12 and n = number of monthly payments.
//
// Inputs that cannot produce a payment yield 0 (or an empty schedule).
// Callers treat that as "not computable", never as a real zero payment.
// Terms longer than MAX_TERM_YEARS are not computable.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Longest amortization period accepted, in years
pub const MAX_TERM_YEARS: u32 = 100;

/// Longest amortization period accepted, in months
pub const MAX_TERM_MONTHS: u32 = MAX_TERM_YEARS * 12;

/// Months in `term_years`; anything past the maximum maps above MAX_TERM_MONTHS
fn term_months(term_years: u32) -> u32 {
    term_years.checked_mul(12).unwrap_or(u32::MAX)
}

// ============================================================================
// LOAN TERMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Annual rate as a percentage (6.0 = 6%)
    pub annual_interest_rate_percent: f64,

    /// Amortization period in years
    pub term_years: u32,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_interest_rate_percent: f64, term_years: u32) -> Self {
        LoanTerms {
            principal,
            annual_interest_rate_percent,
            term_years,
        }
    }

    pub fn total_months(&self) -> u64 {
        u64::from(self.term_years) * 12
    }

    pub fn monthly_payment(&self) -> f64 {
        monthly_payment(self.principal, self.annual_interest_rate_percent, self.term_years)
    }

    /// True when the terms produce a positive monthly payment
    pub fn is_computable(&self) -> bool {
        self.monthly_payment() > 0.0
    }

    pub fn schedule(&self) -> AmortizationSchedule {
        amortization_schedule(self.principal, self.annual_interest_rate_percent, self.term_years)
    }

    /// Interest paid over the full term (0 when not computable)
    pub fn total_interest(&self) -> f64 {
        let payment = self.monthly_payment();
        if payment <= 0.0 {
            return 0.0;
        }
        (payment * self.total_months() as f64 - self.principal).max(0.0)
    }
}

// ============================================================================
// MONTHLY PAYMENT
// ============================================================================

/// Fixed monthly payment for a loan amortized over `term_years`.
///
/// Returns 0 when principal <= 0, rate < 0, term is 0 or over
/// [`MAX_TERM_YEARS`], or the formula produces a non-finite value.
///
/// ```
/// use home_advisor::monthly_payment;
///
/// let payment = monthly_payment(400_000.0, 6.0, 30);
/// assert!((payment - 2398.20).abs() < 0.01);
/// ```
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    monthly_payment_for_months(principal, annual_rate_percent, term_months(term_years))
}

/// Same as [`monthly_payment`] but with the term expressed in months.
pub fn monthly_payment_for_months(principal: f64, annual_rate_percent: f64, months: u32) -> f64 {
    if principal.is_nan() || principal <= 0.0 {
        debug!(principal, "payment not computable: non-positive principal");
        return 0.0;
    }
    if annual_rate_percent.is_nan() || annual_rate_percent < 0.0 {
        debug!(annual_rate_percent, "payment not computable: negative rate");
        return 0.0;
    }
    if months == 0 {
        debug!("payment not computable: zero term");
        return 0.0;
    }
    if months > MAX_TERM_MONTHS {
        debug!(months, "payment not computable: term too long");
        return 0.0;
    }

    let n = months as f64;
    let monthly_rate = annual_rate_percent / 100.0 / 12.0;

    // Straight-line repayment; the annuity formula divides by zero here
    let payment = if monthly_rate == 0.0 {
        principal / n
    } else {
        let growth = (1.0 + monthly_rate).powf(n);
        principal * (monthly_rate * growth) / (growth - 1.0)
    };

    if payment.is_finite() {
        payment
    } else {
        debug!(principal, annual_rate_percent, months, "payment formula produced a non-finite value");
        0.0
    }
}

// ============================================================================
// AMORTIZATION SCHEDULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYearEntry {
    pub year: u32,
    pub cumulative_principal_paid: f64,
    pub cumulative_interest_paid: f64,
    pub remaining_balance: f64,
}

/// Lazy year-by-year schedule.
///
/// Simulates the loan month by month and yields one entry at the end of
/// every 12th month, plus one at the final month when the term is not a
/// whole number of years. Yields nothing when the payment is not computable.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    principal: f64,
    monthly_rate: f64,
    payment: f64,
    total_months: u32,
    month: u32,
    balance: f64,
    interest_paid: f64,
}

/// Year-by-year schedule for a loan of `term_years`.
pub fn amortization_schedule(
    principal: f64,
    annual_rate_percent: f64,
    term_years: u32,
) -> AmortizationSchedule {
    amortization_schedule_months(principal, annual_rate_percent, term_months(term_years))
}

/// Year-by-year schedule for a loan of `months` payments.
pub fn amortization_schedule_months(
    principal: f64,
    annual_rate_percent: f64,
    months: u32,
) -> AmortizationSchedule {
    let payment = monthly_payment_for_months(principal, annual_rate_percent, months);

    AmortizationSchedule {
        principal,
        monthly_rate: annual_rate_percent / 100.0 / 12.0,
        payment,
        // An un-computable loan has nothing to schedule
        total_months: if payment > 0.0 { months } else { 0 },
        month: 0,
        balance: principal,
        interest_paid: 0.0,
    }
}

impl AmortizationSchedule {
    /// Monthly payment the schedule is built on (0 when empty)
    pub fn monthly_payment(&self) -> f64 {
        self.payment
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationYearEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.month >= self.total_months {
            return None;
        }

        let year_end = (self.month / 12 + 1) * 12;
        let stop = year_end.min(self.total_months);

        while self.month < stop {
            self.month += 1;
            let interest = self.balance * self.monthly_rate;
            self.interest_paid += interest;
            self.balance -= self.payment - interest;
        }

        Some(AmortizationYearEntry {
            year: self.month.div_ceil(12),
            cumulative_principal_paid: self.principal - self.balance,
            cumulative_interest_paid: self.interest_paid,
            // Floating-point residue can leave the balance slightly negative
            remaining_balance: self.balance.max(0.0),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_months.div_ceil(12) - self.month.div_ceil(12)) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

// ============================================================================
// TESTS
// ============================================================================
