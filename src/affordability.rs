// 📐 Affordability Evaluator - PITH and debt service ratios
//
//   PITH = mortgage (P+I) + property tax + heating
//   GDS  = 100 × PITH / gross monthly income
//   TDS  = 100 × (PITH + other monthly debt) / gross monthly income
//
// A zero or negative income reports ratios of 0. That is "insufficient
// data", not an affordable home. Negative down payments, prices and tax
// rates count as 0 in every calculation here.

use crate::amortization::monthly_payment;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// INPUT / RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub gross_annual_income: f64,
    pub monthly_non_housing_debt: f64,
    pub down_payment: f64,
    pub target_home_price: f64,

    /// Annual property tax as a fraction of the price (0.01 = 1%)
    pub estimated_annual_property_tax_rate: f64,

    pub estimated_monthly_heating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// Principal + interest + taxes + heating
    pub monthly_housing_payment: f64,
    pub total_debt_service_ratio_percent: f64,
    pub gross_debt_service_ratio_percent: f64,
    pub loan_principal: f64,
    pub monthly_mortgage_payment: f64,
    pub monthly_property_tax: f64,
}

impl AffordabilityInput {
    fn clamped_down_payment(&self) -> f64 {
        self.down_payment.max(0.0)
    }

    fn clamped_home_price(&self) -> f64 {
        self.target_home_price.max(0.0)
    }

    fn clamped_tax_rate(&self) -> f64 {
        self.estimated_annual_property_tax_rate.max(0.0)
    }
}

impl AffordabilityResult {
    /// Whether TDS stays at or under the given limit. A 0% ratio from
    /// missing income never passes.
    pub fn within_tds_limit(&self, tds_limit_percent: f64) -> bool {
        self.total_debt_service_ratio_percent > 0.0
            && self.total_debt_service_ratio_percent <= tds_limit_percent
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Derive PITH and the debt service ratios for one target price.
pub fn evaluate_affordability(
    input: &AffordabilityInput,
    assumed_annual_rate_percent: f64,
    amortization_years: u32,
) -> AffordabilityResult {
    let price = input.clamped_home_price();
    let loan_principal = (price - input.clamped_down_payment()).max(0.0);
    let monthly_mortgage_payment =
        monthly_payment(loan_principal, assumed_annual_rate_percent, amortization_years);
    let monthly_property_tax = price * input.clamped_tax_rate() / 12.0;
    let monthly_housing_payment =
        monthly_mortgage_payment + monthly_property_tax + input.estimated_monthly_heating;

    let (gds, tds) = if input.gross_annual_income > 0.0 {
        let monthly_income = input.gross_annual_income / 12.0;
        (
            100.0 * monthly_housing_payment / monthly_income,
            100.0 * (monthly_housing_payment + input.monthly_non_housing_debt) / monthly_income,
        )
    } else {
        debug!(income = input.gross_annual_income, "no income, reporting 0% ratios");
        (0.0, 0.0)
    };

    AffordabilityResult {
        monthly_housing_payment,
        total_debt_service_ratio_percent: tds,
        gross_debt_service_ratio_percent: gds,
        loan_principal,
        monthly_mortgage_payment,
        monthly_property_tax,
    }
}

/// Highest home price whose PITH plus other debt keeps TDS at
/// `tds_limit_percent`, holding down payment, tax rate and heating fixed.
///
/// The mortgage payment is linear in the principal, so the price solves
/// `(price − down) × f + price × t / 12 = budget` where `f` is the payment
/// per dollar borrowed. Below the down payment only taxes apply.
///
/// Returns 0 when income is missing, the budget does not cover existing debt
/// and heating, or the loan terms are not computable.
pub fn max_affordable_price(
    input: &AffordabilityInput,
    assumed_annual_rate_percent: f64,
    amortization_years: u32,
    tds_limit_percent: f64,
) -> f64 {
    if input.gross_annual_income <= 0.0 || tds_limit_percent <= 0.0 {
        return 0.0;
    }

    let monthly_income = input.gross_annual_income / 12.0;
    let housing_budget = monthly_income * tds_limit_percent / 100.0
        - input.monthly_non_housing_debt
        - input.estimated_monthly_heating;
    if housing_budget <= 0.0 {
        debug!(housing_budget, "debt and heating exhaust the TDS budget");
        return 0.0;
    }

    let per_dollar = monthly_payment(1.0, assumed_annual_rate_percent, amortization_years);
    if per_dollar <= 0.0 {
        return 0.0;
    }

    let monthly_tax_rate = input.clamped_tax_rate() / 12.0;
    let down = input.clamped_down_payment();
    let price = (housing_budget + down * per_dollar) / (per_dollar + monthly_tax_rate);

    if price >= down {
        price
    } else {
        // Cannot happen with a zero tax rate: heating alone fits the budget
        housing_budget / monthly_tax_rate
    }
}

/// Target price over gross annual income (0 when income is missing)
pub fn price_to_income_ratio(target_home_price: f64, gross_annual_income: f64) -> f64 {
    if gross_annual_income <= 0.0 {
        return 0.0;
    }
    target_home_price / gross_annual_income
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> AffordabilityInput {
        AffordabilityInput {
            gross_annual_income: 120_000.0,
            monthly_non_housing_debt: 500.0,
            down_payment: 100_000.0,
            target_home_price: 500_000.0,
            estimated_annual_property_tax_rate: 0.01,
            estimated_monthly_heating: 100.0,
        }
    }

    #[test]
    fn test_pith_components() {
        let result = evaluate_affordability(&sample_input(), 6.0, 30);

        assert_eq!(result.loan_principal, 400_000.0);
        assert!((result.monthly_mortgage_payment - 2398.20).abs() < 0.01);
        assert!((result.monthly_property_tax - 416.67).abs() < 0.01);
        assert!((result.monthly_housing_payment - (2398.20 + 416.67 + 100.0)).abs() < 0.02);
    }

    #[test]
    fn test_tds_matches_definition() {
        let input = sample_input();
        let result = evaluate_affordability(&input, 6.0, 30);
        let expected = 100.0 * (result.monthly_housing_payment + 500.0) / 10_000.0;

        assert!((result.total_debt_service_ratio_percent - expected).abs() < 1e-9);
        assert!(
            (result.gross_debt_service_ratio_percent
                - 100.0 * result.monthly_housing_payment / 10_000.0)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_tds_linear_in_debt() {
        let base = sample_input();
        let mut more_debt = sample_input();
        more_debt.monthly_non_housing_debt += 100.0;

        let a = evaluate_affordability(&base, 6.0, 30);
        let b = evaluate_affordability(&more_debt, 6.0, 30);
        let step = 100.0 * 100.0 / (base.gross_annual_income / 12.0);

        assert!((b.total_debt_service_ratio_percent - a.total_debt_service_ratio_percent - step).abs() < 1e-9);
    }

    #[test]
    fn test_zero_income_reports_zero_ratio() {
        let mut input = sample_input();
        input.gross_annual_income = 0.0;

        let result = evaluate_affordability(&input, 6.0, 30);
        assert_eq!(result.total_debt_service_ratio_percent, 0.0);
        assert_eq!(result.gross_debt_service_ratio_percent, 0.0);
        assert!(result.monthly_housing_payment > 0.0);
        assert!(!result.within_tds_limit(44.0));
    }

    #[test]
    fn test_down_payment_covers_price() {
        let mut input = sample_input();
        input.down_payment = 600_000.0;

        let result = evaluate_affordability(&input, 6.0, 30);
        assert_eq!(result.loan_principal, 0.0);
        assert_eq!(result.monthly_mortgage_payment, 0.0);
        assert!((result.monthly_housing_payment - (416.67 + 100.0)).abs() < 0.01);
    }

    #[test]
    fn test_max_price_hits_tds_limit() {
        let input = sample_input();
        let max_price = max_affordable_price(&input, 5.0, 25, 44.0);
        assert!(max_price > input.down_payment);

        let mut at_limit = input.clone();
        at_limit.target_home_price = max_price;
        let result = evaluate_affordability(&at_limit, 5.0, 25);

        assert!((result.total_debt_service_ratio_percent - 44.0).abs() < 1e-6);
        assert!(result.within_tds_limit(44.0 + 1e-6));
    }

    #[test]
    fn test_max_price_below_down_payment() {
        // Tiny income: only a tax-limited, loan-free price fits
        let input = AffordabilityInput {
            gross_annual_income: 12_000.0,
            monthly_non_housing_debt: 0.0,
            down_payment: 1_000_000.0,
            target_home_price: 0.0,
            estimated_annual_property_tax_rate: 0.012,
            estimated_monthly_heating: 40.0,
        };
        let max_price = max_affordable_price(&input, 5.0, 25, 44.0);

        // budget = 440 − 40 = 400 per month of tax => 400 × 12 / 0.012
        assert!((max_price - 400_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_max_price_degenerate_cases() {
        let mut input = sample_input();
        input.gross_annual_income = 0.0;
        assert_eq!(max_affordable_price(&input, 5.0, 25, 44.0), 0.0);

        let mut buried = sample_input();
        buried.monthly_non_housing_debt = 10_000.0;
        assert_eq!(max_affordable_price(&buried, 5.0, 25, 44.0), 0.0);

        assert_eq!(max_affordable_price(&sample_input(), 5.0, 0, 44.0), 0.0);
    }

    #[test]
    fn test_negative_inputs_clamped_consistently() {
        let input = AffordabilityInput {
            gross_annual_income: 120_000.0,
            monthly_non_housing_debt: 500.0,
            down_payment: -50_000.0,
            target_home_price: 0.0,
            estimated_annual_property_tax_rate: -0.01,
            estimated_monthly_heating: 100.0,
        };
        let max_price = max_affordable_price(&input, 5.0, 25, 44.0);
        assert!(max_price > 0.0);

        let at_max = AffordabilityInput {
            target_home_price: max_price,
            ..input
        };
        let result = evaluate_affordability(&at_max, 5.0, 25);
        assert!((result.total_debt_service_ratio_percent - 44.0).abs() < 1e-6);
        assert_eq!(result.loan_principal, max_price);
        assert_eq!(result.monthly_property_tax, 0.0);
    }

    #[test]
    fn test_price_to_income() {
        assert_eq!(price_to_income_ratio(650_000.0, 100_000.0), 6.5);
        assert_eq!(price_to_income_ratio(650_000.0, 0.0), 0.0);
    }
}
