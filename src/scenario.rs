// 🧮 Scenario - One home-buyer profile through every calculator
// Evaluates a profile against an AdvisorConfig and compares two scenarios
// side by side. Re-run on every input change; nothing is cached.

use crate::affordability::{
    evaluate_affordability, max_affordable_price, price_to_income_ratio, AffordabilityInput,
    AffordabilityResult,
};
use crate::amortization::{AmortizationYearEntry, LoanTerms};
use crate::break_even::{estimate_break_even_years, BreakEvenAssumptions, BreakEvenResult};
use crate::config::AdvisorConfig;
use crate::ownership::{monthly_ownership_cost, OwnershipCostBreakdown};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PROFILE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanType {
    ThirtyYearFixed,
    FifteenYearFixed,
    /// Adjustable rate, amortized over 30 years at the initial rate
    Arm,
}

impl LoanType {
    pub fn term_years(&self) -> u32 {
        match self {
            LoanType::ThirtyYearFixed => 30,
            LoanType::FifteenYearFixed => 15,
            LoanType::Arm => 30,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanType::ThirtyYearFixed => "30-Year Fixed",
            LoanType::FifteenYearFixed => "15-Year Fixed",
            LoanType::Arm => "ARM",
        }
    }
}

impl fmt::Display for LoanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditScoreBand {
    Excellent,
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl CreditScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            CreditScoreBand::Excellent => "Excellent (780+)",
            CreditScoreBand::VeryGood => "Very Good (720-779)",
            CreditScoreBand::Good => "Good (660-719)",
            CreditScoreBand::Fair => "Fair (620-659)",
            CreditScoreBand::Poor => "Poor (<620)",
        }
    }

    pub fn from_score(score: u16) -> Self {
        match score {
            780.. => CreditScoreBand::Excellent,
            720..=779 => CreditScoreBand::VeryGood,
            660..=719 => CreditScoreBand::Good,
            620..=659 => CreditScoreBand::Fair,
            _ => CreditScoreBand::Poor,
        }
    }
}

impl fmt::Display for CreditScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeBuyerProfile {
    pub annual_income: f64,
    pub down_payment: f64,
    pub credit_score: CreditScoreBand,
    pub monthly_debt: f64,
    pub city: String,
    pub postal_code: String,
    pub loan_type: LoanType,
    pub target_home_price: f64,

    /// Used only by the advice oracle for commute analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_address: Option<String>,

    /// Overrides the configured rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate_percent: Option<f64>,

    /// Overrides the rent estimated from the configured gross yield
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_monthly_rent: Option<f64>,
}

impl Default for HomeBuyerProfile {
    fn default() -> Self {
        HomeBuyerProfile {
            annual_income: 100_000.0,
            down_payment: 50_000.0,
            credit_score: CreditScoreBand::Good,
            monthly_debt: 500.0,
            city: "Beverly Hills".to_string(),
            postal_code: "90210".to_string(),
            loan_type: LoanType::ThirtyYearFixed,
            target_home_price: 650_000.0,
            work_address: None,
            interest_rate_percent: None,
            estimated_monthly_rent: None,
        }
    }
}

impl HomeBuyerProfile {
    pub fn loan_terms(&self, config: &AdvisorConfig) -> LoanTerms {
        LoanTerms::new(
            (self.target_home_price.max(0.0) - self.down_payment.max(0.0)).max(0.0),
            self.interest_rate_percent.unwrap_or(config.assumed_rate_percent),
            self.loan_type.term_years(),
        )
    }

    pub fn affordability_input(&self, config: &AdvisorConfig) -> AffordabilityInput {
        AffordabilityInput {
            gross_annual_income: self.annual_income,
            monthly_non_housing_debt: self.monthly_debt,
            down_payment: self.down_payment,
            target_home_price: self.target_home_price,
            estimated_annual_property_tax_rate: config.ownership.annual_property_tax_rate,
            estimated_monthly_heating: config.estimated_monthly_heating,
        }
    }

    pub fn break_even_assumptions(&self, config: &AdvisorConfig) -> BreakEvenAssumptions {
        let rent = self.estimated_monthly_rent.unwrap_or(
            self.target_home_price.max(0.0) * config.gross_rent_yield_percent / 100.0 / 12.0,
        );

        BreakEvenAssumptions::new(
            rent,
            config.appreciation_rate_percent,
            config.rent_increase_rate_percent,
            config.buying_cost_percent,
            config.selling_cost_percent,
        )
        .with_home_price(self.target_home_price)
        .with_investment_return(config.investment_return_rate_percent)
        .with_ownership(config.ownership.clone())
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub profile: HomeBuyerProfile,
    pub loan: LoanTerms,
    pub monthly_payment: f64,
    pub schedule: Vec<AmortizationYearEntry>,
    pub affordability: AffordabilityResult,
    pub max_affordable_price: f64,
    pub price_to_income_ratio: f64,
    pub ownership_cost: OwnershipCostBreakdown,
    pub break_even_assumptions: BreakEvenAssumptions,
    pub break_even: BreakEvenResult,
    pub tds_limit_percent: f64,
}

impl ScenarioReport {
    pub fn evaluate(profile: &HomeBuyerProfile, config: &AdvisorConfig) -> Self {
        let loan = profile.loan_terms(config);
        let rate = loan.annual_interest_rate_percent;
        let term = loan.term_years;

        let input = profile.affordability_input(config);
        let affordability = evaluate_affordability(&input, rate, term);
        let max_price = max_affordable_price(&input, rate, term, config.tds_limit_percent);

        let break_even_assumptions = profile.break_even_assumptions(config);
        let break_even =
            estimate_break_even_years(&loan, &break_even_assumptions, config.max_break_even_years);

        ScenarioReport {
            profile: profile.clone(),
            loan,
            monthly_payment: loan.monthly_payment(),
            schedule: loan.schedule().collect(),
            affordability,
            max_affordable_price: max_price,
            price_to_income_ratio: price_to_income_ratio(
                profile.target_home_price,
                profile.annual_income,
            ),
            ownership_cost: monthly_ownership_cost(
                profile.target_home_price,
                &loan,
                &config.ownership,
            ),
            break_even_assumptions,
            break_even,
            tds_limit_percent: config.tds_limit_percent,
        }
    }

    /// TDS within the lender limit the report was built with
    pub fn is_affordable(&self) -> bool {
        self.affordability.within_tds_limit(self.tds_limit_percent)
    }

    pub fn label(&self) -> String {
        format!("{} (${:.0})", self.profile.city, self.profile.target_home_price)
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: payment ${:.2}/mo, total cost ${:.2}/mo, TDS {:.1}% (limit {:.0}%), max price ${:.0}, {}",
            self.label(),
            self.monthly_payment,
            self.ownership_cost.total_monthly_cost,
            self.affordability.total_debt_service_ratio_percent,
            self.tds_limit_percent,
            self.max_affordable_price,
            self.break_even.summary()
        )
    }
}

// ============================================================================
// COMPARISON
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Better {
    First,
    Second,
    Neither,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub first: f64,
    pub second: f64,
    pub better: Better,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub first_label: String,
    pub second_label: String,
    pub rows: Vec<ComparisonRow>,
}

impl ScenarioComparison {
    /// Number of rows won by (first, second)
    pub fn wins(&self) -> (usize, usize) {
        self.rows.iter().fold((0, 0), |(a, b), row| match row.better {
            Better::First => (a + 1, b),
            Better::Second => (a, b + 1),
            Better::Neither => (a, b),
        })
    }
}

const TIE_EPSILON: f64 = 1e-9;

fn lower_wins(first: f64, second: f64) -> Better {
    if (first - second).abs() < TIE_EPSILON {
        Better::Neither
    } else if first < second {
        Better::First
    } else {
        Better::Second
    }
}

fn higher_wins(first: f64, second: f64) -> Better {
    lower_wins(-first, -second)
}

fn row(label: &str, first: f64, second: f64, better: Better) -> ComparisonRow {
    ComparisonRow {
        label: label.to_string(),
        first,
        second,
        better,
    }
}

pub fn compare(first: &ScenarioReport, second: &ScenarioReport) -> ScenarioComparison {
    // A capped break-even is worse than any real crossover
    let break_even_better = match (first.break_even.found, second.break_even.found) {
        (true, true) => lower_wins(
            first.break_even.break_even_years,
            second.break_even.break_even_years,
        ),
        (true, false) => Better::First,
        (false, true) => Better::Second,
        (false, false) => Better::Neither,
    };

    let rows = vec![
        row(
            "Target Price",
            first.profile.target_home_price,
            second.profile.target_home_price,
            Better::Neither,
        ),
        row(
            "Monthly Payment",
            first.monthly_payment,
            second.monthly_payment,
            lower_wins(first.monthly_payment, second.monthly_payment),
        ),
        row(
            "Total Monthly Cost",
            first.ownership_cost.total_monthly_cost,
            second.ownership_cost.total_monthly_cost,
            lower_wins(
                first.ownership_cost.total_monthly_cost,
                second.ownership_cost.total_monthly_cost,
            ),
        ),
        row(
            "TDS Ratio (%)",
            first.affordability.total_debt_service_ratio_percent,
            second.affordability.total_debt_service_ratio_percent,
            lower_wins(
                first.affordability.total_debt_service_ratio_percent,
                second.affordability.total_debt_service_ratio_percent,
            ),
        ),
        row(
            "Max Affordable Price",
            first.max_affordable_price,
            second.max_affordable_price,
            higher_wins(first.max_affordable_price, second.max_affordable_price),
        ),
        row(
            "Price-to-Income",
            first.price_to_income_ratio,
            second.price_to_income_ratio,
            lower_wins(first.price_to_income_ratio, second.price_to_income_ratio),
        ),
        row(
            "Break-Even (years)",
            first.break_even.break_even_years,
            second.break_even.break_even_years,
            break_even_better,
        ),
    ];

    ScenarioComparison {
        first_label: first.label(),
        second_label: second.label(),
        rows,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_default_profile() {
        let config = AdvisorConfig::default();
        let profile = HomeBuyerProfile::default();
        let report = ScenarioReport::evaluate(&profile, &config);

        assert_eq!(report.loan.principal, 600_000.0);
        assert_eq!(report.loan.term_years, 30);
        assert_eq!(report.loan.annual_interest_rate_percent, 5.5);
        assert_eq!(report.schedule.len(), 30);
        assert_eq!(report.monthly_payment, report.affordability.monthly_mortgage_payment);
        assert_eq!(report.ownership_cost.principal_and_interest, report.monthly_payment);
        assert_eq!(report.price_to_income_ratio, 6.5);

        // 650k on 100k income with 500 of debt is well over 44%
        assert!(report.affordability.total_debt_service_ratio_percent > 44.0);
        assert!(!report.is_affordable());
        assert!(report.max_affordable_price < profile.target_home_price);

        println!("✅ {}", report.summary());
    }

    #[test]
    fn test_profile_overrides() {
        let config = AdvisorConfig::default();
        let profile = HomeBuyerProfile {
            loan_type: LoanType::FifteenYearFixed,
            interest_rate_percent: Some(4.0),
            estimated_monthly_rent: Some(1_800.0),
            ..HomeBuyerProfile::default()
        };
        let report = ScenarioReport::evaluate(&profile, &config);

        assert_eq!(report.loan.term_years, 15);
        assert_eq!(report.loan.annual_interest_rate_percent, 4.0);
        assert_eq!(report.schedule.len(), 15);
        assert_eq!(report.break_even_assumptions.estimated_monthly_rent, 1_800.0);
    }

    #[test]
    fn test_rent_estimated_from_yield() {
        let config = AdvisorConfig::default();
        let assumptions = HomeBuyerProfile::default().break_even_assumptions(&config);

        // 650k × 4.5% / 12
        assert!((assumptions.estimated_monthly_rent - 2_437.5).abs() < 1e-9);
        assert_eq!(assumptions.home_price, 650_000.0);
    }

    #[test]
    fn test_compare_cheaper_home_wins() {
        let config = AdvisorConfig::default();
        let pricey = ScenarioReport::evaluate(&HomeBuyerProfile::default(), &config);
        let modest = ScenarioReport::evaluate(
            &HomeBuyerProfile {
                city: "Riverside".to_string(),
                target_home_price: 400_000.0,
                ..HomeBuyerProfile::default()
            },
            &config,
        );

        let comparison = compare(&pricey, &modest);
        assert_eq!(comparison.rows.len(), 7);
        assert_eq!(comparison.second_label, "Riverside ($400000)");

        let by_label = |label: &str| {
            comparison
                .rows
                .iter()
                .find(|r| r.label == label)
                .map(|r| r.better)
                .unwrap()
        };
        assert_eq!(by_label("Target Price"), Better::Neither);
        assert_eq!(by_label("Monthly Payment"), Better::Second);
        assert_eq!(by_label("TDS Ratio (%)"), Better::Second);
        assert_eq!(by_label("Price-to-Income"), Better::Second);
        // Same income, debt and down payment: same ceiling
        assert_eq!(by_label("Max Affordable Price"), Better::Neither);

        let (first_wins, second_wins) = comparison.wins();
        assert!(second_wins > first_wins);
    }

    #[test]
    fn test_credit_bands() {
        assert_eq!(CreditScoreBand::from_score(800), CreditScoreBand::Excellent);
        assert_eq!(CreditScoreBand::from_score(720), CreditScoreBand::VeryGood);
        assert_eq!(CreditScoreBand::from_score(700), CreditScoreBand::Good);
        assert_eq!(CreditScoreBand::from_score(640), CreditScoreBand::Fair);
        assert_eq!(CreditScoreBand::from_score(500), CreditScoreBand::Poor);
        assert_eq!(CreditScoreBand::Good.to_string(), "Good (660-719)");
    }

    #[test]
    fn test_profile_json() {
        let json = r#"{
            "annual_income": 90000,
            "down_payment": 60000,
            "credit_score": "very_good",
            "monthly_debt": 250,
            "city": "Austin",
            "postal_code": "78701",
            "loan_type": "fifteen_year_fixed",
            "target_home_price": 450000
        }"#;
        let profile: HomeBuyerProfile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.loan_type, LoanType::FifteenYearFixed);
        assert_eq!(profile.credit_score, CreditScoreBand::VeryGood);
        assert_eq!(profile.work_address, None);
        assert_eq!(profile.interest_rate_percent, None);
    }
}
