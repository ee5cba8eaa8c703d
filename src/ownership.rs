// 🏠 Ownership Cost - Monthly total cost of owning a home
// Breaks the monthly bill into principal & interest, taxes, insurance,
// utilities and a maintenance reserve.

use crate::amortization::LoanTerms;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnershipAssumptions {
    /// Annual property tax as a fraction of the price (0.01 = 1%)
    pub annual_property_tax_rate: f64,

    /// Homeowner's insurance per year, percent of the price
    pub annual_insurance_rate_percent: f64,

    /// Maintenance reserve per year, percent of the price (rule of thumb: 1%)
    pub annual_maintenance_rate_percent: f64,

    /// Water, gas, electric
    pub monthly_utilities: f64,
}

impl Default for OwnershipAssumptions {
    fn default() -> Self {
        OwnershipAssumptions {
            annual_property_tax_rate: 0.01,
            annual_insurance_rate_percent: 0.35,
            annual_maintenance_rate_percent: 1.0,
            monthly_utilities: 250.0,
        }
    }
}

impl OwnershipAssumptions {
    /// Taxes, insurance and maintenance: the costs a renter does not also pay
    pub fn monthly_holding_cost(&self, home_price: f64) -> f64 {
        let price = home_price.max(0.0);
        price * self.annual_property_tax_rate / 12.0
            + price * self.annual_insurance_rate_percent / 100.0 / 12.0
            + price * self.annual_maintenance_rate_percent / 100.0 / 12.0
    }

    /// Monthly costs that do not depend on the loan
    pub fn monthly_carrying_cost(&self, home_price: f64) -> f64 {
        self.monthly_holding_cost(home_price) + self.monthly_utilities
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipCostBreakdown {
    pub principal_and_interest: f64,
    pub taxes: f64,
    pub insurance: f64,
    pub utilities: f64,
    pub maintenance: f64,
    pub total_monthly_cost: f64,
}

impl OwnershipCostBreakdown {
    /// (label, amount) pairs in display order
    pub fn items(&self) -> [(&'static str, f64); 5] {
        [
            ("Principal & Interest", self.principal_and_interest),
            ("Taxes", self.taxes),
            ("Insurance", self.insurance),
            ("Utilities", self.utilities),
            ("Maintenance", self.maintenance),
        ]
    }

    /// Share of the total for each item, 0 when the total is 0
    pub fn shares(&self) -> [(&'static str, f64); 5] {
        let total = self.total_monthly_cost;
        self.items().map(|(label, amount)| {
            let share = if total > 0.0 { amount / total } else { 0.0 };
            (label, share)
        })
    }
}

pub fn monthly_ownership_cost(
    home_price: f64,
    loan: &LoanTerms,
    assumptions: &OwnershipAssumptions,
) -> OwnershipCostBreakdown {
    let price = home_price.max(0.0);

    let principal_and_interest = loan.monthly_payment();
    let taxes = price * assumptions.annual_property_tax_rate / 12.0;
    let insurance = price * assumptions.annual_insurance_rate_percent / 100.0 / 12.0;
    let maintenance = price * assumptions.annual_maintenance_rate_percent / 100.0 / 12.0;
    let utilities = assumptions.monthly_utilities;

    OwnershipCostBreakdown {
        principal_and_interest,
        taxes,
        insurance,
        utilities,
        maintenance,
        total_monthly_cost: principal_and_interest + taxes + insurance + utilities + maintenance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakdown_sums_to_total() {
        let loan = LoanTerms::new(400_000.0, 6.0, 30);
        let cost = monthly_ownership_cost(500_000.0, &loan, &OwnershipAssumptions::default());

        let sum: f64 = cost.items().iter().map(|(_, amount)| amount).sum();
        assert!((cost.total_monthly_cost - sum).abs() < 1e-9);
        assert!((cost.taxes - 416.67).abs() < 0.01);
        assert!((cost.maintenance - 416.67).abs() < 0.01);
        assert!((cost.insurance - 145.83).abs() < 0.01);
        assert_eq!(cost.utilities, 250.0);
    }

    #[test]
    fn test_carrying_cost_matches_breakdown() {
        let assumptions = OwnershipAssumptions::default();
        let loan = LoanTerms::new(300_000.0, 5.0, 25);
        let cost = monthly_ownership_cost(360_000.0, &loan, &assumptions);

        let carrying = assumptions.monthly_carrying_cost(360_000.0);
        assert!((cost.total_monthly_cost - cost.principal_and_interest - carrying).abs() < 1e-9);

        let holding = assumptions.monthly_holding_cost(360_000.0);
        assert!((holding - (cost.taxes + cost.insurance + cost.maintenance)).abs() < 1e-9);
    }

    #[test]
    fn test_shares() {
        let loan = LoanTerms::new(0.0, 5.0, 25);
        let assumptions = OwnershipAssumptions {
            annual_property_tax_rate: 0.0,
            annual_insurance_rate_percent: 0.0,
            annual_maintenance_rate_percent: 0.0,
            monthly_utilities: 0.0,
        };
        let empty = monthly_ownership_cost(0.0, &loan, &assumptions);
        assert!(empty.shares().iter().all(|(_, share)| *share == 0.0));

        let loan = LoanTerms::new(200_000.0, 5.0, 25);
        let cost = monthly_ownership_cost(250_000.0, &loan, &OwnershipAssumptions::default());
        let total_share: f64 = cost.shares().iter().map(|(_, share)| share).sum();
        assert!((total_share - 1.0).abs() < 1e-9);
    }
}
