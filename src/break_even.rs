// ⚖️ Break-Even Estimator - Buy vs. rent crossover year
//
// Owning, cumulative to the end of year t:
//   buying costs (once, year 1)
//   + mortgage payments made
//   + taxes, insurance, maintenance on the purchase price
//   + opportunity cost of the down payment at the investment return rate
//   + selling costs on the appreciated value at t
//   − equity from principal paydown
//   − appreciation (value at t − purchase price)
//
// Renting, cumulative: rent, growing once a year by the rent increase rate.
// Utilities are paid either way, so neither side counts them.
// The renting side carries no investment modelling; the foregone return on
// the down payment is charged to owning instead (0% by default).
//
// No crossover within the search horizon reports found = false with the
// horizon as a capped year count.

use crate::amortization::LoanTerms;
use crate::ownership::OwnershipAssumptions;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// ASSUMPTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenAssumptions {
    /// Rent for a comparable property
    pub estimated_monthly_rent: f64,
    pub annual_appreciation_rate_percent: f64,
    pub annual_rent_increase_rate_percent: f64,

    /// One-time closing costs
    pub buying_cost_percent_of_price: f64,

    /// Realtor fees etc. on a sale at the end of the horizon
    pub selling_cost_percent_of_price: f64,

    /// Purchase price; 0 means "the loan principal is the price"
    #[serde(default)]
    pub home_price: f64,

    /// Return the down payment would have earned if invested (0 = ignore)
    #[serde(default)]
    pub investment_return_rate_percent: f64,

    #[serde(default)]
    pub ownership: OwnershipAssumptions,
}

impl BreakEvenAssumptions {
    pub fn new(
        estimated_monthly_rent: f64,
        annual_appreciation_rate_percent: f64,
        annual_rent_increase_rate_percent: f64,
        buying_cost_percent_of_price: f64,
        selling_cost_percent_of_price: f64,
    ) -> Self {
        BreakEvenAssumptions {
            estimated_monthly_rent,
            annual_appreciation_rate_percent,
            annual_rent_increase_rate_percent,
            buying_cost_percent_of_price,
            selling_cost_percent_of_price,
            home_price: 0.0,
            investment_return_rate_percent: 0.0,
            ownership: OwnershipAssumptions::default(),
        }
    }

    pub fn with_home_price(mut self, home_price: f64) -> Self {
        self.home_price = home_price;
        self
    }

    pub fn with_investment_return(mut self, rate_percent: f64) -> Self {
        self.investment_return_rate_percent = rate_percent;
        self
    }

    pub fn with_ownership(mut self, ownership: OwnershipAssumptions) -> Self {
        self.ownership = ownership;
        self
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenYear {
    pub year: u32,
    pub cumulative_owning_cost: f64,
    pub cumulative_renting_cost: f64,
}

impl BreakEvenYear {
    /// Positive when owning has been cheaper so far
    pub fn owning_advantage(&self) -> f64 {
        self.cumulative_renting_cost - self.cumulative_owning_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    /// Crossover year, or the search horizon when `found` is false
    pub break_even_years: f64,
    pub found: bool,
    pub yearly: Vec<BreakEvenYear>,
}

impl BreakEvenResult {
    fn not_found(max_years: u32, yearly: Vec<BreakEvenYear>) -> Self {
        BreakEvenResult {
            break_even_years: max_years as f64,
            found: false,
            yearly,
        }
    }

    pub fn summary(&self) -> String {
        if self.found {
            format!("Buying beats renting after {:.1} years", self.break_even_years)
        } else {
            format!(
                "Renting stays cheaper for at least {:.0} years",
                self.break_even_years
            )
        }
    }
}

// ============================================================================
// ESTIMATION
// ============================================================================

/// Longest search horizon the CLI, server and config accept, in years
pub const MAX_BREAK_EVEN_YEARS: u32 = 100;

pub fn estimate_break_even_years(
    loan: &LoanTerms,
    assumptions: &BreakEvenAssumptions,
    max_years_to_search: u32,
) -> BreakEvenResult {
    if max_years_to_search == 0 {
        return BreakEvenResult::not_found(0, Vec::new());
    }

    let principal = loan.principal.max(0.0);
    if principal > 0.0 && !loan.is_computable() {
        debug!(?loan, "loan terms not computable, no break-even");
        return BreakEvenResult::not_found(max_years_to_search, Vec::new());
    }

    let price = if assumptions.home_price > 0.0 {
        assumptions.home_price
    } else {
        principal
    };
    let down_payment = (price - principal).max(0.0);

    let appreciation = assumptions.annual_appreciation_rate_percent / 100.0;
    let rent_growth = assumptions.annual_rent_increase_rate_percent / 100.0;
    let investment_return = assumptions.investment_return_rate_percent / 100.0;

    let buying_cost = price * assumptions.buying_cost_percent_of_price / 100.0;
    let annual_holding_cost = assumptions.ownership.monthly_holding_cost(price) * 12.0;
    let schedule: Vec<_> = loan.schedule().collect();

    let mut yearly = Vec::new();
    let mut crossover = None;
    let mut renting_cost = 0.0;
    let mut annual_rent = assumptions.estimated_monthly_rent.max(0.0) * 12.0;

    for year in 1..=max_years_to_search {
        let t = year as i32;

        // Past the loan term the last entry holds the lifetime totals
        let (principal_paid, interest_paid) = schedule
            .get((year as usize).min(schedule.len()).saturating_sub(1))
            .map(|e| (e.cumulative_principal_paid, e.cumulative_interest_paid))
            .unwrap_or((0.0, 0.0));
        let mortgage_paid = principal_paid + interest_paid;

        let value = price * (1.0 + appreciation).powi(t);
        let opportunity_cost = down_payment * ((1.0 + investment_return).powi(t) - 1.0);
        let selling_cost = value * assumptions.selling_cost_percent_of_price / 100.0;

        let owning_cost = buying_cost
            + mortgage_paid
            + annual_holding_cost * year as f64
            + opportunity_cost
            + selling_cost
            - principal_paid
            - (value - price);

        renting_cost += annual_rent;
        annual_rent *= 1.0 + rent_growth;

        if crossover.is_none() && owning_cost < renting_cost {
            crossover = Some(year);
        }

        yearly.push(BreakEvenYear {
            year,
            cumulative_owning_cost: owning_cost,
            cumulative_renting_cost: renting_cost,
        });
    }

    match crossover {
        Some(year) => BreakEvenResult {
            break_even_years: year as f64,
            found: true,
            yearly,
        },
        None => BreakEvenResult::not_found(max_years_to_search, yearly),
    }
}

// ============================================================================
// TESTS
// ============================================================================
