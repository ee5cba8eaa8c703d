// Home Advisor - Core Library
// Mortgage, affordability and buy-vs-rent calculators used by the CLI,
// the API server, and tests

pub mod amortization;
pub mod affordability;
pub mod ownership;
pub mod break_even;
pub mod config;
pub mod scenario;
pub mod advice;
pub mod export;

// Re-export commonly used types
pub use amortization::{
    LoanTerms, AmortizationYearEntry, AmortizationSchedule, MAX_TERM_YEARS, MAX_TERM_MONTHS,
    monthly_payment, monthly_payment_for_months,
    amortization_schedule, amortization_schedule_months,
};
pub use affordability::{
    AffordabilityInput, AffordabilityResult,
    evaluate_affordability, max_affordable_price, price_to_income_ratio,
};
pub use ownership::{
    OwnershipAssumptions, OwnershipCostBreakdown, monthly_ownership_cost,
};
pub use break_even::{
    BreakEvenAssumptions, BreakEvenResult, BreakEvenYear, estimate_break_even_years,
    MAX_BREAK_EVEN_YEARS,
};
pub use config::AdvisorConfig;
pub use scenario::{
    HomeBuyerProfile, LoanType, CreditScoreBand,
    ScenarioReport, ScenarioComparison, ComparisonRow, Better, compare,
};
pub use advice::{
    AdviceOracle, AdviceRequest, AdviceDocument, Recommendation,
    Analysis, AdvisorService,
};
pub use export::{write_schedule_csv, write_break_even_csv, schedule_to_csv_string};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
