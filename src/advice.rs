// 🤖 Advice Oracle - Narrow interface to an external advice generator
//
// The oracle is a black box: it receives the structured facts computed
// here and returns a structured advice document. No judgment is computed
// locally; implementations live outside this crate and tests mock them.

use crate::config::AdvisorConfig;
use crate::scenario::{CreditScoreBand, HomeBuyerProfile, LoanType, ScenarioReport};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// REQUEST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub city: String,
    pub postal_code: String,
    pub credit_score: CreditScoreBand,
    pub loan_type: LoanType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_address: Option<String>,

    pub annual_income: f64,
    pub down_payment: f64,
    pub monthly_debt: f64,
    pub target_home_price: f64,

    pub interest_rate_percent: f64,
    pub monthly_payment: f64,
    pub monthly_pith: f64,
    pub tds_ratio_percent: f64,
    pub max_affordable_price: f64,
    pub price_to_income_ratio: f64,
    pub total_monthly_cost: f64,
    pub break_even_years: f64,
    pub break_even_found: bool,
}

impl AdviceRequest {
    pub fn from_report(report: &ScenarioReport) -> Self {
        let profile = &report.profile;

        AdviceRequest {
            city: profile.city.clone(),
            postal_code: profile.postal_code.clone(),
            credit_score: profile.credit_score,
            loan_type: profile.loan_type,
            work_address: profile.work_address.clone(),
            annual_income: profile.annual_income,
            down_payment: profile.down_payment,
            monthly_debt: profile.monthly_debt,
            target_home_price: profile.target_home_price,
            interest_rate_percent: report.loan.annual_interest_rate_percent,
            monthly_payment: report.monthly_payment,
            monthly_pith: report.affordability.monthly_housing_payment,
            tds_ratio_percent: report.affordability.total_debt_service_ratio_percent,
            max_affordable_price: report.max_affordable_price,
            price_to_income_ratio: report.price_to_income_ratio,
            total_monthly_cost: report.ownership_cost.total_monthly_cost,
            break_even_years: report.break_even.break_even_years,
            break_even_found: report.break_even.found,
        }
    }
}

// ============================================================================
// RESPONSE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Good Time to Buy")]
    GoodTimeToBuy,
    #[serde(rename = "Proceed with Caution")]
    ProceedWithCaution,
    #[serde(rename = "Consider Waiting")]
    ConsiderWaiting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceDocument {
    pub recommendation: Recommendation,

    /// Buying readiness, 1 to 10
    pub readiness_score: f64,
    pub summary: String,

    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

impl AdviceDocument {
    pub fn validate(&self) -> Result<()> {
        if !(1.0..=10.0).contains(&self.readiness_score) {
            bail!(
                "Readiness score must be between 1 and 10, got {}",
                self.readiness_score
            );
        }
        if self.summary.trim().is_empty() {
            bail!("Advice summary is empty");
        }
        Ok(())
    }

    /// Parse a JSON document from raw model output, tolerating a
    /// surrounding ```json fence.
    pub fn from_model_text(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        let body = body.strip_suffix("```").unwrap_or(body).trim();

        let document: AdviceDocument =
            serde_json::from_str(body).context("The model returned an invalid data format")?;
        document.validate()?;

        Ok(document)
    }
}

// ============================================================================
// ORACLE
// ============================================================================

pub trait AdviceOracle: Send + Sync {
    fn advise(&self, request: &AdviceRequest) -> Result<AdviceDocument>;
}

impl<O: AdviceOracle + ?Sized> AdviceOracle for Box<O> {
    fn advise(&self, request: &AdviceRequest) -> Result<AdviceDocument> {
        (**self).advise(request)
    }
}

// ============================================================================
// ANALYSIS SERVICE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub report: ScenarioReport,
    pub advice: AdviceDocument,
}

pub struct AdvisorService<O> {
    oracle: O,
    config: AdvisorConfig,
}

impl<O: AdviceOracle> AdvisorService<O> {
    pub fn new(oracle: O, config: AdvisorConfig) -> Self {
        AdvisorService { oracle, config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Local metrics only, no oracle call
    pub fn evaluate(&self, profile: &HomeBuyerProfile) -> ScenarioReport {
        ScenarioReport::evaluate(profile, &self.config)
    }

    pub fn analyze(&self, profile: &HomeBuyerProfile) -> Result<Analysis> {
        let report = self.evaluate(profile);
        let request = AdviceRequest::from_report(&report);
        let id = Uuid::new_v4();

        info!(%id, city = %request.city, "requesting advice");
        let advice = self
            .oracle
            .advise(&request)
            .with_context(|| format!("Advice request failed for {}", request.city))?;

        if let Err(e) = advice.validate() {
            warn!(%id, error = %e, "oracle returned an invalid advice document");
            return Err(e.context("Oracle returned an invalid advice document"));
        }

        Ok(Analysis {
            id,
            generated_at: Utc::now(),
            report,
            advice,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockOracle {
        response: AdviceDocument,
        seen: Mutex<Vec<AdviceRequest>>,
    }

    impl MockOracle {
        fn returning(response: AdviceDocument) -> Self {
            MockOracle {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl AdviceOracle for MockOracle {
        fn advise(&self, request: &AdviceRequest) -> Result<AdviceDocument> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    struct FailingOracle;

    impl AdviceOracle for FailingOracle {
        fn advise(&self, _request: &AdviceRequest) -> Result<AdviceDocument> {
            bail!("API key not valid")
        }
    }

    fn sample_advice() -> AdviceDocument {
        AdviceDocument {
            recommendation: Recommendation::ProceedWithCaution,
            readiness_score: 6.0,
            summary: "Stretch purchase; build reserves first.".to_string(),
            pros: vec!["Stable income".to_string()],
            cons: vec!["TDS above lender limit".to_string()],
            next_steps: vec!["Pay down the car loan".to_string()],
        }
    }

    #[test]
    fn test_analyze_with_mock_oracle() {
        let service = AdvisorService::new(
            MockOracle::returning(sample_advice()),
            AdvisorConfig::default(),
        );
        let profile = HomeBuyerProfile::default();

        let analysis = service.analyze(&profile).unwrap();
        assert_eq!(analysis.advice, sample_advice());
        assert_eq!(analysis.report.profile, profile);

        let seen = service.oracle.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].city, "Beverly Hills");
        assert_eq!(seen[0].monthly_payment, analysis.report.monthly_payment);
        assert_eq!(
            seen[0].tds_ratio_percent,
            analysis.report.affordability.total_debt_service_ratio_percent
        );
    }

    #[test]
    fn test_oracle_failure_propagates() {
        let service = AdvisorService::new(FailingOracle, AdvisorConfig::default());
        let err = service.analyze(&HomeBuyerProfile::default()).unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Advice request failed for Beverly Hills"));
        assert!(message.contains("API key not valid"));
    }

    #[test]
    fn test_invalid_document_rejected() {
        let mut advice = sample_advice();
        advice.readiness_score = 42.0;

        let service = AdvisorService::new(
            Box::new(MockOracle::returning(advice)) as Box<dyn AdviceOracle>,
            AdvisorConfig::default(),
        );
        assert!(service.analyze(&HomeBuyerProfile::default()).is_err());
    }

    #[test]
    fn test_parse_fenced_model_text() {
        let text = r#"```json
{
  "recommendation": "Good Time to Buy",
  "readiness_score": 8.5,
  "summary": "Comfortable ratios and a solid down payment.",
  "pros": ["Low TDS"]
}
```"#;
        let document = AdviceDocument::from_model_text(text).unwrap();
        assert_eq!(document.recommendation, Recommendation::GoodTimeToBuy);
        assert_eq!(document.readiness_score, 8.5);
        assert_eq!(document.pros, vec!["Low TDS".to_string()]);
        assert!(document.next_steps.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = AdviceDocument::from_model_text("Sorry, I can't help with that.").unwrap_err();
        assert!(err.to_string().contains("invalid data format"));

        let empty_summary = r#"{"recommendation": "Consider Waiting", "readiness_score": 3, "summary": " "}"#;
        assert!(AdviceDocument::from_model_text(empty_summary).is_err());
    }
}
