// ⚙️ Advisor Configuration - Market assumptions as data
// Every field has a default; a JSON file only needs the values it overrides.

use crate::break_even::MAX_BREAK_EVEN_YEARS;
use crate::ownership::OwnershipAssumptions;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Rate used when a profile does not carry its own
    pub assumed_rate_percent: f64,

    /// Lender ceilings for debt service ratios
    pub tds_limit_percent: f64,
    pub gds_limit_percent: f64,

    pub estimated_monthly_heating: f64,

    /// Annual rent as a percent of price, used when no rent estimate is given
    pub gross_rent_yield_percent: f64,

    pub appreciation_rate_percent: f64,
    pub rent_increase_rate_percent: f64,
    pub buying_cost_percent: f64,
    pub selling_cost_percent: f64,
    pub investment_return_rate_percent: f64,
    pub max_break_even_years: u32,

    pub ownership: OwnershipAssumptions,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            assumed_rate_percent: 5.5,
            tds_limit_percent: 44.0,
            gds_limit_percent: 39.0,
            estimated_monthly_heating: 100.0,
            gross_rent_yield_percent: 4.5,
            appreciation_rate_percent: 3.0,
            rent_increase_rate_percent: 2.5,
            buying_cost_percent: 1.5,
            selling_cost_percent: 5.0,
            investment_return_rate_percent: 0.0,
            max_break_even_years: 30,
            ownership: OwnershipAssumptions::default(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AdvisorConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("assumed_rate_percent", self.assumed_rate_percent),
            ("estimated_monthly_heating", self.estimated_monthly_heating),
            ("gross_rent_yield_percent", self.gross_rent_yield_percent),
            ("rent_increase_rate_percent", self.rent_increase_rate_percent),
            ("buying_cost_percent", self.buying_cost_percent),
            ("selling_cost_percent", self.selling_cost_percent),
            ("investment_return_rate_percent", self.investment_return_rate_percent),
            ("ownership.annual_property_tax_rate", self.ownership.annual_property_tax_rate),
            ("ownership.annual_insurance_rate_percent", self.ownership.annual_insurance_rate_percent),
            ("ownership.annual_maintenance_rate_percent", self.ownership.annual_maintenance_rate_percent),
            ("ownership.monthly_utilities", self.ownership.monthly_utilities),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                bail!("Invalid config: {} must be a non-negative number, got {}", name, value);
            }
        }

        // Appreciation may be negative in a falling market
        if !self.appreciation_rate_percent.is_finite() {
            bail!("Invalid config: appreciation_rate_percent must be finite");
        }

        for (name, value) in [
            ("tds_limit_percent", self.tds_limit_percent),
            ("gds_limit_percent", self.gds_limit_percent),
        ] {
            if !(value > 0.0 && value <= 100.0) {
                bail!("Invalid config: {} must be in (0, 100], got {}", name, value);
            }
        }

        if self.max_break_even_years == 0 || self.max_break_even_years > MAX_BREAK_EVEN_YEARS {
            bail!(
                "Invalid config: max_break_even_years must be in 1..={}, got {}",
                MAX_BREAK_EVEN_YEARS,
                self.max_break_even_years
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AdvisorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "assumed_rate_percent": 4.25, "ownership": {{ "monthly_utilities": 300.0 }} }}"#
        )
        .unwrap();

        let config = AdvisorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.assumed_rate_percent, 4.25);
        assert_eq!(config.ownership.monthly_utilities, 300.0);
        assert_eq!(config.ownership.annual_property_tax_rate, 0.01);
        assert_eq!(config.tds_limit_percent, 44.0);
        assert_eq!(config.max_break_even_years, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AdvisorConfig::default();
        config.tds_limit_percent = 0.0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.buying_cost_percent = -1.0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.max_break_even_years = 0;
        assert!(config.validate().is_err());

        let mut config = AdvisorConfig::default();
        config.max_break_even_years = MAX_BREAK_EVEN_YEARS + 1;
        assert!(config.validate().is_err());
        config.max_break_even_years = MAX_BREAK_EVEN_YEARS;
        assert!(config.validate().is_ok());

        let mut config = AdvisorConfig::default();
        config.appreciation_rate_percent = -2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let err = AdvisorConfig::from_file("/nonexistent/advisor.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = AdvisorConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config JSON"));
    }

    #[test]
    fn test_load_or_default() {
        let config = AdvisorConfig::load_or_default(None::<&str>).unwrap();
        assert_eq!(config, AdvisorConfig::default());
    }
}
