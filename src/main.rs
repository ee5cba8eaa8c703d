use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use home_advisor::{
    compare, estimate_break_even_years, evaluate_affordability, max_affordable_price,
    write_break_even_csv, write_schedule_csv, AdvisorConfig, AffordabilityInput,
    BreakEvenAssumptions, HomeBuyerProfile, LoanTerms, ScenarioReport, MAX_BREAK_EVEN_YEARS,
};

#[derive(Parser)]
#[command(name = "home-advisor")]
#[command(about = "Mortgage, affordability and buy-vs-rent calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON file overriding the default market assumptions
    #[arg(short, long, global = true, env = "HOME_ADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed monthly payment for a loan
    Payment {
        #[arg(short, long)]
        principal: f64,
        /// Annual rate in percent (defaults to the configured rate)
        #[arg(short, long)]
        rate: Option<f64>,
        #[arg(short, long, default_value_t = 30)]
        years: u32,
    },

    /// Year-by-year amortization schedule
    Schedule {
        #[arg(short, long)]
        principal: f64,
        #[arg(short, long)]
        rate: Option<f64>,
        #[arg(short, long, default_value_t = 30)]
        years: u32,
        /// Write the schedule to a CSV file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// PITH, GDS/TDS ratios and maximum affordable price
    Afford {
        #[arg(long)]
        income: f64,
        #[arg(long, default_value_t = 0.0)]
        debt: f64,
        #[arg(long)]
        down: f64,
        #[arg(long)]
        price: f64,
        /// Annual property tax as a fraction of price (e.g. 0.01)
        #[arg(long)]
        tax_rate: Option<f64>,
        #[arg(long)]
        heating: Option<f64>,
        #[arg(short, long)]
        rate: Option<f64>,
        #[arg(short, long, default_value_t = 30)]
        years: u32,
    },

    /// Year in which owning becomes cheaper than renting
    BreakEven {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        down: f64,
        #[arg(long)]
        rent: f64,
        #[arg(short, long)]
        rate: Option<f64>,
        #[arg(short, long, default_value_t = 30)]
        years: u32,
        /// Search horizon in years (at most 100, defaults to the configured horizon)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=MAX_BREAK_EVEN_YEARS as i64))]
        max_years: Option<u32>,
        /// Write the yearly cost trace to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Evaluate a home-buyer profile (JSON), optionally against a second one
    Evaluate {
        #[arg(long)]
        profile: PathBuf,
        #[arg(long)]
        compare_with: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "home_advisor=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AdvisorConfig::load_or_default(cli.config.as_ref())?;
    info!(?config, "configuration loaded");

    match cli.command {
        Commands::Payment { principal, rate, years } => {
            let loan = LoanTerms::new(principal, rate.unwrap_or(config.assumed_rate_percent), years);
            run_payment(&loan, cli.json)
        }
        Commands::Schedule { principal, rate, years, csv } => {
            let loan = LoanTerms::new(principal, rate.unwrap_or(config.assumed_rate_percent), years);
            run_schedule(&loan, csv.as_deref(), cli.json)
        }
        Commands::Afford { income, debt, down, price, tax_rate, heating, rate, years } => {
            let input = AffordabilityInput {
                gross_annual_income: income,
                monthly_non_housing_debt: debt,
                down_payment: down,
                target_home_price: price,
                estimated_annual_property_tax_rate: tax_rate
                    .unwrap_or(config.ownership.annual_property_tax_rate),
                estimated_monthly_heating: heating.unwrap_or(config.estimated_monthly_heating),
            };
            run_afford(&input, rate.unwrap_or(config.assumed_rate_percent), years, &config, cli.json)
        }
        Commands::BreakEven { price, down, rent, rate, years, max_years, csv } => {
            let loan = LoanTerms::new(
                (price - down).max(0.0),
                rate.unwrap_or(config.assumed_rate_percent),
                years,
            );
            let assumptions = BreakEvenAssumptions::new(
                rent,
                config.appreciation_rate_percent,
                config.rent_increase_rate_percent,
                config.buying_cost_percent,
                config.selling_cost_percent,
            )
            .with_home_price(price)
            .with_investment_return(config.investment_return_rate_percent)
            .with_ownership(config.ownership.clone());
            let horizon = max_years.unwrap_or(config.max_break_even_years);
            run_break_even(&loan, &assumptions, horizon, csv.as_deref(), cli.json)
        }
        Commands::Evaluate { profile, compare_with } => {
            run_evaluate(&profile, compare_with.as_deref(), &config, cli.json)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_profile(path: &Path) -> Result<HomeBuyerProfile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile file: {:?}", path))?;
    serde_json::from_str(&content).context("Failed to parse profile JSON")
}

fn run_payment(loan: &LoanTerms, json: bool) -> Result<()> {
    let payment = loan.monthly_payment();

    if json {
        return print_json(&serde_json::json!({ "loan": loan, "monthly_payment": payment }));
    }

    if payment <= 0.0 {
        println!("❌ Payment not computable for these loan terms");
        return Ok(());
    }
    println!("🏦 ${:.0} at {}% over {} years", loan.principal, loan.annual_interest_rate_percent, loan.term_years);
    println!("✓ Monthly payment: ${:.2}", payment);
    println!("✓ Total interest:  ${:.2}", loan.total_interest());
    Ok(())
}

fn run_schedule(loan: &LoanTerms, csv: Option<&Path>, json: bool) -> Result<()> {
    let schedule: Vec<_> = loan.schedule().collect();

    if let Some(path) = csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
        write_schedule_csv(file, &schedule)?;
        println!("✓ Wrote {} years to {:?}", schedule.len(), path);
        return Ok(());
    }

    if json {
        return print_json(&schedule);
    }

    if schedule.is_empty() {
        println!("❌ Could not generate an amortization schedule with the provided data");
        return Ok(());
    }
    println!("{:>4}  {:>14}  {:>14}  {:>14}", "Year", "Principal", "Interest", "Balance");
    for entry in &schedule {
        println!(
            "{:>4}  {:>14.2}  {:>14.2}  {:>14.2}",
            entry.year,
            entry.cumulative_principal_paid,
            entry.cumulative_interest_paid,
            entry.remaining_balance
        );
    }
    Ok(())
}

fn run_afford(
    input: &AffordabilityInput,
    rate: f64,
    years: u32,
    config: &AdvisorConfig,
    json: bool,
) -> Result<()> {
    let result = evaluate_affordability(input, rate, years);
    let max_price = max_affordable_price(input, rate, years, config.tds_limit_percent);

    if json {
        return print_json(&serde_json::json!({
            "affordability": result,
            "max_affordable_price": max_price,
        }));
    }

    println!("📐 Affordability at ${:.0} ({}% over {} years)", input.target_home_price, rate, years);
    println!("✓ Monthly PITH:  ${:.2}", result.monthly_housing_payment);
    println!("✓ GDS ratio:     {:.1}% (limit {:.0}%)", result.gross_debt_service_ratio_percent, config.gds_limit_percent);
    println!("✓ TDS ratio:     {:.1}% (limit {:.0}%)", result.total_debt_service_ratio_percent, config.tds_limit_percent);
    println!("✓ Max price:     ${:.0}", max_price);
    if input.gross_annual_income <= 0.0 {
        println!("⚠️  No income given, ratios are not meaningful");
    } else if result.within_tds_limit(config.tds_limit_percent) {
        println!("🎉 Within the TDS limit");
    } else {
        println!("⚠️  Over the TDS limit");
    }
    Ok(())
}

fn run_break_even(
    loan: &LoanTerms,
    assumptions: &BreakEvenAssumptions,
    horizon: u32,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let result = estimate_break_even_years(loan, assumptions, horizon);

    if let Some(path) = csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
        write_break_even_csv(file, &result.yearly)?;
        println!("✓ Wrote {} years to {:?}", result.yearly.len(), path);
    }

    if json {
        return print_json(&result);
    }

    println!("⚖️  {}", result.summary());
    Ok(())
}

fn run_evaluate(
    profile_path: &Path,
    compare_path: Option<&Path>,
    config: &AdvisorConfig,
    json: bool,
) -> Result<()> {
    let report = ScenarioReport::evaluate(&load_profile(profile_path)?, config);

    let Some(other_path) = compare_path else {
        if json {
            return print_json(&report);
        }
        println!("🧮 {}", report.summary());
        for (label, amount) in report.ownership_cost.items() {
            println!("   {:<22} ${:>10.2}", label, amount);
        }
        return Ok(());
    };

    let other = ScenarioReport::evaluate(&load_profile(other_path)?, config);
    let comparison = compare(&report, &other);

    if json {
        return print_json(&comparison);
    }

    println!("{:>24}  {:<22}  {:<24}", comparison.first_label, "", comparison.second_label);
    for row in &comparison.rows {
        println!("{:>24.2}  {:<22}  {:<24.2}  {:?}", row.first, row.label, row.second, row.better);
    }
    let (first_wins, second_wins) = comparison.wins();
    println!("\n✓ {} wins {}, {} wins {}", comparison.first_label, first_wins, comparison.second_label, second_wins);
    Ok(())
}
