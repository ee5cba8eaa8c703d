// Home Advisor - Web Server
// JSON API over the calculators with Axum

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use home_advisor::{
    amortization_schedule, compare, estimate_break_even_years, evaluate_affordability,
    max_affordable_price, AdvisorConfig, AffordabilityInput, AffordabilityResult,
    BreakEvenAssumptions, HomeBuyerProfile, LoanTerms, ScenarioReport, MAX_BREAK_EVEN_YEARS,
    MAX_TERM_YEARS,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    config: Arc<AdvisorConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Request / Response bodies
// ============================================================================

#[derive(Serialize)]
struct PaymentResponse {
    loan: LoanTerms,
    monthly_payment: f64,
    total_interest: f64,
    computable: bool,
}

#[derive(Deserialize)]
struct AffordabilityRequest {
    #[serde(flatten)]
    input: AffordabilityInput,
    annual_interest_rate_percent: Option<f64>,
    amortization_years: Option<u32>,
}

#[derive(Serialize)]
struct AffordabilityResponse {
    affordability: AffordabilityResult,
    max_affordable_price: f64,
    tds_limit_percent: f64,
    within_limit: bool,
}

#[derive(Deserialize)]
struct BreakEvenRequest {
    loan: LoanTerms,
    assumptions: BreakEvenAssumptions,
    max_years: Option<u32>,
}

#[derive(Deserialize)]
struct CompareRequest {
    first: HomeBuyerProfile,
    second: HomeBuyerProfile,
}

fn bad_request(message: String) -> axum::response::Response {
    warn!("rejecting request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ApiResponse::err(message))).into_response()
}

/// Terms past the longest schedule are refused before any work is done
fn check_term(loan: &LoanTerms) -> Result<(), axum::response::Response> {
    if loan.term_years > MAX_TERM_YEARS {
        return Err(bad_request(format!(
            "term_years must be at most {}, got {}",
            MAX_TERM_YEARS, loan.term_years
        )));
    }
    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/config - Active market assumptions
async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::ok(state.config.as_ref().clone()))
}

/// POST /api/payment - Monthly payment for a loan
async fn post_payment(Json(loan): Json<LoanTerms>) -> impl IntoResponse {
    if let Err(response) = check_term(&loan) {
        return response;
    }
    let monthly_payment = loan.monthly_payment();

    Json(ApiResponse::ok(PaymentResponse {
        loan,
        monthly_payment,
        total_interest: loan.total_interest(),
        computable: monthly_payment > 0.0,
    }))
    .into_response()
}

/// POST /api/schedule - Yearly amortization schedule (empty when not computable)
async fn post_schedule(Json(loan): Json<LoanTerms>) -> impl IntoResponse {
    if let Err(response) = check_term(&loan) {
        return response;
    }
    let schedule: Vec<_> = amortization_schedule(
        loan.principal,
        loan.annual_interest_rate_percent,
        loan.term_years,
    )
    .collect();

    Json(ApiResponse::ok(schedule)).into_response()
}

/// POST /api/affordability - PITH, ratios and max price
async fn post_affordability(
    State(state): State<AppState>,
    Json(request): Json<AffordabilityRequest>,
) -> impl IntoResponse {
    let config = &state.config;
    let rate = request
        .annual_interest_rate_percent
        .unwrap_or(config.assumed_rate_percent);
    let years = request.amortization_years.unwrap_or(30);

    let affordability = evaluate_affordability(&request.input, rate, years);
    let max_price = max_affordable_price(&request.input, rate, years, config.tds_limit_percent);

    Json(ApiResponse::ok(AffordabilityResponse {
        within_limit: affordability.within_tds_limit(config.tds_limit_percent),
        affordability,
        max_affordable_price: max_price,
        tds_limit_percent: config.tds_limit_percent,
    }))
}

/// POST /api/break-even - Buy vs. rent crossover
async fn post_break_even(
    State(state): State<AppState>,
    Json(request): Json<BreakEvenRequest>,
) -> impl IntoResponse {
    let horizon = request
        .max_years
        .unwrap_or(state.config.max_break_even_years);

    if horizon > MAX_BREAK_EVEN_YEARS {
        return bad_request(format!(
            "max_years must be at most {}, got {}",
            MAX_BREAK_EVEN_YEARS, horizon
        ));
    }
    if let Err(response) = check_term(&request.loan) {
        return response;
    }

    let result = estimate_break_even_years(&request.loan, &request.assumptions, horizon);
    (StatusCode::OK, Json(ApiResponse::ok(result))).into_response()
}

/// POST /api/evaluate - Full scenario report for one profile
async fn post_evaluate(
    State(state): State<AppState>,
    Json(profile): Json<HomeBuyerProfile>,
) -> impl IntoResponse {
    Json(ApiResponse::ok(ScenarioReport::evaluate(&profile, &state.config)))
}

/// POST /api/compare - Two profiles side by side
async fn post_compare(
    State(state): State<AppState>,
    Json(request): Json<CompareRequest>,
) -> impl IntoResponse {
    let first = ScenarioReport::evaluate(&request.first, &state.config);
    let second = ScenarioReport::evaluate(&request.second, &state.config);

    Json(ApiResponse::ok(compare(&first, &second)))
}

// ============================================================================
// Main Server
// ============================================================================

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/config", get(get_config))
        .route("/payment", post(post_payment))
        .route("/schedule", post(post_schedule))
        .route("/affordability", post(post_affordability))
        .route("/break-even", post(post_break_even))
        .route("/evaluate", post(post_evaluate))
        .route("/compare", post(post_compare))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "advisor_server=info,home_advisor=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::var_os("HOME_ADVISOR_CONFIG");
    let config = AdvisorConfig::load_or_default(config_path.as_ref())?;
    info!(?config_path, "configuration loaded");

    let state = AppState {
        config: Arc::new(config),
    };

    let addr = std::env::var("HOME_ADVISOR_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("server running on http://{}", addr);
    info!("API: http://{}/api/health", addr);

    axum::serve(listener, app(state))
        .await
        .context("Server error")?;

    Ok(())
}
