use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use screener_core::{normalize_ticker, CagrMethod, MissingFact, ScreeningResult, MAX_PERIODS};
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScreenRequest {
    pub ticker: String,
    pub periods: Option<u32>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PeriodsQuery {
    /// Years of dividend history to screen
    pub periods: Option<u32>,
}

/// The screening fields exposed over HTTP.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningView {
    pub company_description: Option<String>,
    pub company_name: String,
    pub company_ticker: String,
    pub debt_to_equity_ratio: Option<f64>,
    #[serde(rename = "dividendCAGR")]
    pub dividend_cagr: Option<f64>,
    pub dividend_increase: bool,
    pub dividend_payout_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub price_to_earnings_ratio: Option<f64>,
    pub star_rating: String,
    pub star_count: usize,
    pub stock_discount: Option<f64>,
    pub stock_fair_value: Option<f64>,
    pub stock_price: f64,
    pub unavailable_fields: Vec<MissingFact>,
}

impl ScreeningView {
    pub fn from_result(result: &ScreeningResult, method: CagrMethod) -> Self {
        let facts = &result.facts;
        Self {
            company_description: facts.description.clone(),
            company_name: facts.display_name(),
            company_ticker: facts.ticker.clone(),
            debt_to_equity_ratio: facts.debt_to_equity,
            dividend_cagr: result.cagr(method),
            dividend_increase: result.continuous_dividend_increase,
            dividend_payout_ratio: facts.dividend_payout_ratio,
            dividend_yield: result.dividend_yield,
            price_to_earnings_ratio: facts.price_to_earnings_ratio,
            star_rating: result.star_rating.to_string(),
            star_count: result.stars(),
            stock_discount: result.discount,
            stock_fair_value: result.graham_number,
            stock_price: facts.price,
            unavailable_fields: result.missing_facts.clone(),
        }
    }
}

pub fn screening_routes() -> Router<AppState> {
    Router::new()
        .route("/api/screen", post(screen_post))
        .route("/api/screen/:ticker", get(screen_get))
}

/// Resolve the periods to screen, rejecting zero and anything above
/// [`MAX_PERIODS`].
pub(crate) fn resolve_periods(state: &AppState, requested: Option<u32>) -> Result<u32, AppError> {
    match requested {
        Some(p) if p == 0 || p > MAX_PERIODS => Err(AppError::bad_request(&format!(
            "periods must be between 1 and {}",
            MAX_PERIODS
        ))),
        Some(p) => Ok(p),
        None => Ok(state.default_periods),
    }
}

async fn screen_ticker(
    state: &AppState,
    raw_ticker: &str,
    periods: Option<u32>,
) -> Result<ScreeningView, AppError> {
    let ticker = normalize_ticker(raw_ticker);
    if ticker.is_empty() {
        return Err(AppError::bad_request("ticker must not be empty"));
    }
    let periods = resolve_periods(state, periods)?;

    let facts = state.provider.fetch_facts(&ticker, periods).await?;
    let result = state.engine.evaluate(&facts)?;
    tracing::info!("Screened {}: {}", ticker, result.star_rating);

    Ok(ScreeningView::from_result(
        &result,
        state.engine.config().cagr_method,
    ))
}

#[utoipa::path(
    post,
    path = "/api/screen",
    request_body = ScreenRequest,
    responses(
        (status = 200, description = "Ratios and star rating for the ticker"),
        (status = 400, description = "Empty ticker or periods out of range"),
        (status = 422, description = "Provider facts are unusable"),
        (status = 502, description = "Unknown ticker or provider failure")
    ),
    tag = "Screening"
)]
pub async fn screen_post(
    State(state): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ApiResponse<ScreeningView>>, AppError> {
    let view = screen_ticker(&state, &request.ticker, request.periods).await?;
    Ok(Json(ApiResponse::success(view)))
}

#[utoipa::path(
    get,
    path = "/api/screen/{ticker}",
    params(
        ("ticker" = String, Path, description = "Stock ticker symbol"),
        PeriodsQuery
    ),
    responses(
        (status = 200, description = "Ratios and star rating for the ticker"),
        (status = 400, description = "Periods out of range"),
        (status = 502, description = "Unknown ticker or provider failure")
    ),
    tag = "Screening"
)]
pub async fn screen_get(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<PeriodsQuery>,
) -> Result<Json<ApiResponse<ScreeningView>>, AppError> {
    let view = screen_ticker(&state, &ticker, query.periods).await?;
    Ok(Json(ApiResponse::success(view)))
}
