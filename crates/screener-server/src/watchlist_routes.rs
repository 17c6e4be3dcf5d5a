use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use watchlist::{parse_watchlist, rank_results, WatchlistScanner};

use crate::screening_routes::{resolve_periods, ScreeningView};
use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RankRequest {
    pub tickers: Vec<String>,
    pub periods: Option<u32>,
    pub min_stars: Option<usize>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FailureView {
    pub ticker: String,
    pub error: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RankResponse {
    pub results: Vec<ScreeningView>,
    pub failures: Vec<FailureView>,
}

pub fn watchlist_routes() -> Router<AppState> {
    Router::new().route("/api/watchlist/rank", post(rank_watchlist))
}

#[utoipa::path(
    post,
    path = "/api/watchlist/rank",
    request_body = RankRequest,
    responses(
        (status = 200, description = "Screened tickers ranked by stars then dividend yield"),
        (status = 400, description = "No tickers given")
    ),
    tag = "Screening"
)]
pub async fn rank_watchlist(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<ApiResponse<RankResponse>>, AppError> {
    let entries = parse_watchlist(&request.tickers.join(" "));
    if entries.is_empty() {
        return Err(AppError::bad_request("tickers must not be empty"));
    }
    let periods = resolve_periods(&state, request.periods)?;
    let min_stars = request.min_stars.unwrap_or(0);

    let scanner = WatchlistScanner::new(state.provider.clone(), state.engine.clone(), periods);
    let report = scanner.scan(&entries).await;

    let method = state.engine.config().cagr_method;
    let results = rank_results(report.results)
        .iter()
        .filter(|r| r.stars() >= min_stars)
        .map(|r| ScreeningView::from_result(r, method))
        .collect();
    let failures = report
        .failures
        .into_iter()
        .map(|f| FailureView {
            ticker: f.ticker,
            error: f.error,
        })
        .collect();

    Ok(Json(ApiResponse::success(RankResponse { results, failures })))
}
