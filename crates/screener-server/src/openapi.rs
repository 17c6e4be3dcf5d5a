use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::screening_routes::{self, ScreenRequest, ScreeningView};
use crate::watchlist_routes::{self, FailureView, RankRequest, RankResponse};
use crate::AppState;

#[derive(OpenApi)]
#[openapi(
    info(title = "Dividend Screener API", description = "Graham number, dividend growth and seven-star rating per ticker"),
    paths(
        screening_routes::screen_post,
        screening_routes::screen_get,
        watchlist_routes::rank_watchlist,
    ),
    components(schemas(
        ScreenRequest,
        ScreeningView,
        RankRequest,
        RankResponse,
        FailureView,
        screener_core::MissingFact,
    )),
    tags((name = "Screening", description = "Dividend stock screening"))
)]
pub struct ApiDoc;

pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
