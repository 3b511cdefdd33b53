use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::error;

use crate::modules::location_pings::use_cases::export_locations::handler::export_csv;
use crate::shell::state::AppState;

pub async fn handle(State(state): State<AppState>) -> impl IntoResponse {
    let pings = state.location_pings.loader().snapshot().await;
    match export_csv(&pings) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"location-pings.csv\"",
                ),
            ],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "location export failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
