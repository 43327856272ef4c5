//! Spreadsheet update webhook.
//!
//! The sheet calls this when it is edited; the reply carries the refreshed
//! standings so the caller can forward them to the league channel.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::api::state::AppState;
use crate::api::{load_league, ApiError};
use crate::render::render_standings;

#[derive(Debug, Serialize)]
pub struct SheetUpdateResponse {
    pub status: &'static str,
    pub text: String,
}

pub async fn sheet_update(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<SheetUpdateResponse>, ApiError> {
    match &body {
        Some(Json(payload)) => info!("Sheet update received: {}", payload),
        None => info!("Sheet update received without payload"),
    }

    let league = load_league(&state).await?;
    let text = render_standings(&league.standings(), &state.league.name, true);
    Ok(Json(SheetUpdateResponse {
        status: "refreshed",
        text,
    }))
}
