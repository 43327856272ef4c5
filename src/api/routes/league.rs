//! League query endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{load_league, ApiError};
use crate::calculate::{HeadToHead, Progress, StreakKind, StreakReport};
use crate::models::{PvpMatrix, StandingsRow};
use crate::render::{heatmap as render_heatmap, Heatmap};

#[derive(Debug, Serialize)]
pub struct StandingsResponse {
    pub league: String,
    pub standings: Vec<StandingsRow>,
}

pub async fn standings(State(state): State<AppState>) -> Result<Json<StandingsResponse>, ApiError> {
    let league = load_league(&state).await?;
    Ok(Json(StandingsResponse {
        league: state.league.name.clone(),
        standings: league.standings(),
    }))
}

pub async fn stats(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<StandingsRow>, ApiError> {
    let league = load_league(&state).await?;
    Ok(Json(league.stats(&player)?))
}

pub async fn remaining(
    State(state): State<AppState>,
    Path(player): Path<String>,
) -> Result<Json<Progress>, ApiError> {
    let league = load_league(&state).await?;
    Ok(Json(league.remaining(&player)?))
}

pub async fn streaks(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<StreakReport>, ApiError> {
    let kind: StreakKind = kind.parse().map_err(ApiError::BadRequest)?;
    let league = load_league(&state).await?;
    Ok(Json(league.streaks(kind)))
}

#[derive(Debug, Deserialize)]
pub struct PvpParams {
    pub player1: Option<String>,
    pub player2: Option<String>,
}

pub async fn pvp(
    State(state): State<AppState>,
    Query(params): Query<PvpParams>,
) -> Result<Json<HeadToHead>, ApiError> {
    let non_blank = |p: Option<String>| p.filter(|s| !s.trim().is_empty());
    let (Some(player1), Some(player2)) = (non_blank(params.player1), non_blank(params.player2))
    else {
        return Err(ApiError::BadRequest(
            "player1 and player2 are required".to_string(),
        ));
    };

    let league = load_league(&state).await?;
    Ok(Json(league.pvp(&player1, &player2)?))
}

pub async fn pvp_matrix(State(state): State<AppState>) -> Result<Json<PvpMatrix>, ApiError> {
    let league = load_league(&state).await?;
    Ok(Json(league.pvp_matrix()))
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeatmapResponse {
    Grid(Heatmap),
    Empty,
}

pub async fn heatmap(State(state): State<AppState>) -> Result<Json<HeatmapResponse>, ApiError> {
    let league = load_league(&state).await?;
    let response = match league.pvp_matrix() {
        PvpMatrix::Grid(matrix) => HeatmapResponse::Grid(render_heatmap(&matrix)),
        PvpMatrix::Empty => HeatmapResponse::Empty,
    };
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::routes::test_support::*;
    use crate::calculate::fixtures::standings_row;
    use crate::fetch::MemorySource;
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_standings_sorted_by_rank() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/standings").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["league"], "MTG League");
        let ranks: Vec<u64> = json["standings"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["rank"].as_u64().unwrap())
            .collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_stats() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/stats/carol").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Carol");
        assert_eq!(json["rank"], 3);
    }

    #[tokio::test]
    async fn test_stats_not_found() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/stats/Zed").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_remaining() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/remaining/Bob").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["played"], 2);
        assert_eq!(json["total"], 10);
        assert_eq!(json["percent"], 20);
        assert_eq!(json["per_opponent"][0]["opponent"], "Carol");
        assert_eq!(json["per_opponent"][0]["remaining"], 5);
    }

    #[tokio::test]
    async fn test_streaks() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/streaks/win").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "leaders");
        assert_eq!(json["length"], 1);
        assert_eq!(json["players"][0], "Bob");
    }

    #[tokio::test]
    async fn test_streaks_bad_kind() {
        let app = build_router(state_with(league_source()));
        let (status, _) = get_json(app, "/api/streaks/draw").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_streaks_none_active() {
        let source = MemorySource::new(vec![standings_row(1, "Alice")], vec![]);
        let app = build_router(state_with(source));
        let (status, json) = get_json(app, "/api/streaks/lose").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "no_active_streak");
    }

    #[tokio::test]
    async fn test_pvp() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/pvp?player1=bob&player2=alice").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "record");
        assert_eq!(json["first"]["player"], "Bob");
        assert_eq!(json["first"]["wins"], 1);
        assert_eq!(json["second"]["wins"], 1);
        assert_eq!(json["total"], 2);
    }

    #[tokio::test]
    async fn test_pvp_no_data_and_missing_params() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app.clone(), "/api/pvp?player1=Bob&player2=Carol").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "no_data");

        let (status, _) = get_json(app, "/api/pvp?player1=Bob").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pvp_matrix() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/pvp-matrix").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "grid");
        assert_eq!(json["origin"], "ledger");
        assert_eq!(json["players"][0], "Carol");
        // Carol vs Carol
        assert_eq!(json["rows"][0][0]["value"]["kind"], "not_applicable");
        // Alice (row 1) vs Carol (col 0)
        assert_eq!(json["rows"][1][0]["value"]["kind"], "record");
        assert_eq!(json["rows"][1][0]["value"]["wins"], 1);
    }

    #[tokio::test]
    async fn test_heatmap() {
        let app = build_router(state_with(league_source()));
        let (status, json) = get_json(app, "/api/pvp-matrix/heatmap").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "grid");
        assert_eq!(json["cells"][0][0]["label"], "—");
        assert_eq!(json["cells"][1][0]["label"], "1 (100%)");
    }

    #[tokio::test]
    async fn test_empty_roster_is_source_error() {
        let app = build_router(state_with(MemorySource::default()));
        let (status, json) = get_json(app, "/api/standings").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "SOURCE_UNAVAILABLE");
    }
}
