//! Chat-style command endpoints.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::{load_league, ApiError};
use crate::commands::{CommandError, CommandOutput, CommandSpec, Invocation};
use crate::render::render_output;

#[derive(Debug, Serialize)]
pub struct CommandListResponse {
    pub commands: Vec<CommandSpec>,
}

pub async fn list(State(state): State<AppState>) -> Json<CommandListResponse> {
    Json(CommandListResponse {
        commands: state.registry.specs().cloned().collect(),
    })
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub output: CommandOutput,
    /// Chat reply for the output
    pub text: String,
}

pub async fn run(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let invocation = Invocation::parse(&req.text)?;
    if state.registry.get(&invocation.name).is_none() {
        return Err(CommandError::UnknownCommand(invocation.name).into());
    }
    info!("Running command {} {:?}", invocation.name, invocation.args);

    let league = load_league(&state).await?;
    let output = state.registry.dispatch(&invocation, &league)?;
    let text = render_output(&output, &state.league.name);
    Ok(Json(CommandResponse { output, text }))
}
