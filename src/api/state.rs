use std::sync::Arc;

use crate::commands::CommandRegistry;
use crate::config::LeagueConfig;
use crate::fetch::DataSource;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub league: Arc<LeagueConfig>,
    pub registry: Arc<CommandRegistry>,
}
