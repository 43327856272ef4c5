//! Command surface.
//!
//! Maps command names (`standings`, `stats`, `remaining`, `streaks`, `pvp`,
//! `pvp-matrix`) to engine calls. The registry is built once and handed to
//! whoever dispatches; there is no global command table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate::{EngineError, HeadToHead, League, Progress, StreakKind, StreakReport};
use crate::models::{PvpMatrix, StandingsRow};

/// Errors raised while parsing or dispatching a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("No command given")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Please provide {argument}. Example: `{usage}`")]
    MissingArgument {
        command: String,
        argument: &'static str,
        usage: &'static str,
    },

    #[error("Invalid argument for {command}: {message}")]
    InvalidArgument { command: String, message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Description of one command argument.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub choices: &'static [&'static str],
}

/// Description of one command, as shown to users.
#[derive(Debug, Clone, Serialize)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub arguments: Vec<ArgumentSpec>,
}

/// Structured result of a dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "result", rename_all = "kebab-case")]
pub enum CommandOutput {
    Standings(Vec<StandingsRow>),
    Stats(StandingsRow),
    Remaining(Progress),
    Streaks(StreakReport),
    Pvp(HeadToHead),
    PvpMatrix(PvpMatrix),
}

/// A command name plus its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(name: &str, args: Vec<String>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            args: args
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect(),
        }
    }

    /// Parse chat-style text such as `!stats Allu` or `/pvp Ann vs Bo`.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut parts = text.split_whitespace();
        let head = parts.next().ok_or(CommandError::Empty)?;
        let name = head.trim_start_matches(['!', '/']);
        if name.is_empty() {
            return Err(CommandError::Empty);
        }
        Ok(Self::new(name, parts.map(str::to_string).collect()))
    }

    fn joined_args(&self) -> String {
        self.args.join(" ")
    }
}

/// Engine entry point for one command.
pub type Handler = fn(&League, &Invocation) -> Result<CommandOutput, CommandError>;

struct CommandEntry {
    spec: CommandSpec,
    handler: Handler,
}

/// Immutable name → command table.
pub struct CommandRegistry {
    entries: BTreeMap<&'static str, CommandEntry>,
}

impl CommandRegistry {
    /// An empty registry, to be filled with [`CommandRegistry::with`].
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add a command. Later registrations replace earlier ones with the same name.
    pub fn with(mut self, spec: CommandSpec, handler: Handler) -> Self {
        self.entries.insert(spec.name, CommandEntry { spec, handler });
        self
    }

    /// The league commands.
    pub fn standard() -> Self {
        Self::empty()
            .with(
                CommandSpec {
                    name: "standings",
                    description: "Show full league standings",
                    usage: "!standings",
                    arguments: vec![],
                },
                run_standings,
            )
            .with(
                CommandSpec {
                    name: "stats",
                    description: "Show stats for a player",
                    usage: "!stats Allu",
                    arguments: vec![player_arg("player", "The player's name")],
                },
                run_stats,
            )
            .with(
                CommandSpec {
                    name: "remaining",
                    description: "Show remaining matches for a player",
                    usage: "!remaining Allu",
                    arguments: vec![player_arg("player", "The player's name")],
                },
                run_remaining,
            )
            .with(
                CommandSpec {
                    name: "streaks",
                    description: "Show current win or losing streaks",
                    usage: "!streaks win",
                    arguments: vec![ArgumentSpec {
                        name: "type",
                        description: "Type of streak (win or lose)",
                        required: true,
                        choices: &["win", "lose"],
                    }],
                },
                run_streaks,
            )
            .with(
                CommandSpec {
                    name: "pvp",
                    description: "Check head-to-head record between two players",
                    usage: "!pvp Allu vs Bea",
                    arguments: vec![
                        player_arg("player1", "First player"),
                        player_arg("player2", "Second player"),
                    ],
                },
                run_pvp,
            )
            .with(
                CommandSpec {
                    name: "pvp-matrix",
                    description: "Show the full PvP Matrix (Heatmap View)",
                    usage: "!pvp-matrix",
                    arguments: vec![],
                },
                run_pvp_matrix,
            )
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.entries.get(name).map(|e| &e.spec)
    }

    /// Command specs in name order.
    pub fn specs(&self) -> impl Iterator<Item = &CommandSpec> {
        self.entries.values().map(|e| &e.spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run a command against a league.
    pub fn dispatch(
        &self,
        invocation: &Invocation,
        league: &League,
    ) -> Result<CommandOutput, CommandError> {
        let entry = self
            .entries
            .get(invocation.name.as_str())
            .ok_or_else(|| CommandError::UnknownCommand(invocation.name.clone()))?;
        (entry.handler)(league, invocation)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn player_arg(name: &'static str, description: &'static str) -> ArgumentSpec {
    ArgumentSpec {
        name,
        description,
        required: true,
        choices: &[],
    }
}

fn missing(invocation: &Invocation, argument: &'static str, usage: &'static str) -> CommandError {
    CommandError::MissingArgument {
        command: invocation.name.clone(),
        argument,
        usage,
    }
}

fn run_standings(league: &League, _: &Invocation) -> Result<CommandOutput, CommandError> {
    Ok(CommandOutput::Standings(league.standings()))
}

fn run_stats(league: &League, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
    let player = invocation.joined_args();
    if player.is_empty() {
        return Err(missing(invocation, "a player name", "!stats Allu"));
    }
    Ok(CommandOutput::Stats(league.stats(&player)?))
}

fn run_remaining(league: &League, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
    let player = invocation.joined_args();
    if player.is_empty() {
        return Err(missing(invocation, "a player name", "!remaining Allu"));
    }
    Ok(CommandOutput::Remaining(league.remaining(&player)?))
}

fn run_streaks(league: &League, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
    let raw = invocation.joined_args();
    if raw.is_empty() {
        return Err(missing(invocation, "a streak type (win or lose)", "!streaks win"));
    }
    let kind: StreakKind = raw.parse().map_err(|message| CommandError::InvalidArgument {
        command: invocation.name.clone(),
        message,
    })?;
    Ok(CommandOutput::Streaks(league.streaks(kind)))
}

fn run_pvp(league: &League, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
    let (player1, player2) = split_pair(&invocation.args).ok_or_else(|| {
        missing(invocation, "two player names", "!pvp Allu vs Bea")
    })?;
    Ok(CommandOutput::Pvp(league.pvp(&player1, &player2)?))
}

fn run_pvp_matrix(league: &League, _: &Invocation) -> Result<CommandOutput, CommandError> {
    Ok(CommandOutput::PvpMatrix(league.pvp_matrix()))
}

/// Split arguments into two names: around a `vs` token, or exactly two args.
fn split_pair(args: &[String]) -> Option<(String, String)> {
    let separator = args
        .iter()
        .position(|a| matches!(a.to_lowercase().as_str(), "vs" | "vs." | "v"));

    let (left, right) = match separator {
        Some(i) => (args[..i].join(" "), args[i + 1..].join(" ")),
        None if args.len() == 2 => (args[0].clone(), args[1].clone()),
        None => return None,
    };

    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::fixtures::snapshot;
    use crate::calculate::LeagueSettings;
    use pretty_assertions::assert_eq;

    fn league() -> League {
        let snap = snapshot(&[
            ("Alice", "Bob", "Alice"),
            ("Alice", "Carol", "Alice"),
            ("Bob", "Alice", "Bob"),
        ]);
        League::from_snapshot(&snap, LeagueSettings::default()).unwrap()
    }

    fn run(text: &str) -> Result<CommandOutput, CommandError> {
        let registry = CommandRegistry::standard();
        registry.dispatch(&Invocation::parse(text)?, &league())
    }

    #[test]
    fn test_invocation_parse() {
        let inv = Invocation::parse("  !STATS   Mary   Ann ").unwrap();
        assert_eq!(inv.name, "stats");
        assert_eq!(inv.args, vec!["Mary", "Ann"]);

        let inv = Invocation::parse("/pvp-matrix").unwrap();
        assert_eq!(inv.name, "pvp-matrix");
        assert!(inv.args.is_empty());

        assert_eq!(Invocation::parse("   "), Err(CommandError::Empty));
        assert_eq!(Invocation::parse("!"), Err(CommandError::Empty));
    }

    #[test]
    fn test_registry_lists_all_commands() {
        let registry = CommandRegistry::standard();
        let names: Vec<&str> = registry.specs().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["pvp", "pvp-matrix", "remaining", "standings", "stats", "streaks"]
        );
        assert_eq!(registry.get("streaks").unwrap().arguments[0].choices, &["win", "lose"]);
    }

    #[test]
    fn test_registry_can_be_extended() {
        let registry = CommandRegistry::empty().with(
            CommandSpec {
                name: "table",
                description: "Alias for standings",
                usage: "!table",
                arguments: vec![],
            },
            run_standings,
        );
        assert_eq!(registry.len(), 1);
        let out = registry
            .dispatch(&Invocation::parse("!table").unwrap(), &league())
            .unwrap();
        assert!(matches!(out, CommandOutput::Standings(rows) if rows.len() == 3));
    }

    #[test]
    fn test_dispatch_standings_and_stats() {
        let CommandOutput::Standings(rows) = run("!standings").unwrap() else {
            panic!("expected standings");
        };
        assert_eq!(rows[0].name.as_str(), "Alice");

        let CommandOutput::Stats(row) = run("!stats bob").unwrap() else {
            panic!("expected stats");
        };
        assert_eq!(row.rank, 2);
    }

    #[test]
    fn test_dispatch_remaining() {
        let CommandOutput::Remaining(p) = run("!remaining ALICE").unwrap() else {
            panic!("expected progress");
        };
        assert_eq!(p.played, 3);
        assert_eq!(p.total, 10);
    }

    #[test]
    fn test_dispatch_streaks() {
        let CommandOutput::Streaks(report) = run("!streaks win").unwrap() else {
            panic!("expected streaks");
        };
        assert!(matches!(report, StreakReport::Leaders { length: 1, .. }));

        let err = run("!streaks sideways").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArgument { .. }));
    }

    #[test]
    fn test_dispatch_pvp_variants() {
        assert!(matches!(
            run("!pvp alice vs bob").unwrap(),
            CommandOutput::Pvp(HeadToHead::Record { total: 2, .. })
        ));
        assert!(matches!(
            run("!pvp Bob Carol").unwrap(),
            CommandOutput::Pvp(HeadToHead::NoData { .. })
        ));
        assert!(matches!(
            run("!pvp Alice").unwrap_err(),
            CommandError::MissingArgument { .. }
        ));
        assert!(matches!(
            run("!pvp Alice Bob Carol").unwrap_err(),
            CommandError::MissingArgument { .. }
        ));
    }

    #[test]
    fn test_split_pair_multi_word_names() {
        let args: Vec<String> = ["Mary", "Ann", "VS", "Jo", "Lee"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            split_pair(&args),
            Some(("Mary Ann".to_string(), "Jo Lee".to_string()))
        );
        let args = vec!["vs".to_string(), "Jo".to_string()];
        assert_eq!(split_pair(&args), None);
    }

    #[test]
    fn test_dispatch_errors() {
        assert_eq!(
            run("!dance").unwrap_err(),
            CommandError::UnknownCommand("dance".to_string())
        );
        assert_eq!(
            run("!stats").unwrap_err().to_string(),
            "Please provide a player name. Example: `!stats Allu`"
        );
        assert_eq!(
            run("!remaining Zed").unwrap_err(),
            CommandError::Engine(EngineError::PlayerNotFound("Zed".to_string()))
        );
    }

    #[test]
    fn test_output_serializes_with_command_tag() {
        let out = run("!pvp-matrix").unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["command"], "pvp-matrix");
        assert_eq!(json["result"]["status"], "grid");
    }
}
