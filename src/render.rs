//! Text and heatmap presentation of engine results.
//!
//! Replies are formatted for a chat channel (Markdown bold, emoji headers).
//! The heatmap helpers turn a matrix into labelled, coloured cells for an
//! image or HTML renderer.

use std::fmt::Write as _;

use serde::Serialize;

use crate::calculate::{HeadToHead, Progress, StreakKind, StreakReport};
use crate::commands::{CommandError, CommandOutput};
use crate::models::{CellValue, Matrix, PvpMatrix, StandingsRow};

const BAR_WIDTH: u32 = 10;

/// Render a command result as a chat reply.
pub fn render_output(output: &CommandOutput, league_name: &str) -> String {
    match output {
        CommandOutput::Standings(rows) => render_standings(rows, league_name, false),
        CommandOutput::Stats(row) => render_stats(row),
        CommandOutput::Remaining(progress) => render_progress(progress),
        CommandOutput::Streaks(report) => render_streaks(report),
        CommandOutput::Pvp(h2h) => render_pvp(h2h),
        CommandOutput::PvpMatrix(matrix) => render_matrix(matrix),
    }
}

/// Render a command error as a user-facing reply.
pub fn render_error(err: &CommandError) -> String {
    match err {
        CommandError::UnknownCommand(name) => format!(
            "Unknown command \"{}\". Try !standings, !stats, !remaining, !streaks, !pvp or !pvp-matrix.",
            name
        ),
        other => other.to_string(),
    }
}

/// Format a number without a trailing `.0` for whole values.
fn number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn percent(n: f64) -> String {
    format!("{}%", number(n))
}

pub fn render_standings(rows: &[StandingsRow], league_name: &str, updated: bool) -> String {
    if rows.is_empty() {
        return "No standings data available yet.".to_string();
    }

    let mut reply = if updated {
        format!("🏆 **{} Standings (Updated)** 🏆\n", league_name)
    } else {
        format!("🏆 **{} Standings** 🏆\n", league_name)
    };
    for row in rows {
        let _ = writeln!(
            reply,
            "{}. {} — {} pts — Match W%: {} — Game W%: {}",
            row.rank,
            row.name,
            number(row.points),
            percent(row.match_win_pct),
            percent(row.game_win_pct)
        );
    }
    reply
}

pub fn render_stats(row: &StandingsRow) -> String {
    format!(
        "📊 Stats for **{}**:\nRank: {}\nPoints: {}\nMatches Played: {}\nMatches Won: {}\nGames Won: {}\nMatch Win%: {}\nGame Win%: {}",
        row.name,
        row.rank,
        number(row.points),
        row.matches_played,
        row.matches_won,
        row.games_won,
        percent(row.match_win_pct),
        percent(row.game_win_pct)
    )
}

/// Ten-cell progress bar; one cell per 10%.
pub fn progress_bar(percent: u32) -> String {
    let filled = ((percent as f64 / 10.0).round() as u32).min(BAR_WIDTH);
    let mut bar = "█".repeat(filled as usize);
    bar.push_str(&"░".repeat((BAR_WIDTH - filled) as usize));
    bar
}

pub fn render_progress(progress: &Progress) -> String {
    let mut reply = format!("🎯 **Match Progress for {}**\n\n", progress.player);
    let _ = writeln!(
        reply,
        "Matches Completed: **{}/{}** ({}%)",
        progress.played, progress.total, progress.percent
    );
    let _ = writeln!(reply, "Progress: `{}`\n", progress_bar(progress.percent));

    if progress.per_opponent.is_empty() {
        reply.push_str("No opponents registered yet.\n");
        return reply;
    }

    let _ = writeln!(
        reply,
        "**Remaining Matches vs Each Opponent (out of {}):**\n",
        progress.match_cap
    );
    for item in &progress.per_opponent {
        let _ = writeln!(
            reply,
            "• vs **{}** — {} remaining",
            item.opponent, item.remaining
        );
    }
    reply
}

pub fn render_streaks(report: &StreakReport) -> String {
    match report {
        StreakReport::NoActiveStreak { kind } => {
            format!("No active {} streaks right now.", kind)
        }
        StreakReport::Leaders {
            kind,
            length,
            players,
        } => {
            let (icon, label) = match kind {
                StreakKind::Win => ("🔥", "Win"),
                StreakKind::Lose => ("🧊", "Losing"),
            };
            let mut reply = format!(
                "{} **Longest Active {} Streak: {}** {}\n",
                icon, label, length, icon
            );
            for player in players {
                let _ = writeln!(reply, "• {}", player);
            }
            reply
        }
    }
}

fn wins_label(wins: u32) -> &'static str {
    if wins == 1 {
        "win"
    } else {
        "wins"
    }
}

pub fn render_pvp(h2h: &HeadToHead) -> String {
    match h2h {
        HeadToHead::NoData { first, second } => {
            format!("No matches recorded between {} and {}.", first, second)
        }
        HeadToHead::Record {
            first,
            second,
            total,
        } => format!(
            "⚔️ **{} vs {}** ⚔️\n{}: {} {} ({}%)\n{}: {} {} ({}%)\nTotal matches: {}",
            first.player,
            second.player,
            first.player,
            first.wins,
            wins_label(first.wins),
            first.percent,
            second.player,
            second.wins,
            wins_label(second.wins),
            second.percent,
            total
        ),
    }
}

/// Short label for a matrix cell.
pub fn cell_label(value: &CellValue) -> String {
    match value {
        CellValue::NotApplicable => "—".to_string(),
        CellValue::NoData => "·".to_string(),
        CellValue::Record { wins, win_pct, .. } => {
            format!("{} ({}%)", wins, win_pct.round() as i64)
        }
    }
}

pub fn render_matrix(matrix: &PvpMatrix) -> String {
    let PvpMatrix::Grid(grid) = matrix else {
        return "Not enough players for a PvP matrix yet.".to_string();
    };

    let labels: Vec<Vec<String>> = grid
        .rows
        .iter()
        .map(|row| row.iter().map(|c| cell_label(&c.value)).collect())
        .collect();

    let name_width = grid
        .players
        .iter()
        .map(|p| p.as_str().chars().count())
        .max()
        .unwrap_or(0);
    let col_width = grid
        .players
        .iter()
        .map(|p| p.as_str().chars().count())
        .chain(labels.iter().flatten().map(|l| l.chars().count()))
        .max()
        .unwrap_or(0);

    let mut out = String::from("```\n");
    let _ = write!(out, "{:name_width$}", "");
    for player in &grid.players {
        let _ = write!(out, " | {:^col_width$}", player.as_str());
    }
    out.push('\n');
    for (player, row) in grid.players.iter().zip(&labels) {
        let _ = write!(out, "{:<name_width$}", player.as_str());
        for label in row {
            let _ = write!(out, " | {:^col_width$}", label);
        }
        out.push('\n');
    }
    out.push_str("```");
    out
}

/// An RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Colour for cells without a percentage.
pub const NEUTRAL: Rgb = Rgb(200, 200, 200);

const LOW: Rgb = Rgb(214, 69, 65);
const MID: Rgb = Rgb(244, 208, 63);
const HIGH: Rgb = Rgb(46, 204, 113);

fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Red at 0%, yellow at 50%, green at 100%.
pub fn heat_color(win_pct: f64) -> Rgb {
    let t = (win_pct / 100.0).clamp(0.0, 1.0);
    if t <= 0.5 {
        lerp(LOW, MID, t * 2.0)
    } else {
        lerp(MID, HIGH, (t - 0.5) * 2.0)
    }
}

/// One rendered heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub label: String,
    pub color: String,
}

/// A matrix ready for an image or HTML renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub players: Vec<String>,
    pub cells: Vec<Vec<HeatCell>>,
}

pub fn heatmap(matrix: &Matrix) -> Heatmap {
    let cells = matrix
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| {
                    let color = match cell.win_pct() {
                        Some(pct) => heat_color(pct),
                        None => NEUTRAL,
                    };
                    HeatCell {
                        label: cell_label(&cell.value),
                        color: color.hex(),
                    }
                })
                .collect()
        })
        .collect();

    Heatmap {
        players: matrix.players.iter().map(|p| p.to_string()).collect(),
        cells,
    }
}
