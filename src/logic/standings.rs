//! Result entry on calendar matches and pool standings.

use crate::models::{Calendar, CalendarStructure, Forfeit, LeagueError, Round};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ranking points for a win (FIBA).
pub const POINTS_WIN: u32 = 2;
/// Ranking points for a loss on the court.
pub const POINTS_LOSS: u32 = 1;
/// Ranking points for a forfeit loss.
pub const POINTS_FORFEIT: u32 = 0;
/// Score recorded for a forfeit (winner, loser).
pub const FORFEIT_SCORE: (u32, u32) = (20, 0);
/// Highest score accepted for one team in one match.
pub const MAX_SCORE: u32 = 300;

/// Result to record on a calendar match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchResult {
    Score { home: u32, away: u32 },
    /// The given side forfeited; the other side wins 20-0.
    Forfeit { side: Forfeit },
}

/// Record a result on match `match_index` of round `round_index` (both 0-based).
/// Returns the updated calendar; the input is left untouched.
pub fn record_result(
    calendar: &Calendar,
    pool_index: usize,
    round_index: usize,
    match_index: usize,
    result: MatchResult,
) -> Result<Calendar, LeagueError> {
    let mut updated = calendar.clone();
    let rounds = updated
        .structure
        .rounds_mut(pool_index)
        .ok_or(LeagueError::PoolNotFound(pool_index))?;
    let round = rounds
        .get_mut(round_index)
        .ok_or(LeagueError::RoundNotFound(round_index))?;
    let m = round
        .matches
        .get_mut(match_index)
        .ok_or(LeagueError::CalendarMatchNotFound(match_index))?;

    match result {
        MatchResult::Score { home, away } => {
            if home == away {
                return Err(LeagueError::TiedScore);
            }
            if let Some(score) = [home, away].into_iter().find(|s| *s > MAX_SCORE) {
                return Err(LeagueError::ScoreOutOfRange(score));
            }
            m.home_score = Some(home);
            m.away_score = Some(away);
            m.forfeit = None;
        }
        MatchResult::Forfeit { side } => {
            let (winner, loser) = FORFEIT_SCORE;
            let (home, away) = match side {
                Forfeit::Home => (loser, winner),
                Forfeit::Away => (winner, loser),
            };
            m.home_score = Some(home);
            m.away_score = Some(away);
            m.forfeit = Some(side);
        }
    }
    Ok(updated)
}

/// One line of a standings table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct StandingRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub forfeits: u32,
    pub points_for: u32,
    pub points_against: u32,
    pub point_diff: i64,
    pub ranking_points: u32,
}

/// Standings of one pool (`pool` is `None` for a poolless category).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolStandings {
    pub pool: Option<String>,
    pub rows: Vec<StandingRow>,
}

/// Rank the teams of a pool from its played matches.
/// Order: ranking points, point difference, points scored (all descending), then name.
pub fn compute_standings(teams: &[String], rounds: &[Round]) -> Vec<StandingRow> {
    let mut rows: HashMap<&str, StandingRow> = teams
        .iter()
        .map(|t| {
            (
                t.as_str(),
                StandingRow {
                    team: t.clone(),
                    ..StandingRow::default()
                },
            )
        })
        .collect();

    for m in rounds.iter().flat_map(|r| r.matches.iter()) {
        let (Some(home_score), Some(away_score)) = (m.home_score, m.away_score) else {
            continue;
        };
        if home_score == away_score {
            continue;
        }
        let home_won = home_score > away_score;
        let sides = [
            (m.home_team.as_str(), home_score, away_score, home_won, m.forfeit == Some(Forfeit::Home)),
            (m.away_team.as_str(), away_score, home_score, !home_won, m.forfeit == Some(Forfeit::Away)),
        ];
        for (team, scored, conceded, won, forfeited) in sides {
            let Some(row) = rows.get_mut(team) else {
                continue;
            };
            row.played += 1;
            row.points_for = row.points_for.saturating_add(scored);
            row.points_against = row.points_against.saturating_add(conceded);
            if won {
                row.won += 1;
                row.ranking_points += POINTS_WIN;
            } else if forfeited {
                row.lost += 1;
                row.forfeits += 1;
                row.ranking_points += POINTS_FORFEIT;
            } else {
                row.lost += 1;
                row.ranking_points += POINTS_LOSS;
            }
        }
    }

    let mut table: Vec<StandingRow> = rows
        .into_values()
        .map(|mut row| {
            row.point_diff = i64::from(row.points_for) - i64::from(row.points_against);
            row
        })
        .collect();
    table.sort_by(|a, b| {
        b.ranking_points
            .cmp(&a.ranking_points)
            .then(b.point_diff.cmp(&a.point_diff))
            .then(b.points_for.cmp(&a.points_for))
            .then(a.team.cmp(&b.team))
    });
    table
}

/// Standings for every pool of a calendar.
pub fn calendar_standings(calendar: &Calendar) -> Vec<PoolStandings> {
    match &calendar.structure {
        CalendarStructure::Pooled { pools } => pools
            .iter()
            .map(|p| PoolStandings {
                pool: Some(p.name.clone()),
                rows: compute_standings(&p.teams, &p.rounds),
            })
            .collect(),
        CalendarStructure::Single { teams, rounds } => vec![PoolStandings {
            pool: None,
            rows: compute_standings(teams, rounds),
        }],
    }
}
