//! Manually built playoff rounds.

use crate::models::{Calendar, CalendarMatch, LeagueError, PlayoffRound};

/// Append a named playoff round. Every team must belong to the calendar.
pub fn add_playoff_round(
    calendar: &Calendar,
    name: &str,
    matches: Vec<CalendarMatch>,
) -> Result<Calendar, LeagueError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeagueError::EmptyName);
    }
    let members = calendar.structure.all_teams();
    for m in &matches {
        if m.home_team == m.away_team {
            return Err(LeagueError::SelfMatch(m.home_team.clone()));
        }
        for team in [&m.home_team, &m.away_team] {
            if !members.contains(&team.as_str()) {
                return Err(LeagueError::TeamNotInPool(team.clone()));
            }
        }
    }

    let mut updated = calendar.clone();
    updated.playoffs.push(PlayoffRound {
        name: name.to_string(),
        matches,
    });
    Ok(updated)
}
