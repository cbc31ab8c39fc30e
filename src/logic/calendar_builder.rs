//! Build full category calendars (category -> pools -> rounds -> matches) from team rosters.

use crate::logic::round_robin::generate_round_robin;
use crate::models::{
    Calendar, CalendarGeneration, CalendarMatch, CalendarStructure, CalendarWarning, Category,
    LeagueError, Pool, Round, Team,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

/// Generate one calendar per category.
///
/// Teams are matched to categories by name and to pools by label, keeping roster order.
/// Pools with fewer than 2 teams are emitted without rounds and reported as warnings; they
/// never stop sibling pools or categories from being generated.
pub fn generate_complete_calendar_structure(
    categories: &[Category],
    teams: &[Team],
) -> CalendarGeneration {
    let mut generation = CalendarGeneration::default();

    for category in categories {
        let roster: Vec<&Team> = teams.iter().filter(|t| t.category == category.name).collect();

        let structure = if category.has_poules {
            let pools = category
                .pools
                .iter()
                .map(|label| {
                    let members: Vec<String> = roster
                        .iter()
                        .filter(|t| t.pool.as_deref() == Some(label.as_str()))
                        .map(|t| t.name.clone())
                        .collect();
                    let rounds =
                        pool_rounds(&category.name, Some(label), &members, &mut generation.warnings);
                    Pool {
                        name: label.clone(),
                        teams: members,
                        rounds,
                    }
                })
                .collect();

            for team in &roster {
                let placed = team.pool.as_deref().is_some_and(|p| category.has_pool(p));
                if !placed {
                    log::warn!("{}: team {} has no valid pool, left out", category.name, team.name);
                    generation.warnings.push(CalendarWarning::TeamWithoutPool {
                        category: category.name.clone(),
                        team: team.name.clone(),
                    });
                }
            }

            CalendarStructure::Pooled { pools }
        } else {
            let members: Vec<String> = roster.iter().map(|t| t.name.clone()).collect();
            let rounds = pool_rounds(&category.name, None, &members, &mut generation.warnings);
            CalendarStructure::Single {
                teams: members,
                rounds,
            }
        };

        generation
            .calendars
            .push(Calendar::new(category.name.clone(), structure));
    }

    log::debug!(
        "Generated {} calendar(s) with {} warning(s)",
        generation.calendars.len(),
        generation.warnings.len()
    );
    generation
}

fn pool_rounds(
    category: &str,
    pool: Option<&str>,
    members: &[String],
    warnings: &mut Vec<CalendarWarning>,
) -> Vec<Round> {
    if members.len() < 2 {
        log::warn!(
            "{} {}: {} team(s), cannot build a round-robin",
            category,
            pool.unwrap_or("-"),
            members.len()
        );
        warnings.push(CalendarWarning::PoolSkipped {
            category: category.to_string(),
            pool: pool.map(str::to_string),
            team_count: members.len(),
        });
        return Vec::new();
    }
    generate_round_robin(members)
}

/// Reorder a roster with a seeded shuffle, so "random" draws can be replayed.
pub fn shuffle_roster(teams: &[Team], seed: u64) -> Vec<Team> {
    let mut shuffled = teams.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
    shuffled
}

/// Check a calendar submitted from outside before it is stored.
///
/// In every pool: rounds are numbered 1..=len, matches only involve pool members, nobody
/// plays itself, the exempt team (if any) is a member that does not play in its round and
/// no pair of teams meets twice. Pool labels are unique and playoff matches only involve
/// teams of the calendar.
pub fn validate_calendar(calendar: &Calendar) -> Result<(), LeagueError> {
    if let CalendarStructure::Pooled { pools } = &calendar.structure {
        let mut labels = HashSet::new();
        for pool in pools {
            if !labels.insert(pool.name.to_lowercase()) {
                return Err(LeagueError::DuplicatePool(pool.name.clone()));
            }
        }
    }

    for pool_index in 0..calendar.structure.pool_count() {
        let teams = calendar.structure.teams(pool_index).unwrap_or_default();
        let rounds = calendar.structure.rounds(pool_index).unwrap_or_default();
        let members: HashSet<&str> = teams.iter().map(String::as_str).collect();
        let mut pairs = HashSet::new();

        for (i, round) in rounds.iter().enumerate() {
            let expected = i as u32 + 1;
            if round.n != expected {
                return Err(LeagueError::InvalidRoundNumber {
                    expected,
                    found: round.n,
                });
            }
            if let Some(exempt) = &round.exempt {
                if !members.contains(exempt.as_str()) {
                    return Err(LeagueError::TeamNotInPool(exempt.clone()));
                }
                if round.matches.iter().any(|m| m.involves(exempt)) {
                    return Err(LeagueError::ExemptPlaying(exempt.clone()));
                }
            }
            for m in &round.matches {
                check_match(m, &members)?;
                if !pairs.insert(unordered_pair(m)) {
                    return Err(LeagueError::RepeatedPairing {
                        home: m.home_team.clone(),
                        away: m.away_team.clone(),
                    });
                }
            }
        }
    }

    let everyone: HashSet<&str> = calendar.structure.all_teams().into_iter().collect();
    for m in calendar.playoffs.iter().flat_map(|p| p.matches.iter()) {
        check_match(m, &everyone)?;
    }
    Ok(())
}

fn check_match(m: &CalendarMatch, members: &HashSet<&str>) -> Result<(), LeagueError> {
    if m.home_team == m.away_team {
        return Err(LeagueError::SelfMatch(m.home_team.clone()));
    }
    for team in [&m.home_team, &m.away_team] {
        if !members.contains(team.as_str()) {
            return Err(LeagueError::TeamNotInPool(team.clone()));
        }
    }
    Ok(())
}

fn unordered_pair(m: &CalendarMatch) -> (&str, &str) {
    if m.home_team <= m.away_team {
        (m.home_team.as_str(), m.away_team.as_str())
    } else {
        (m.away_team.as_str(), m.home_team.as_str())
    }
}
