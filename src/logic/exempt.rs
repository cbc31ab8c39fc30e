//! Change which team is exempt in a given round of an odd-sized pool.

use crate::logic::round_robin::generate_round_robin;
use crate::models::{Calendar, CalendarMatch, CalendarWarning, LeagueError, Round};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Updated calendar plus any non-fatal adjustment made on the way.
#[derive(Clone, Debug, Serialize)]
pub struct ExemptReassignment {
    pub calendar: Calendar,
    pub warnings: Vec<CalendarWarning>,
}

/// Make `new_exempt` the exempt team of round `round_index` (0-based) in pool `pool_index`.
///
/// In a circle-method round-robin with a bye, the whole content of a round is fixed by its
/// exempt team. The pool is regenerated, the current exempt order is kept except that the
/// target round and the round where `new_exempt` sat out swap places, and each round is
/// rebuilt from the generated round with the matching exempt. Every team stays exempt
/// exactly once and meets every other team exactly once. Stored matches (home/away and
/// recorded results) follow their team pair.
///
/// If the stored exempt order is not a permutation of the pool, the generated order is used
/// instead and an [`CalendarWarning::ExemptOrderRebuilt`] is returned.
pub fn reassign_exempt(
    calendar: &Calendar,
    pool_index: usize,
    round_index: usize,
    new_exempt: &str,
) -> Result<ExemptReassignment, LeagueError> {
    let structure = &calendar.structure;
    let teams = structure
        .teams(pool_index)
        .ok_or(LeagueError::PoolNotFound(pool_index))?;
    let rounds = structure
        .rounds(pool_index)
        .ok_or(LeagueError::PoolNotFound(pool_index))?;

    if !teams.iter().any(|t| t == new_exempt) {
        return Err(LeagueError::TeamNotInPool(new_exempt.to_string()));
    }
    if teams.len() % 2 == 0 {
        return Err(LeagueError::EvenPool);
    }
    let target = rounds
        .get(round_index)
        .ok_or(LeagueError::RoundNotFound(round_index))?;

    if target.exempt.as_deref() == Some(new_exempt) {
        return Ok(ExemptReassignment {
            calendar: calendar.clone(),
            warnings: Vec::new(),
        });
    }

    let generated = generate_round_robin(teams);
    let mut warnings = Vec::new();

    let mut order: Vec<String> = rounds.iter().filter_map(|r| r.exempt.clone()).collect();
    if order.len() != rounds.len() || !is_permutation(&order, teams) {
        log::warn!(
            "{}: stored exempt order is inconsistent, rebuilding from a fresh rotation",
            calendar.category
        );
        warnings.push(CalendarWarning::ExemptOrderRebuilt {
            category: calendar.category.clone(),
            pool: structure.pool_name(pool_index).map(str::to_string),
        });
        order = generated.iter().filter_map(|r| r.exempt.clone()).collect();
    }

    if round_index >= order.len() {
        return Err(LeagueError::RoundNotFound(round_index));
    }
    let previous_round = order
        .iter()
        .position(|t| t == new_exempt)
        .ok_or_else(|| LeagueError::TeamNotInPool(new_exempt.to_string()))?;
    order.swap(round_index, previous_round);

    let mut by_exempt: HashMap<String, Vec<CalendarMatch>> = generated
        .into_iter()
        .filter_map(|r| r.exempt.map(|e| (e, r.matches)))
        .collect();

    let new_rounds = order
        .into_iter()
        .enumerate()
        .map(|(i, exempt)| {
            let matches = by_exempt
                .remove(&exempt)
                .ok_or_else(|| LeagueError::TeamNotInPool(exempt.clone()))?
                .into_iter()
                .map(|m| carry_result(m, rounds))
                .collect();
            Ok(Round {
                n: i as u32 + 1,
                matches,
                exempt: Some(exempt),
            })
        })
        .collect::<Result<Vec<_>, LeagueError>>()?;

    let mut updated = calendar.clone();
    if let Some(slot) = updated.structure.rounds_mut(pool_index) {
        *slot = new_rounds;
    }

    log::debug!(
        "{}: round {} exempt is now {}",
        calendar.category,
        round_index + 1,
        new_exempt
    );
    Ok(ExemptReassignment {
        calendar: updated,
        warnings,
    })
}

fn is_permutation(order: &[String], teams: &[String]) -> bool {
    let seen: HashSet<&str> = order.iter().map(String::as_str).collect();
    order.len() == teams.len()
        && seen.len() == order.len()
        && teams.iter().all(|t| seen.contains(t.as_str()))
}

/// Reuse the stored match for the same pair, keeping its home/away and any recorded result.
fn carry_result(generated: CalendarMatch, old_rounds: &[Round]) -> CalendarMatch {
    old_rounds
        .iter()
        .flat_map(|r| r.matches.iter())
        .find(|m| m.same_pairing(&generated))
        .cloned()
        .unwrap_or(generated)
}
