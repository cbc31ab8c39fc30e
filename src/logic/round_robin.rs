//! Single round-robin generation (circle method).

use crate::models::{CalendarMatch, Round};

/// Generate every round ("journée") of a single round-robin between `teams`.
///
/// Odd rosters get a bye slot pinned at position 0; the team facing it in a round is that
/// round's `exempt`. Even rosters pin the first team instead. Each round pairs position `i`
/// (home) with position `n - 1 - i` (away), then every slot but the pinned one rotates one
/// step to the right.
///
/// 0 teams give no rounds, 1 team gives a single exempt-only round.
pub fn generate_round_robin<S: AsRef<str>>(teams: &[S]) -> Vec<Round> {
    let mut slots: Vec<Option<&str>> = teams.iter().map(|t| Some(t.as_ref())).collect();
    if slots.len() % 2 == 1 {
        slots.insert(0, None);
    }
    let n = slots.len();
    if n == 0 {
        return Vec::new();
    }

    log::debug!("Generating round-robin for {} team(s), {} round(s)", teams.len(), n - 1);

    let mut rounds = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let mut matches = Vec::with_capacity(n / 2);
        let mut exempt = None;
        for i in 0..n / 2 {
            match (slots[i], slots[n - 1 - i]) {
                (Some(home), Some(away)) => matches.push(CalendarMatch::new(home, away)),
                (Some(team), None) | (None, Some(team)) => exempt = Some(team.to_string()),
                (None, None) => {}
            }
        }
        rounds.push(Round {
            n: round as u32 + 1,
            matches,
            exempt,
        });
        slots[1..].rotate_right(1);
    }
    rounds
}
