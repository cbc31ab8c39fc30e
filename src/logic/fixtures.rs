//! Turn saved calendars into allocator input.

use crate::models::{Calendar, Fixture, ScheduledFixture};
use std::collections::HashSet;

/// Every unplayed calendar match as a [`Fixture`], with its pool and journée.
///
/// With `journee` set, only that round number is collected. Pairs already present in
/// `existing` (same category and teams) are left out so they are never booked twice.
pub fn collect_unscheduled_fixtures<'a, I>(
    calendars: I,
    journee: Option<u32>,
    existing: &[ScheduledFixture],
) -> Vec<Fixture>
where
    I: IntoIterator<Item = &'a Calendar>,
{
    let booked: HashSet<_> = existing.iter().map(|s| s.fixture.pairing_key()).collect();
    let mut fixtures = Vec::new();

    for calendar in calendars {
        let structure = &calendar.structure;
        for pool_index in 0..structure.pool_count() {
            let Some(rounds) = structure.rounds(pool_index) else {
                continue;
            };
            let pool = structure.pool_name(pool_index).map(str::to_string);
            for round in rounds.iter().filter(|r| journee.map_or(true, |j| r.n == j)) {
                for m in round.matches.iter().filter(|m| !m.is_played()) {
                    let fixture = Fixture {
                        category: calendar.category.clone(),
                        home_team: m.home_team.clone(),
                        away_team: m.away_team.clone(),
                        pool: pool.clone(),
                        journee: Some(round.n),
                        calendar_id: Some(calendar.id),
                    };
                    if !booked.contains(&fixture.pairing_key()) {
                        fixtures.push(fixture);
                    }
                }
            }
        }
    }
    fixtures
}
