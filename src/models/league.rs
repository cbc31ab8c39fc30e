//! League: the in-memory aggregate of categories, teams, calendars, weekly schedules and matches.

use crate::logic::{self, ExemptReassignment, MatchResult};
use crate::models::{
    AllocationOptions, AllocationOutcome, Calendar, CalendarGeneration, CalendarId, CalendarMatch,
    CalendarWarning, Category, CategoryId, LeagueError, LeagueMatch, MatchId, MatchStatus, ScheduleId,
    ScheduledFixture, Team, TeamId, WeeklySchedule,
};
use serde::{Deserialize, Serialize};
use std::io::Read;
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct League {
    pub categories: Vec<Category>,
    pub teams: Vec<Team>,
    /// Saved calendars (version >= 1).
    pub calendars: Vec<Calendar>,
    pub schedules: Vec<WeeklySchedule>,
    pub matches: Vec<LeagueMatch>,
}

fn check_version(calendar: &Calendar, expected: Option<u32>) -> Result<(), LeagueError> {
    match expected {
        Some(expected) if expected != calendar.version => Err(LeagueError::VersionConflict {
            expected,
            found: calendar.version,
        }),
        _ => Ok(()),
    }
}

fn clean_name(name: &str) -> Result<&str, LeagueError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeagueError::EmptyName);
    }
    Ok(name)
}

// Categories and teams
impl League {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Add a category. Names and pool labels are unique (case-insensitive); pools make it a
    /// pooled category.
    pub fn add_category(&mut self, name: &str, pools: Vec<String>) -> Result<&Category, LeagueError> {
        let name = clean_name(name)?;
        if self.categories.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(LeagueError::DuplicateCategory);
        }
        let pools: Vec<String> = pools
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        for (i, pool) in pools.iter().enumerate() {
            if pools[..i].iter().any(|p| p.eq_ignore_ascii_case(pool)) {
                return Err(LeagueError::DuplicatePool(pool.clone()));
            }
        }
        let category = if pools.is_empty() {
            Category::new(name)
        } else {
            Category::with_pools(name, pools)
        };
        self.categories.push(category);
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Remove a category that no team references anymore.
    pub fn remove_category(&mut self, id: CategoryId) -> Result<(), LeagueError> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| LeagueError::CategoryNotFound(id.to_string()))?;
        let name = &self.categories[idx].name;
        if self.teams.iter().any(|t| &t.category == name) {
            return Err(LeagueError::CategoryInUse(name.clone()));
        }
        self.categories.remove(idx);
        Ok(())
    }

    /// Check category/pool membership rules and name uniqueness for a team.
    fn validate_team(
        &self,
        name: &str,
        category: &str,
        pool: Option<&str>,
        ignore: Option<TeamId>,
    ) -> Result<(), LeagueError> {
        let cat = self
            .category(category)
            .ok_or_else(|| LeagueError::CategoryNotFound(category.to_string()))?;
        if cat.has_poules {
            let pool = pool.unwrap_or_default();
            if !cat.has_pool(pool) {
                return Err(LeagueError::UnknownPool {
                    category: category.to_string(),
                    pool: pool.to_string(),
                });
            }
        }
        let is_duplicate = self.teams.iter().any(|t| {
            Some(t.id) != ignore && t.category == category && t.name.eq_ignore_ascii_case(name)
        });
        if is_duplicate {
            return Err(LeagueError::DuplicateTeam);
        }
        Ok(())
    }

    pub fn add_team(
        &mut self,
        name: &str,
        category: &str,
        pool: Option<&str>,
    ) -> Result<&Team, LeagueError> {
        let name = clean_name(name)?;
        let pool = pool.map(str::trim).filter(|p| !p.is_empty());
        self.validate_team(name, category, pool, None)?;
        let has_poules = self.category(category).is_some_and(|c| c.has_poules);
        let team = match pool {
            Some(pool) if has_poules => Team::in_pool(name, category, pool),
            _ => Team::new(name, category),
        };
        self.teams.push(team);
        Ok(&self.teams[self.teams.len() - 1])
    }

    /// Roster correction: rename a team or move it to another category/pool.
    pub fn update_team(
        &mut self,
        id: TeamId,
        name: &str,
        category: &str,
        pool: Option<&str>,
    ) -> Result<&Team, LeagueError> {
        let name = clean_name(name)?;
        let pool = pool.map(str::trim).filter(|p| !p.is_empty());
        self.validate_team(name, category, pool, Some(id))?;
        let has_poules = self.category(category).is_some_and(|c| c.has_poules);
        let team = self
            .teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(LeagueError::TeamNotFound(id))?;
        team.name = name.to_string();
        team.category = category.to_string();
        team.pool = if has_poules { pool.map(str::to_string) } else { None };
        Ok(team)
    }

    pub fn remove_team(&mut self, id: TeamId) -> Result<(), LeagueError> {
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == id)
            .ok_or(LeagueError::TeamNotFound(id))?;
        self.teams.remove(idx);
        Ok(())
    }

    /// Import a `name,category,pool` CSV. All rows are validated before any is added.
    pub fn import_teams_csv<R: Read>(&mut self, reader: R) -> Result<usize, LeagueError> {
        let rows = logic::teams_from_csv(reader)?;
        let mut staged = self.clone();
        for row in &rows {
            staged.add_team(&row.name, &row.category, row.pool.as_deref())?;
        }
        self.teams = staged.teams;
        log::info!("Imported {} team(s) from CSV", rows.len());
        Ok(rows.len())
    }
}

// Calendars
impl League {
    /// Generate (without saving) calendars for the named categories, or for all of them.
    /// With a seed, each category's roster is shuffled reproducibly first.
    pub fn generate_calendars(
        &self,
        category_names: Option<&[String]>,
        seed: Option<u64>,
    ) -> Result<CalendarGeneration, LeagueError> {
        let categories: Vec<Category> = match category_names {
            Some(names) => names
                .iter()
                .map(|n| {
                    self.category(n)
                        .cloned()
                        .ok_or_else(|| LeagueError::CategoryNotFound(n.clone()))
                })
                .collect::<Result<_, _>>()?,
            None => self.categories.clone(),
        };
        let roster = match seed {
            Some(seed) => logic::shuffle_roster(&self.teams, seed),
            None => self.teams.clone(),
        };
        Ok(logic::generate_complete_calendar_structure(&categories, &roster))
    }

    pub fn calendar(&self, id: CalendarId) -> Result<&Calendar, LeagueError> {
        self.calendars
            .iter()
            .find(|c| c.id == id)
            .ok_or(LeagueError::CalendarNotFound(id))
    }

    fn calendar_index(&self, id: CalendarId) -> Result<usize, LeagueError> {
        self.calendars
            .iter()
            .position(|c| c.id == id)
            .ok_or(LeagueError::CalendarNotFound(id))
    }

    /// Save an approved generated calendar (one per category). It becomes version 1.
    pub fn save_calendar(&mut self, mut calendar: Calendar) -> Result<&Calendar, LeagueError> {
        if self.category(&calendar.category).is_none() {
            return Err(LeagueError::CategoryNotFound(calendar.category));
        }
        logic::validate_calendar(&calendar)?;
        if self.calendars.iter().any(|c| c.category == calendar.category) {
            return Err(LeagueError::DuplicateCalendar(calendar.category));
        }
        if self.calendars.iter().any(|c| c.id == calendar.id) {
            calendar.id = Uuid::new_v4();
        }
        calendar.version = 1;
        log::info!("Saved calendar for {}", calendar.category);
        self.calendars.push(calendar);
        Ok(&self.calendars[self.calendars.len() - 1])
    }

    /// Replace a saved calendar. `expected_version` guards against lost updates.
    pub fn replace_calendar(
        &mut self,
        id: CalendarId,
        mut calendar: Calendar,
        expected_version: Option<u32>,
    ) -> Result<&Calendar, LeagueError> {
        let idx = self.calendar_index(id)?;
        let current = &self.calendars[idx];
        check_version(current, expected_version)?;
        logic::validate_calendar(&calendar)?;
        calendar.id = id;
        calendar.category = current.category.clone();
        calendar.version = current.version + 1;
        self.calendars[idx] = calendar;
        Ok(&self.calendars[idx])
    }

    pub fn delete_calendar(&mut self, id: CalendarId) -> Result<(), LeagueError> {
        let idx = self.calendar_index(id)?;
        self.calendars.remove(idx);
        Ok(())
    }

    /// Apply `edit` to a copy of calendar `id` and store the result as the next version.
    fn edit_calendar<F, T>(
        &mut self,
        id: CalendarId,
        expected_version: Option<u32>,
        edit: F,
    ) -> Result<(&Calendar, T), LeagueError>
    where
        F: FnOnce(&Calendar) -> Result<(Calendar, T), LeagueError>,
    {
        let idx = self.calendar_index(id)?;
        check_version(&self.calendars[idx], expected_version)?;
        let (mut updated, extra) = edit(&self.calendars[idx])?;
        if updated != self.calendars[idx] {
            updated.version = self.calendars[idx].version + 1;
            self.calendars[idx] = updated;
        }
        Ok((&self.calendars[idx], extra))
    }

    pub fn reassign_exempt(
        &mut self,
        id: CalendarId,
        expected_version: Option<u32>,
        pool_index: usize,
        round_index: usize,
        team: &str,
    ) -> Result<(&Calendar, Vec<CalendarWarning>), LeagueError> {
        self.edit_calendar(id, expected_version, |c| {
            let ExemptReassignment { calendar, warnings } =
                logic::reassign_exempt(c, pool_index, round_index, team)?;
            Ok((calendar, warnings))
        })
    }

    pub fn record_calendar_result(
        &mut self,
        id: CalendarId,
        expected_version: Option<u32>,
        pool_index: usize,
        round_index: usize,
        match_index: usize,
        result: MatchResult,
    ) -> Result<&Calendar, LeagueError> {
        self.edit_calendar(id, expected_version, |c| {
            Ok((logic::record_result(c, pool_index, round_index, match_index, result)?, ()))
        })
        .map(|(c, ())| c)
    }

    pub fn add_playoff_round(
        &mut self,
        id: CalendarId,
        expected_version: Option<u32>,
        name: &str,
        matches: Vec<CalendarMatch>,
    ) -> Result<&Calendar, LeagueError> {
        self.edit_calendar(id, expected_version, |c| {
            Ok((logic::add_playoff_round(c, name, matches)?, ()))
        })
        .map(|(c, ())| c)
    }
}

// Weekly schedules
impl League {
    /// Every fixture already placed in a saved weekly schedule, except `skip`.
    fn booked_fixtures(&self, skip: Option<ScheduleId>) -> Vec<ScheduledFixture> {
        self.schedules
            .iter()
            .filter(|s| Some(s.id) != skip)
            .flat_map(|s| s.fixtures.iter().cloned())
            .collect()
    }

    /// Allocate the unplayed fixtures of the given saved calendars (optionally one journée).
    /// Nothing is stored; save the outcome with [`League::create_schedule`].
    pub fn plan_weekly_schedule(
        &self,
        calendar_ids: &[CalendarId],
        journee: Option<u32>,
        options: &AllocationOptions,
    ) -> Result<AllocationOutcome, LeagueError> {
        let calendars = calendar_ids
            .iter()
            .map(|id| self.calendar(*id))
            .collect::<Result<Vec<_>, _>>()?;
        let booked = self.booked_fixtures(None);
        let fixtures = logic::collect_unscheduled_fixtures(calendars, journee, &booked);
        logic::schedule_matches_with_constraints(&fixtures, options, &booked)
    }

    pub fn create_schedule(
        &mut self,
        name: &str,
        options: &AllocationOptions,
        outcome: AllocationOutcome,
    ) -> Result<&WeeklySchedule, LeagueError> {
        let name = clean_name(name)?;
        self.schedules
            .push(WeeklySchedule::new(name, options.start_date, outcome));
        Ok(&self.schedules[self.schedules.len() - 1])
    }

    pub fn schedule(&self, id: ScheduleId) -> Result<&WeeklySchedule, LeagueError> {
        self.schedules
            .iter()
            .find(|s| s.id == id)
            .ok_or(LeagueError::ScheduleNotFound(id))
    }

    /// Replace the fixtures of a schedule (manual moves). The new list must be free of double
    /// bookings and same-day conflicts, both internally and against other schedules.
    pub fn update_schedule_fixtures(
        &mut self,
        id: ScheduleId,
        mut fixtures: Vec<ScheduledFixture>,
    ) -> Result<&WeeklySchedule, LeagueError> {
        let booked = self.booked_fixtures(Some(id));
        let schedule = self
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LeagueError::ScheduleNotFound(id))?;
        if schedule.materialized {
            return Err(LeagueError::AlreadyMaterialized);
        }
        logic::check_schedule_conflicts(&fixtures, &booked)?;
        fixtures.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
        schedule.fixtures = fixtures;
        Ok(schedule)
    }

    pub fn delete_schedule(&mut self, id: ScheduleId) -> Result<(), LeagueError> {
        let idx = self
            .schedules
            .iter()
            .position(|s| s.id == id)
            .ok_or(LeagueError::ScheduleNotFound(id))?;
        self.schedules.remove(idx);
        Ok(())
    }

    /// Turn a weekly schedule into standalone match records (once).
    pub fn materialize_schedule(&mut self, id: ScheduleId) -> Result<Vec<MatchId>, LeagueError> {
        let schedule = self
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LeagueError::ScheduleNotFound(id))?;
        if schedule.materialized {
            return Err(LeagueError::AlreadyMaterialized);
        }
        let created: Vec<LeagueMatch> = schedule
            .fixtures
            .iter()
            .map(|f| LeagueMatch::from_scheduled(f, id))
            .collect();
        schedule.materialized = true;
        log::info!("Schedule {} materialised into {} match(es)", schedule.name, created.len());
        let ids = created.iter().map(|m| m.id).collect();
        self.matches.extend(created);
        Ok(ids)
    }
}

// Matches
impl League {
    pub fn add_match(&mut self, mut new_match: LeagueMatch) -> Result<&LeagueMatch, LeagueError> {
        if new_match.home_team == new_match.away_team {
            return Err(LeagueError::SelfMatch(new_match.home_team));
        }
        if self.category(&new_match.category).is_none() {
            return Err(LeagueError::CategoryNotFound(new_match.category));
        }
        new_match.id = Uuid::new_v4();
        new_match.status = MatchStatus::Scheduled;
        self.matches.push(new_match);
        Ok(&self.matches[self.matches.len() - 1])
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut LeagueMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Update date, time, venue and scores. Status changes go through [`League::set_match_status`].
    pub fn update_match(&mut self, id: MatchId, update: LeagueMatch) -> Result<&LeagueMatch, LeagueError> {
        if update.home_team == update.away_team {
            return Err(LeagueError::SelfMatch(update.home_team));
        }
        let m = self.get_match_mut(id).ok_or(LeagueError::MatchNotFound(id))?;
        if update.home_score.is_some() && update.home_score == update.away_score {
            return Err(LeagueError::TiedScore);
        }
        let status = m.status;
        let schedule_id = m.schedule_id;
        *m = LeagueMatch {
            id,
            status,
            schedule_id,
            ..update
        };
        Ok(m)
    }

    pub fn delete_match(&mut self, id: MatchId) -> Result<(), LeagueError> {
        let idx = self
            .matches
            .iter()
            .position(|m| m.id == id)
            .ok_or(LeagueError::MatchNotFound(id))?;
        self.matches.remove(idx);
        Ok(())
    }

    pub fn set_match_status(&mut self, id: MatchId, status: MatchStatus) -> Result<&LeagueMatch, LeagueError> {
        let m = self.get_match_mut(id).ok_or(LeagueError::MatchNotFound(id))?;
        if !m.status.can_transition_to(status) {
            return Err(LeagueError::InvalidStatusTransition {
                from: m.status,
                to: status,
            });
        }
        if status == MatchStatus::Finished && !m.has_score() {
            return Err(LeagueError::MissingScore);
        }
        m.status = status;
        Ok(m)
    }
}
