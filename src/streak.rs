//! Streak continuity rules.
//!
//! Every calendar decision is taken on local wall-clock time: logged instants
//! are stored in UTC and converted into the time zone carried by `now` before
//! they are compared against period boundaries. A streak survives one full
//! period without a completion and lapses after that.

use crate::models::{Frequency, Habit, StreakState};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    #[error("invalid habit state: {0}")]
    InvalidHabitState(String),

    #[error("habit already completed in the current {frequency} period")]
    AlreadyCompleted { frequency: Frequency },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakStatus {
    pub state: StreakState,
    pub display_count: u32,
    pub completed_this_period: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub streak_count: u32,
    pub best_streak: u32,
    /// Counting started at one: either the first completion ever or the
    /// previous streak had lapsed.
    pub restarted: bool,
}

/// Start of the period containing `now`, in `now`'s local time.
pub fn period_start<Tz: TimeZone>(frequency: Frequency, now: &DateTime<Tz>) -> NaiveDateTime {
    period_start_at(frequency, now.naive_local())
}

/// Start of the period immediately before the one containing `now`.
pub fn previous_period_start<Tz: TimeZone>(
    frequency: Frequency,
    now: &DateTime<Tz>,
) -> NaiveDateTime {
    previous_period_start_at(frequency, now.naive_local())
}

pub fn period_start_at(frequency: Frequency, now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    let start = match frequency {
        Frequency::Daily => today,
        Frequency::Weekly => week_start(today),
        Frequency::Monthly => month_start(today),
    };
    start.and_time(NaiveTime::MIN)
}

pub fn previous_period_start_at(frequency: Frequency, now: NaiveDateTime) -> NaiveDateTime {
    let current = period_start_at(frequency, now);
    match frequency {
        Frequency::Daily => current - Duration::days(1),
        Frequency::Weekly => current - Duration::weeks(1),
        Frequency::Monthly => {
            month_start(current.date() - Duration::days(1)).and_time(NaiveTime::MIN)
        }
    }
}

/// True when the latest completion falls in the current period or the one
/// before it.
pub fn is_alive<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> bool {
    last_completion_local(habit, &now.timezone())
        .is_some_and(|last| last >= previous_period_start(habit.frequency, now))
}

pub fn completed_this_period<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> bool {
    last_completion_local(habit, &now.timezone())
        .is_some_and(|last| last >= period_start(habit.frequency, now))
}

/// Streak count to show at `now`. A lapsed streak reads as zero without the
/// stored count being touched.
pub fn display_streak_count<Tz: TimeZone>(habit: &Habit, now: &DateTime<Tz>) -> u32 {
    if is_alive(habit, now) {
        habit.streak_count
    } else {
        0
    }
}

pub fn status<Tz: TimeZone>(
    habit: &Habit,
    now: &DateTime<Tz>,
) -> Result<StreakStatus, StreakError> {
    validate(habit)?;

    let alive = is_alive(habit, now);
    let state = if habit.completion_log.is_empty() {
        StreakState::NoStreak
    } else if alive {
        StreakState::Active
    } else {
        StreakState::Lapsed
    };

    Ok(StreakStatus {
        state,
        display_count: if alive { habit.streak_count } else { 0 },
        completed_this_period: completed_this_period(habit, now),
    })
}

/// Appends `now` to the completion log and advances the streak counters.
///
/// Rejected with [`StreakError::AlreadyCompleted`] when the habit already has
/// a completion in the current period; the habit is left untouched then.
pub fn record_completion<Tz: TimeZone>(
    habit: &mut Habit,
    now: &DateTime<Tz>,
) -> Result<CompletionOutcome, StreakError> {
    validate(habit)?;

    let instant = now.with_timezone(&Utc);
    if habit.last_completion().is_some_and(|last| instant < last) {
        return Err(StreakError::InvalidHabitState(
            "completion precedes the last logged completion".into(),
        ));
    }

    if completed_this_period(habit, now) {
        return Err(StreakError::AlreadyCompleted {
            frequency: habit.frequency,
        });
    }

    let restarted = !is_alive(habit, now);
    habit.streak_count = if restarted {
        1
    } else {
        habit.streak_count.saturating_add(1)
    };
    habit.best_streak = habit.best_streak.max(habit.streak_count);
    habit.completion_log.push(instant);

    Ok(CompletionOutcome {
        streak_count: habit.streak_count,
        best_streak: habit.best_streak,
        restarted,
    })
}

pub fn validate(habit: &Habit) -> Result<(), StreakError> {
    if habit.best_streak < habit.streak_count {
        return Err(StreakError::InvalidHabitState(format!(
            "best streak {} is below current streak {}",
            habit.best_streak, habit.streak_count
        )));
    }
    if habit.completion_log.is_empty() && habit.streak_count != 0 {
        return Err(StreakError::InvalidHabitState(
            "non-zero streak without any completion".into(),
        ));
    }
    if habit.completion_log.windows(2).any(|pair| pair[1] < pair[0]) {
        return Err(StreakError::InvalidHabitState(
            "completion log is out of order".into(),
        ));
    }
    Ok(())
}

fn last_completion_local<Tz: TimeZone>(habit: &Habit, tz: &Tz) -> Option<NaiveDateTime> {
    habit
        .last_completion()
        .map(|instant| instant.with_timezone(tz).naive_local())
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}
