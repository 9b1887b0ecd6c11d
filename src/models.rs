use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::streak::StreakError;

/// Recurrence unit of a habit. Declaration order is the display order of the
/// home list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = StreakError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "" => Err(StreakError::InvalidHabitState("frequency is empty".into())),
            other => Err(StreakError::InvalidHabitState(format!(
                "unknown frequency '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub streak_count: u32,
    pub best_streak: u32,
    #[serde(default)]
    pub completion_log: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn last_completion(&self) -> Option<DateTime<Utc>> {
        self.completion_log.last().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserHabits {
    pub habits: BTreeMap<String, Habit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub users: BTreeMap<String, UserHabits>,
}

/// Fields supplied by the user when a habit is created.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub streak_count: Option<u32>,
    pub best_streak: Option<u32>,
    pub completion_log: Option<Vec<DateTime<Utc>>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub frequency: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateHabitRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub user: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub streak_count: u32,
    pub best_streak: u32,
    pub completed_this_period: bool,
    pub status: StreakState,
    pub last_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakState {
    NoStreak,
    Active,
    Lapsed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitsResponse {
    pub user_id: String,
    pub habits: Vec<HabitView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub habit: HabitView,
    pub restarted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub medal: Option<String>,
    pub id: String,
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub streak_count: u32,
    pub best_streak: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub user_id: String,
    pub entries: Vec<LeaderboardEntry>,
}
