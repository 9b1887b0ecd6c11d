use crate::models::{
    AppData, Habit, HabitView, HabitsResponse, LeaderboardEntry, LeaderboardResponse,
};
use crate::streak::{self, StreakError};
use chrono::{DateTime, Local, TimeZone};

const MEDALS: [&str; 3] = ["gold", "silver", "bronze"];

pub fn build_habits(
    data: &AppData,
    user_id: &str,
) -> Result<HabitsResponse, StreakError> {
    build_habits_at(&Local::now(), data, user_id)
}

/// Home list: stored order, lapsed streaks shown as zero.
pub fn build_habits_at<Tz: TimeZone>(
    now: &DateTime<Tz>,
    data: &AppData,
    user_id: &str,
) -> Result<HabitsResponse, StreakError> {
    let habits = data
        .list(user_id)
        .iter()
        .map(|habit| habit_view(habit, now))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HabitsResponse {
        user_id: user_id.to_string(),
        habits,
    })
}

pub fn habit_view<Tz: TimeZone>(
    habit: &Habit,
    now: &DateTime<Tz>,
) -> Result<HabitView, StreakError> {
    let status = streak::status(habit, now)?;
    Ok(HabitView {
        id: habit.id.clone(),
        title: habit.title.clone(),
        description: habit.description.clone(),
        frequency: habit.frequency,
        streak_count: status.display_count,
        best_streak: habit.best_streak,
        completed_this_period: status.completed_this_period,
        status: status.state,
        last_completion: habit.last_completion(),
        created_at: habit.created_at,
    })
}

pub fn build_leaderboard(
    data: &AppData,
    user_id: &str,
) -> Result<LeaderboardResponse, StreakError> {
    build_leaderboard_at(&Local::now(), data, user_id)
}

/// Habits with a live streak, longest first. The top three get a medal.
pub fn build_leaderboard_at<Tz: TimeZone>(
    now: &DateTime<Tz>,
    data: &AppData,
    user_id: &str,
) -> Result<LeaderboardResponse, StreakError> {
    let mut ranked = Vec::new();
    for habit in data.list(user_id) {
        let status = streak::status(&habit, now)?;
        if status.display_count == 0 || habit.best_streak == 0 {
            continue;
        }
        ranked.push((status.display_count, habit));
    }

    ranked.sort_by(|(a_count, a), (b_count, b)| {
        b_count
            .cmp(a_count)
            .then(b.best_streak.cmp(&a.best_streak))
            .then_with(|| a.title.cmp(&b.title))
    });

    let entries = ranked
        .into_iter()
        .enumerate()
        .map(|(index, (count, habit))| LeaderboardEntry {
            rank: index + 1,
            medal: MEDALS.get(index).map(|medal| medal.to_string()),
            id: habit.id,
            title: habit.title,
            description: habit.description,
            frequency: habit.frequency,
            streak_count: count,
            best_streak: habit.best_streak,
        })
        .collect();

    Ok(LeaderboardResponse {
        user_id: user_id.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, HabitPatch, NewHabit, StreakState};
    use chrono::Utc;

    fn at(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, m, d, 9, 0, 0).unwrap()
    }

    fn seed(
        data: &mut AppData,
        title: &str,
        frequency: Frequency,
        streak: u32,
        best: u32,
        last: DateTime<Utc>,
    ) -> String {
        let id = data.create(
            "alice",
            NewHabit {
                title: title.into(),
                description: String::new(),
                frequency,
            },
            at(1, 1),
        );
        data.update(
            "alice",
            &id,
            HabitPatch {
                streak_count: Some(streak),
                best_streak: Some(best),
                completion_log: Some(vec![last]),
                ..HabitPatch::default()
            },
        )
        .unwrap();
        id
    }

    #[test]
    fn habits_show_lapsed_streak_as_zero() {
        let mut data = AppData::default();
        seed(&mut data, "Read", Frequency::Daily, 5, 7, at(1, 3));
        let now = at(1, 5);

        let response = build_habits_at(&now, &data, "alice").unwrap();
        let view = &response.habits[0];
        assert_eq!(view.streak_count, 0);
        assert_eq!(view.best_streak, 7);
        assert_eq!(view.status, StreakState::Lapsed);
        assert!(!view.completed_this_period);
        // stored value is left for the next completion to overwrite
        assert_eq!(data.list("alice")[0].streak_count, 5);
    }

    #[test]
    fn habits_flag_completed_this_period() {
        let mut data = AppData::default();
        seed(&mut data, "Plan week", Frequency::Weekly, 2, 2, at(1, 5));
        // 2026-01-05 is a Monday
        let response = build_habits_at(&at(1, 9), &data, "alice").unwrap();
        assert!(response.habits[0].completed_this_period);
        assert_eq!(response.habits[0].status, StreakState::Active);
    }

    #[test]
    fn leaderboard_ranks_live_streaks() {
        let mut data = AppData::default();
        seed(&mut data, "Read", Frequency::Daily, 3, 3, at(1, 9));
        seed(&mut data, "Gym", Frequency::Weekly, 6, 6, at(1, 6));
        seed(&mut data, "Lapsed", Frequency::Daily, 9, 9, at(1, 2));
        seed(&mut data, "Budget", Frequency::Monthly, 1, 4, at(1, 2));
        seed(&mut data, "Water", Frequency::Daily, 1, 1, at(1, 8));
        data.create(
            "alice",
            NewHabit {
                title: "Fresh".into(),
                description: String::new(),
                frequency: Frequency::Daily,
            },
            at(1, 9),
        );

        let board = build_leaderboard_at(&at(1, 9), &data, "alice").unwrap();
        let titles: Vec<&str> = board.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Gym", "Read", "Budget", "Water"]);
        assert_eq!(board.entries[0].medal.as_deref(), Some("gold"));
        assert_eq!(board.entries[2].medal.as_deref(), Some("bronze"));
        assert_eq!(board.entries[3].medal, None);
        assert_eq!(board.entries[3].rank, 4);
    }

    #[test]
    fn invalid_habit_fails_the_listing() {
        let mut data = AppData::default();
        let id = seed(&mut data, "Read", Frequency::Daily, 1, 1, at(1, 3));
        data.update(
            "alice",
            &id,
            HabitPatch {
                best_streak: Some(0),
                ..HabitPatch::default()
            },
        )
        .unwrap();

        let err = build_habits_at(&at(1, 3), &data, "alice").unwrap_err();
        assert!(matches!(err, StreakError::InvalidHabitState(_)));
    }
}
