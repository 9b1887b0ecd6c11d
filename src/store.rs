//! Per-user habit collections kept inside [`AppData`].

use crate::models::{AppData, Habit, HabitPatch, NewHabit};
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("habit '{habit_id}' not found")]
    HabitNotFound { habit_id: String },

    #[error("habit '{habit_id}' was modified concurrently")]
    ConcurrentUpdate { habit_id: String },
}

impl AppData {
    /// Habits of one user in display order: Daily, Weekly, Monthly, then by
    /// creation time.
    pub fn list(&self, user_id: &str) -> Vec<Habit> {
        let mut habits: Vec<Habit> = self
            .users
            .get(user_id)
            .map(|user| user.habits.values().cloned().collect())
            .unwrap_or_default();
        habits.sort_by(|a, b| {
            a.frequency
                .cmp(&b.frequency)
                .then(a.created_at.cmp(&b.created_at))
        });
        habits
    }

    pub fn get(&self, user_id: &str, habit_id: &str) -> Option<&Habit> {
        self.users.get(user_id)?.habits.get(habit_id)
    }

    pub fn create(&mut self, user_id: &str, fields: NewHabit, now: DateTime<Utc>) -> String {
        let id = Uuid::new_v4().to_string();
        let habit = Habit {
            id: id.clone(),
            title: fields.title,
            description: fields.description,
            frequency: fields.frequency,
            streak_count: 0,
            best_streak: 0,
            completion_log: Vec::new(),
            created_at: now,
        };
        self.users
            .entry(user_id.to_string())
            .or_default()
            .habits
            .insert(id.clone(), habit);
        id
    }

    pub fn update(
        &mut self,
        user_id: &str,
        habit_id: &str,
        patch: HabitPatch,
    ) -> Result<Habit, StoreError> {
        let habit = self.get_mut(user_id, habit_id)?;
        if let Some(title) = patch.title {
            habit.title = title;
        }
        if let Some(description) = patch.description {
            habit.description = description;
        }
        if let Some(streak_count) = patch.streak_count {
            habit.streak_count = streak_count;
        }
        if let Some(best_streak) = patch.best_streak {
            habit.best_streak = best_streak;
        }
        if let Some(completion_log) = patch.completion_log {
            habit.completion_log = completion_log;
        }
        Ok(habit.clone())
    }

    /// Writes the streak fields of `updated` only if the stored log still has
    /// `expected_log_len` entries. Handlers call this under the `AppData`
    /// lock, where the check cannot fail; it keeps completions single per
    /// period if the store is ever accessed outside that lock.
    pub fn compare_and_update(
        &mut self,
        user_id: &str,
        expected_log_len: usize,
        updated: &Habit,
    ) -> Result<Habit, StoreError> {
        let current = self.get_mut(user_id, &updated.id)?;
        if current.completion_log.len() != expected_log_len {
            return Err(StoreError::ConcurrentUpdate {
                habit_id: updated.id.clone(),
            });
        }
        self.update(
            user_id,
            &updated.id,
            HabitPatch {
                streak_count: Some(updated.streak_count),
                best_streak: Some(updated.best_streak),
                completion_log: Some(updated.completion_log.clone()),
                ..HabitPatch::default()
            },
        )
    }

    /// Puts a previously removed or modified habit back as it was.
    pub fn restore(&mut self, user_id: &str, habit: Habit) {
        self.users
            .entry(user_id.to_string())
            .or_default()
            .habits
            .insert(habit.id.clone(), habit);
    }

    pub fn delete(&mut self, user_id: &str, habit_id: &str) -> Result<Habit, StoreError> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| not_found(habit_id))?;
        let removed = user.habits.remove(habit_id).ok_or_else(|| not_found(habit_id))?;
        if user.habits.is_empty() {
            self.users.remove(user_id);
        }
        Ok(removed)
    }

    fn get_mut(&mut self, user_id: &str, habit_id: &str) -> Result<&mut Habit, StoreError> {
        self.users
            .get_mut(user_id)
            .and_then(|user| user.habits.get_mut(habit_id))
            .ok_or_else(|| not_found(habit_id))
    }
}

fn not_found(habit_id: &str) -> StoreError {
    StoreError::HabitNotFound {
        habit_id: habit_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;
    use chrono::TimeZone;

    fn new_habit(title: &str, frequency: Frequency) -> NewHabit {
        NewHabit {
            title: title.to_string(),
            description: format!("{title} every period"),
            frequency,
        }
    }

    fn at(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn create_starts_with_empty_streak() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));

        let habit = data.get("alice", &id).expect("missing habit");
        assert_eq!(habit.streak_count, 0);
        assert_eq!(habit.best_streak, 0);
        assert!(habit.completion_log.is_empty());
        assert_eq!(habit.created_at, at(1));
    }

    #[test]
    fn list_orders_by_frequency_then_age() {
        let mut data = AppData::default();
        data.create("alice", new_habit("Budget", Frequency::Monthly), at(1));
        data.create("alice", new_habit("Call mom", Frequency::Weekly), at(2));
        data.create("alice", new_habit("Floss", Frequency::Daily), at(4));
        data.create("alice", new_habit("Run", Frequency::Daily), at(3));

        let titles: Vec<String> = data.list("alice").into_iter().map(|h| h.title).collect();
        assert_eq!(titles, ["Run", "Floss", "Call mom", "Budget"]);
    }

    #[test]
    fn users_do_not_see_each_other() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));

        assert!(data.list("bob").is_empty());
        assert!(data.get("bob", &id).is_none());
        assert_eq!(
            data.delete("bob", &id),
            Err(StoreError::HabitNotFound { habit_id: id.clone() })
        );
        assert!(data.get("alice", &id).is_some());
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));

        let updated = data
            .update(
                "alice",
                &id,
                HabitPatch {
                    title: Some("Run 5k".into()),
                    ..HabitPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Run 5k");
        assert_eq!(updated.description, "Run every period");
        assert_eq!(updated.frequency, Frequency::Daily);
    }

    #[test]
    fn compare_and_update_rejects_stale_writes() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));

        let mut first = data.get("alice", &id).cloned().unwrap();
        first.streak_count = 1;
        first.best_streak = 1;
        first.completion_log.push(at(2));
        let mut second = first.clone();
        second.completion_log = vec![at(2)];

        data.compare_and_update("alice", 0, &first).unwrap();
        assert_eq!(
            data.compare_and_update("alice", 0, &second),
            Err(StoreError::ConcurrentUpdate { habit_id: id.clone() })
        );
        assert_eq!(data.get("alice", &id).unwrap().completion_log.len(), 1);
    }

    #[test]
    fn restore_puts_deleted_habit_back() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));
        let removed = data.delete("alice", &id).unwrap();

        data.restore("alice", removed.clone());
        assert_eq!(data.get("alice", &id), Some(&removed));
    }

    #[test]
    fn delete_removes_habit_and_empty_user() {
        let mut data = AppData::default();
        let id = data.create("alice", new_habit("Run", Frequency::Daily), at(1));

        let removed = data.delete("alice", &id).unwrap();
        assert_eq!(removed.id, id);
        assert!(data.users.is_empty());
        assert!(data.delete("alice", &id).is_err());
    }
}
