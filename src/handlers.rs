use crate::errors::AppError;
use crate::models::{
    CompletionResponse, CreateHabitRequest, Frequency, HabitPatch, HabitView, HabitsResponse,
    IndexQuery, LeaderboardResponse, NewHabit, UpdateHabitRequest,
};
use crate::state::AppState;
use crate::stats::{build_habits, build_leaderboard, habit_view};
use crate::storage::persist_data;
use crate::store::StoreError;
use crate::streak::{self, StreakError};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Json,
};
use chrono::{Local, Utc};
use tracing::{error, info, warn};

pub async fn index(Query(query): Query<IndexQuery>) -> Result<Html<String>, AppError> {
    let user_id = match query.user.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(checked_user_id(raw)?),
        _ => None,
    };
    Ok(Html(render_index(user_id)))
}

pub async fn list_habits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<HabitsResponse>, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let data = state.data.lock().await;
    Ok(Json(build_habits(&data, user_id)?))
}

pub async fn get_streaks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let data = state.data.lock().await;
    Ok(Json(build_leaderboard(&data, user_id)?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitView>), AppError> {
    let user_id = checked_user_id(&user_id)?;
    let title = checked_title(&payload.title)?;
    let frequency: Frequency = payload.frequency.parse()?;

    let fields = NewHabit {
        title,
        description: payload.description.trim().to_string(),
        frequency,
    };

    let mut data = state.data.lock().await;
    let id = data.create(user_id, fields, Utc::now());
    if let Err(err) = persist_data(&state.data_path, &data).await {
        if let Err(rollback) = data.delete(user_id, &id) {
            error!(user = user_id, habit = %id, "failed to roll back created habit: {rollback}");
        }
        return Err(err);
    }

    let habit = data.get(user_id, &id).ok_or_else(|| not_found(&id))?;
    info!(user = user_id, habit = %id, %frequency, "habit created");
    Ok((StatusCode::CREATED, Json(habit_view(habit, &Local::now())?)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
    Json(payload): Json<UpdateHabitRequest>,
) -> Result<Json<HabitView>, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let title = payload.title.as_deref().map(checked_title).transpose()?;
    let patch = HabitPatch {
        title,
        description: payload.description.map(|text| text.trim().to_string()),
        ..HabitPatch::default()
    };

    let mut data = state.data.lock().await;
    let original = data
        .get(user_id, &habit_id)
        .cloned()
        .ok_or_else(|| not_found(&habit_id))?;
    let updated = data.update(user_id, &habit_id, patch)?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.restore(user_id, original);
        return Err(err);
    }

    info!(user = user_id, habit = %habit_id, "habit updated");
    Ok(Json(habit_view(&updated, &Local::now())?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let mut data = state.data.lock().await;
    let removed = data.delete(user_id, &habit_id)?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.restore(user_id, removed);
        return Err(err);
    }

    info!(user = user_id, habit = %habit_id, "habit deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_habit(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
) -> Result<Json<CompletionResponse>, AppError> {
    let user_id = checked_user_id(&user_id)?;
    let response = apply_completion(&state, user_id, &habit_id).await?;
    Ok(Json(response))
}

pub async fn complete_habit_form(
    State(state): State<AppState>,
    Path((user_id, habit_id)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let user_id = checked_user_id(&user_id)?;
    match apply_completion(&state, user_id, &habit_id).await {
        Ok(_) => {}
        Err(err) if err.status == StatusCode::CONFLICT => {}
        Err(err) => return Err(err),
    }
    Ok(Redirect::to(&format!("/?user={user_id}")))
}

/// Evaluate, write and persist while holding the store lock, so one habit
/// never accepts two completions in the same period.
async fn apply_completion(
    state: &AppState,
    user_id: &str,
    habit_id: &str,
) -> Result<CompletionResponse, AppError> {
    let now = Local::now();
    let mut data = state.data.lock().await;
    let original = data
        .get(user_id, habit_id)
        .cloned()
        .ok_or_else(|| not_found(habit_id))?;

    let mut updated = original.clone();
    let outcome = match streak::record_completion(&mut updated, &now) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let StreakError::AlreadyCompleted { .. } = err {
                warn!(user = user_id, habit = habit_id, "completion rejected: {err}");
            }
            return Err(err.into());
        }
    };

    data.compare_and_update(user_id, original.completion_log.len(), &updated)?;
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.restore(user_id, original);
        return Err(err);
    }

    info!(
        user = user_id,
        habit = habit_id,
        streak = outcome.streak_count,
        best = outcome.best_streak,
        restarted = outcome.restarted,
        "habit completed"
    );

    Ok(CompletionResponse {
        habit: habit_view(&updated, &now)?,
        restarted: outcome.restarted,
    })
}

fn checked_user_id(raw: &str) -> Result<&str, AppError> {
    let user_id = raw.trim();
    let valid = !user_id.is_empty()
        && user_id.len() <= 128
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::bad_request(
            "user id must be 1-128 characters of letters, digits, '-' or '_'",
        ));
    }
    Ok(user_id)
}

fn checked_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("title must not be empty"));
    }
    Ok(title.to_string())
}

fn not_found(habit_id: &str) -> StoreError {
    StoreError::HabitNotFound {
        habit_id: habit_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppData;

    fn temp_state(name: &str) -> AppState {
        let mut path = std::env::temp_dir();
        path.push(format!("habit_tracker_handlers_{}_{name}.json", std::process::id()));
        AppState::new(path, AppData::default())
    }

    fn unwritable_state(name: &str) -> AppState {
        let mut path = std::env::temp_dir();
        path.push(format!("habit_tracker_missing_dir_{}_{name}", std::process::id()));
        path.push("habits.json");
        AppState::new(path, AppData::default())
    }

    async fn seed_habit(state: &AppState, user_id: &str) -> String {
        let mut data = state.data.lock().await;
        data.create(
            user_id,
            NewHabit {
                title: "Stretch".into(),
                description: String::new(),
                frequency: Frequency::Daily,
            },
            Utc::now(),
        )
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_completions_accept_exactly_one() {
        let state = temp_state("parallel");
        let id = seed_habit(&state, "alice").await;

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let state = state.clone();
            let id = id.clone();
            tasks.push(tokio::spawn(async move {
                complete_habit(State(state), Path(("alice".to_string(), id)))
                    .await
                    .map(|_| ())
                    .map_err(|err| err.status)
            }));
        }

        let mut accepted = 0;
        let mut conflicts = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(StatusCode::CONFLICT) => conflicts += 1,
                Err(status) => panic!("unexpected status {status}"),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(conflicts, 15);

        {
            let data = state.data.lock().await;
            let habit = data.get("alice", &id).unwrap();
            assert_eq!(habit.completion_log.len(), 1);
            assert_eq!(habit.streak_count, 1);
        }
        let _ = tokio::fs::remove_file(&state.data_path).await;
    }

    #[tokio::test]
    async fn failed_persist_leaves_store_unchanged() {
        let state = unwritable_state("rollback");
        let id = seed_habit(&state, "alice").await;
        let before = state.data.lock().await.get("alice", &id).cloned().unwrap();
        let path = || Path(("alice".to_string(), id.clone()));

        let err = create_habit(
            State(state.clone()),
            Path("bob".to_string()),
            Json(CreateHabitRequest {
                title: "Read".into(),
                description: String::new(),
                frequency: "Weekly".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!state.data.lock().await.users.contains_key("bob"));

        let err = complete_habit(State(state.clone()), path()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        {
            let data = state.data.lock().await;
            let habit = data.get("alice", &id).unwrap();
            assert_eq!(habit.streak_count, before.streak_count);
            assert_eq!(habit.completion_log.len(), before.completion_log.len());
        }

        let err = update_habit(
            State(state.clone()),
            path(),
            Json(UpdateHabitRequest {
                title: Some("Stretch longer".into()),
                description: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = delete_habit(State(state.clone()), path()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let data = state.data.lock().await;
        assert_eq!(data.get("alice", &id), Some(&before));
        assert_eq!(data.users.len(), 1);
    }
}
