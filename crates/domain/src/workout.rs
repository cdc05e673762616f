use chrono::{DateTime, TimeDelta, Utc};
use derive_more::{Deref, Display};
use log::debug;

use crate::{
    Category, CreateError, DeleteError, ExerciseRef, ReadError, Set, SyncError, UpdateError, User,
    UserID, Weight, WorkoutTemplate, WorkoutTemplateID, prefill_weights,
};

#[allow(async_fn_in_trait)]
pub trait CompletedWorkoutService {
    async fn get_completed_workouts(
        &self,
        user_id: Option<&UserID>,
    ) -> Result<Vec<CompletedWorkout>, ReadError>;
    async fn get_completed_workout(
        &self,
        id: &CompletedWorkoutID,
    ) -> Result<CompletedWorkout, ReadError>;
    async fn create_completed_workout(
        &self,
        template_id: Option<WorkoutTemplateID>,
        template_name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<CompletedWorkout, CreateError>;
    async fn replace_completed_workout(
        &self,
        workout: CompletedWorkout,
    ) -> Result<CompletedWorkout, UpdateError>;
    async fn delete_completed_workout(
        &self,
        id: CompletedWorkoutID,
    ) -> Result<CompletedWorkoutID, DeleteError>;

    /// Suggests starting weights for one exercise of a template. Never fails: a history that
    /// cannot be read results in empty suggestions.
    async fn get_prefilled_weights(
        &self,
        user_id: &UserID,
        template: &WorkoutTemplate,
        exercise: &ExerciseRef,
        set_count: usize,
    ) -> Vec<Option<Weight>> {
        match self.get_completed_workouts(Some(user_id)).await {
            Ok(history) => prefill_weights(&history, template, exercise, set_count),
            Err(err) => {
                debug!("no weights pre-filled for {}: {err}", exercise.name);
                vec![None; set_count]
            }
        }
    }

    /// Suggests starting weights for every exercise of a template, in template order.
    async fn get_prefilled_template_weights(
        &self,
        user_id: &UserID,
        template: &WorkoutTemplate,
    ) -> Vec<Vec<Option<Weight>>> {
        let history = match self.get_completed_workouts(Some(user_id)).await {
            Ok(history) => history,
            Err(err) => {
                debug!("no weights pre-filled for {}: {err}", template.name);
                vec![]
            }
        };
        template
            .exercises
            .iter()
            .map(|e| prefill_weights(&history, template, &e.exercise, e.sets as usize))
            .collect()
    }
}

#[allow(async_fn_in_trait)]
pub trait CompletedWorkoutRepository {
    async fn sync_completed_workouts(&self) -> Result<Vec<CompletedWorkout>, SyncError>;
    async fn read_completed_workouts(
        &self,
        user_id: Option<&UserID>,
    ) -> Result<Vec<CompletedWorkout>, ReadError>;
    async fn read_completed_workout(
        &self,
        id: &CompletedWorkoutID,
    ) -> Result<CompletedWorkout, ReadError>;
    async fn create_completed_workout(
        &self,
        template_id: Option<WorkoutTemplateID>,
        template_name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<CompletedWorkout, CreateError>;
    async fn replace_completed_workout(
        &self,
        workout: CompletedWorkout,
    ) -> Result<CompletedWorkout, UpdateError>;
    async fn delete_completed_workout(
        &self,
        id: CompletedWorkoutID,
    ) -> Result<CompletedWorkoutID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedWorkout {
    pub id: CompletedWorkoutID,
    pub user_id: UserID,
    pub template_id: Option<WorkoutTemplateID>,
    pub template_name: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub exercises: Vec<WorkoutExercise>,
}

impl CompletedWorkout {
    /// Finds the entry referring to `exercise`, preferring id matches over exact name matches
    /// over partial name matches. If the best matching entry has no recorded sets, the workout
    /// does not contain the exercise.
    #[must_use]
    pub fn exercise(&self, exercise: &ExerciseRef) -> Option<&WorkoutExercise> {
        self.exercises
            .iter()
            .filter_map(|e| exercise.match_with(&e.exercise).map(|m| (m, e)))
            .min_by_key(|(m, e)| (*m, e.sets.is_none()))
            .map(|(_, e)| e)
            .filter(|e| e.sets.is_some())
    }

    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        match (self.start_time, self.end_time) {
            (Some(start_time), Some(end_time)) if end_time >= start_time => {
                Some(end_time - start_time)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn num_completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .map(WorkoutExercise::num_completed_sets)
            .sum()
    }

    #[must_use]
    pub fn volume_load(&self) -> f32 {
        self.exercises.iter().map(WorkoutExercise::volume_load).sum()
    }

    #[must_use]
    pub fn can_be_modified_by(&self, user: &User) -> bool {
        user.is_admin() || self.user_id == user.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub exercise: ExerciseRef,
    pub category: Category,
    pub sets: Option<Vec<Set>>,
}

impl WorkoutExercise {
    fn completed_sets(&self) -> impl Iterator<Item = &Set> {
        self.sets.iter().flatten().filter(|s| s.completed)
    }

    #[must_use]
    pub fn num_completed_sets(&self) -> usize {
        self.completed_sets().count()
    }

    #[must_use]
    pub fn volume_load(&self) -> f32 {
        self.completed_sets().map(Set::volume_load).sum()
    }

    #[must_use]
    pub fn max_weight(&self) -> Option<Weight> {
        self.completed_sets()
            .filter_map(|s| s.weight)
            .fold(None, |max, w| match max {
                Some(m) if m >= w => Some(m),
                _ => Some(w),
            })
    }
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletedWorkoutID(String);

impl CompletedWorkoutID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for CompletedWorkoutID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CompletedWorkoutID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for CompletedWorkoutID {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

/// Heaviest completed weight of `exercise` per workout, oldest first.
#[must_use]
pub fn progression(
    workouts: &[CompletedWorkout],
    exercise: &ExerciseRef,
) -> Vec<(DateTime<Utc>, Weight)> {
    let mut result = workouts
        .iter()
        .filter_map(|w| Some((w.end_time?, w.exercise(exercise)?.max_weight()?)))
        .collect::<Vec<_>>();
    result.sort_by_key(|(time, _)| *time);
    result
}
