use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use workitout_domain::{
    Category, CompletedWorkout, CompletedWorkoutService, CreateError, ExerciseID, ExerciseRef,
    Reps, Set, UserID, Weight, WorkoutExercise, WorkoutTemplate, WorkoutTemplateID,
    prefill_weights, were_weights_prefilled,
};

use crate::{Settings, SettingsService};

#[allow(async_fn_in_trait)]
pub trait ActiveWorkoutService {
    async fn get_active_workout(&self) -> Result<Option<ActiveWorkout>, String>;
    async fn set_active_workout(&self, active_workout: Option<ActiveWorkout>)
    -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait ActiveWorkoutRepository {
    async fn read_active_workout(&self) -> Result<Option<ActiveWorkout>, String>;
    async fn write_active_workout(
        &self,
        active_workout: Option<ActiveWorkout>,
    ) -> Result<(), String>;
}

/// The workout in progress. A snapshot of it is stored after every change so that an
/// interrupted workout can be resumed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActiveWorkout {
    pub template_id: Option<String>,
    pub template_name: String,
    pub start_time: DateTime<Utc>,
    pub exercises: Vec<ActiveExercise>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActiveExercise {
    pub exercise_id: Option<String>,
    pub name: String,
    pub category: String,
    pub sets: Vec<ActiveSet>,
    pub weights_prefilled: bool,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct ActiveSet {
    pub weight: Option<f32>,
    pub reps: u32,
    pub completed: bool,
}

impl ActiveWorkout {
    /// Starts a workout from `template` with weights suggested from `history`.
    #[must_use]
    pub fn from_template(
        template: &WorkoutTemplate,
        history: &[CompletedWorkout],
        start_time: DateTime<Utc>,
    ) -> Self {
        let exercises = template
            .exercises
            .iter()
            .map(|e| {
                let weights = prefill_weights(history, template, &e.exercise, e.sets as usize);
                ActiveExercise {
                    exercise_id: e.exercise.id.as_ref().map(ToString::to_string),
                    name: e.exercise.name.clone(),
                    category: e.category.to_string(),
                    sets: weights
                        .iter()
                        .map(|weight| ActiveSet {
                            weight: weight.map(f32::from),
                            reps: u32::from(e.reps),
                            completed: false,
                        })
                        .collect(),
                    weights_prefilled: were_weights_prefilled(&weights),
                }
            })
            .collect();

        Self {
            template_id: (!template.id.is_nil()).then(|| template.id.to_string()),
            template_name: template.name.to_string(),
            start_time,
            exercises,
        }
    }

    #[must_use]
    pub fn empty(start_time: DateTime<Utc>) -> Self {
        Self {
            template_id: None,
            template_name: String::new(),
            start_time,
            exercises: vec![],
        }
    }

    pub fn set_weight(&mut self, exercise_idx: usize, set_idx: usize, weight: Option<Weight>) {
        if let Some(set) = self.set_mut(exercise_idx, set_idx) {
            set.weight = weight.map(f32::from);
        }
    }

    pub fn set_reps(&mut self, exercise_idx: usize, set_idx: usize, reps: Reps) {
        if let Some(set) = self.set_mut(exercise_idx, set_idx) {
            set.reps = u32::from(reps);
        }
    }

    pub fn toggle_completed(&mut self, exercise_idx: usize, set_idx: usize) {
        if let Some(set) = self.set_mut(exercise_idx, set_idx) {
            set.completed = !set.completed;
        }
    }

    /// Appends a set with the weight and reps of the last set.
    pub fn add_set(&mut self, exercise_idx: usize) {
        if let Some(exercise) = self.exercises.get_mut(exercise_idx) {
            let set = exercise.sets.last().copied().unwrap_or_default();
            exercise.sets.push(ActiveSet {
                completed: false,
                ..set
            });
        }
    }

    pub fn remove_set(&mut self, exercise_idx: usize, set_idx: usize) {
        if let Some(exercise) = self.exercises.get_mut(exercise_idx) {
            if set_idx < exercise.sets.len() {
                exercise.sets.remove(set_idx);
            }
        }
    }

    pub fn add_exercise(
        &mut self,
        exercise: &ExerciseRef,
        category: Category,
        sets: u32,
        reps: Reps,
    ) {
        self.exercises.push(ActiveExercise {
            exercise_id: exercise.id.as_ref().map(ToString::to_string),
            name: exercise.name.clone(),
            category: category.to_string(),
            sets: vec![
                ActiveSet {
                    weight: None,
                    reps: u32::from(reps),
                    completed: false,
                };
                sets as usize
            ],
            weights_prefilled: false,
        });
    }

    pub fn remove_exercise(&mut self, exercise_idx: usize) {
        if exercise_idx < self.exercises.len() {
            self.exercises.remove(exercise_idx);
        }
    }

    #[must_use]
    pub fn target_set_counts(&self) -> Vec<usize> {
        self.exercises.iter().map(|e| e.sets.len()).collect()
    }

    /// Returns the number of completed sets and the total number of sets.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .fold((0, 0), |(completed, total), set| {
                (completed + usize::from(set.completed), total + 1)
            })
    }

    #[must_use]
    pub fn to_workout_exercises(&self) -> Vec<WorkoutExercise> {
        self.exercises
            .iter()
            .map(|e| WorkoutExercise {
                exercise: ExerciseRef::new(e.exercise_id.clone().map(ExerciseID::from), &e.name),
                category: Category::parse_lenient(&e.category),
                sets: Some(
                    e.sets
                        .iter()
                        .map(|s| Set {
                            weight: s.weight.and_then(|w| Weight::new(w).ok()),
                            reps: Reps::new(s.reps).ok(),
                            completed: s.completed,
                        })
                        .collect(),
                ),
            })
            .collect()
    }

    fn set_mut(&mut self, exercise_idx: usize, set_idx: usize) -> Option<&mut ActiveSet> {
        self.exercises.get_mut(exercise_idx)?.sets.get_mut(set_idx)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FinishError {
    #[error("no active workout")]
    NoActiveWorkout,
    #[error("{0}")]
    Snapshot(String),
    #[error(transparent)]
    Create(#[from] CreateError),
}

/// Creates the active workout for `template` and stores its snapshot.
///
/// Weights are only suggested if enabled in the settings. Unavailable settings or history result
/// in a workout without suggested weights.
pub async fn start_active_workout<U, W>(
    ui: &U,
    workouts: &W,
    user_id: &UserID,
    template: &WorkoutTemplate,
    start_time: DateTime<Utc>,
) -> Result<ActiveWorkout, String>
where
    U: ActiveWorkoutService + SettingsService,
    W: CompletedWorkoutService,
{
    let settings = ui.get_settings().await.unwrap_or_else(|err| {
        warn!("failed to read settings: {err}");
        Settings::default()
    });
    let history = if settings.prefill_weights {
        workouts
            .get_completed_workouts(Some(user_id))
            .await
            .unwrap_or_else(|err| {
                debug!("starting workout without history: {err}");
                vec![]
            })
    } else {
        vec![]
    };
    let active_workout = ActiveWorkout::from_template(template, &history, start_time);
    ui.set_active_workout(Some(active_workout.clone())).await?;
    Ok(active_workout)
}

/// Submits the active workout and removes its snapshot. The snapshot is kept if the submission
/// fails.
pub async fn finish_active_workout<U, W>(
    ui: &U,
    workouts: &W,
    end_time: DateTime<Utc>,
) -> Result<CompletedWorkout, FinishError>
where
    U: ActiveWorkoutService,
    W: CompletedWorkoutService,
{
    let active_workout = ui
        .get_active_workout()
        .await
        .map_err(FinishError::Snapshot)?
        .ok_or(FinishError::NoActiveWorkout)?;
    let completed_workout = workouts
        .create_completed_workout(
            active_workout.template_id.clone().map(WorkoutTemplateID::from),
            active_workout.template_name.clone(),
            active_workout.start_time,
            end_time,
            active_workout.to_workout_exercises(),
        )
        .await?;
    if let Err(err) = ui.set_active_workout(None).await {
        warn!("failed to remove active workout: {err}");
    }
    Ok(completed_workout)
}
