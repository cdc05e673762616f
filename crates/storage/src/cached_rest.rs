//! Cached REST
//!
//! The `REST` server acts as the authoritative data source, while the local storage of the
//! browser serves as a cache for the workout templates and the completed workouts of the current
//! user. Reads always ask the server first and fall back to the cache only if the server cannot
//! be reached. Data modifications are only possible if an active connection to the server is
//! available.

use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::{Serialize, de::DeserializeOwned};
use workitout_domain as domain;

use super::local_storage::{
    BrowserStorage, KEY_COMPLETED_WORKOUTS, KEY_SESSION, KEY_TOKEN, KEY_WORKOUT_TEMPLATES,
    KeyValueStore, LocalCache,
};
use super::rest::{self, GlooNetSendRequest, REST, SendRequest};

macro_rules! sync {
    ($self: ident, $read: ident, $key: ident, $dto: ty, $name: literal) => {{
        let rest_result = $self.rest.$read().await;
        if let Ok(ref result) = rest_result {
            $self.cache_list::<$dto, _>($key, result, $name);
        }

        Ok(rest_result?)
    }};
}

macro_rules! read_or_cached {
    ($self: ident, $read: expr, $key: ident, $dto: ty, $name: literal) => {{
        match $read.await {
            Ok(result) => {
                $self.cache_list::<$dto, _>($key, &result, $name);
                Ok(result)
            }
            Err(domain::ReadError::Storage(domain::StorageError::NoConnection)) => {
                debug!("using cached {}", $name);
                $self
                    .cached_list::<$dto, _>($key)
                    .ok_or(domain::ReadError::Storage(
                        domain::StorageError::NoConnection,
                    ))
            }
            Err(err) => Err(err),
        }
    }};
}

pub struct CachedREST<S: SendRequest, K: KeyValueStore> {
    pub rest: REST<S>,
    pub cache: LocalCache<K>,
}

impl CachedREST<GlooNetSendRequest, BrowserStorage> {
    #[must_use]
    pub fn browser() -> Self {
        Self::new(REST::new(), LocalCache::new(BrowserStorage))
    }
}

impl Default for CachedREST<GlooNetSendRequest, BrowserStorage> {
    fn default() -> Self {
        Self::browser()
    }
}

impl<S: SendRequest, K: KeyValueStore> CachedREST<S, K> {
    /// Restores the token of a previous session from the cache.
    pub fn new(rest: REST<S>, cache: LocalCache<K>) -> Self {
        rest.set_token(cache.read::<String>(KEY_TOKEN));
        Self { rest, cache }
    }

    fn cache_list<D, T>(&self, key: &str, entries: &[T], name: &str)
    where
        D: Serialize + From<T>,
        T: Clone,
    {
        let entries = entries.iter().cloned().map(D::from).collect::<Vec<_>>();
        if let Err(err) = self.cache.write(key, &entries) {
            error!("failed to cache {name}: {err}");
        }
    }

    fn cached_list<D, T>(&self, key: &str) -> Option<Vec<T>>
    where
        D: DeserializeOwned,
        T: TryFrom<D>,
    {
        Some(
            self.cache
                .read::<Vec<D>>(key)?
                .into_iter()
                .filter_map(|entry| T::try_from(entry).ok())
                .collect(),
        )
    }

    /// Applies `update` to a cached list. Nothing is cached if no list has been cached before.
    fn update_cached_list<D, T>(
        &self,
        key: &str,
        name: &str,
        update: impl FnOnce(&mut Vec<T>),
    ) where
        D: Serialize + DeserializeOwned + From<T>,
        T: Clone + TryFrom<D>,
    {
        if let Some(mut entries) = self.cached_list::<D, T>(key) {
            update(&mut entries);
            self.cache_list::<D, T>(key, &entries, name);
        }
    }

    fn store_session(&self, user: &domain::User) {
        match self.rest.token() {
            Some(token) => {
                if let Err(err) = self.cache.write(KEY_TOKEN, &token) {
                    error!("failed to cache token: {err}");
                }
            }
            None => self.cache.remove(KEY_TOKEN),
        }
        if let Err(err) = self.cache.write(KEY_SESSION, &rest::User::from(user.clone())) {
            error!("failed to cache session: {err}");
        }
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::HealthRepository for CachedREST<S, K> {
    async fn read_health(&self) -> Result<domain::Health, domain::ReadError> {
        self.rest.read_health().await
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::SessionRepository for CachedREST<S, K> {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        let user = self.rest.login(username, password).await?;
        self.cache.clear_user_data();
        self.store_session(&user);
        Ok(user)
    }

    async fn register(
        &self,
        username: domain::Name,
        email: String,
        password: String,
    ) -> Result<domain::User, domain::CreateError> {
        let user = self.rest.register(username, email, password).await?;
        self.cache.clear_user_data();
        self.store_session(&user);
        Ok(user)
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        match self.rest.initialize_session().await {
            Ok(user) => {
                self.store_session(&user);
                Ok(user)
            }
            Err(domain::ReadError::Storage(domain::StorageError::NoConnection)) => {
                debug!("using cached session");
                self.cache
                    .read::<rest::User>(KEY_SESSION)
                    .and_then(|user| domain::User::try_from(user).ok())
                    .ok_or(domain::ReadError::Storage(
                        domain::StorageError::NoConnection,
                    ))
            }
            Err(domain::ReadError::Storage(domain::StorageError::NoSession)) => {
                self.rest.set_token(None);
                self.cache.clear_user_data();
                Err(domain::ReadError::Storage(domain::StorageError::NoSession))
            }
            Err(err) => Err(err),
        }
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        self.rest.delete_session().await?;
        self.cache.clear_user_data();
        Ok(())
    }

    async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), domain::UpdateError> {
        self.rest
            .change_password(current_password, new_password)
            .await
    }

    async fn request_password_reset(&self, email: String) -> Result<(), domain::UpdateError> {
        self.rest.request_password_reset(email).await
    }

    async fn reset_password(
        &self,
        token: String,
        new_password: String,
    ) -> Result<(), domain::UpdateError> {
        self.rest.reset_password(token, new_password).await
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::UserRepository for CachedREST<S, K> {
    async fn read_users(&self) -> Result<Vec<domain::User>, domain::ReadError> {
        self.rest.read_users().await
    }

    async fn create_user(
        &self,
        username: domain::Name,
        email: String,
        password: String,
        role: domain::Role,
    ) -> Result<domain::User, domain::CreateError> {
        self.rest.create_user(username, email, password, role).await
    }

    async fn replace_user(&self, user: domain::User) -> Result<domain::User, domain::UpdateError> {
        self.rest.replace_user(user).await
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::ExerciseRepository for CachedREST<S, K> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        self.rest.read_exercises().await
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        category: domain::Category,
        default_reps: Option<domain::Reps>,
    ) -> Result<domain::Exercise, domain::CreateError> {
        self.rest
            .create_exercise(name, category, default_reps)
            .await
    }

    async fn create_exercises(
        &self,
        exercises: Vec<domain::NewExercise>,
    ) -> Result<Vec<domain::Exercise>, domain::CreateError> {
        self.rest.create_exercises(exercises).await
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        self.rest.replace_exercise(exercise).await
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.rest.delete_exercise(id).await
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::WorkoutTemplateRepository for CachedREST<S, K> {
    async fn sync_workout_templates(
        &self,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::SyncError> {
        sync!(
            self,
            read_workout_templates,
            KEY_WORKOUT_TEMPLATES,
            rest::WorkoutTemplate,
            "workout templates"
        )
    }

    async fn read_workout_templates(
        &self,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::ReadError> {
        read_or_cached!(
            self,
            self.rest.read_workout_templates(),
            KEY_WORKOUT_TEMPLATES,
            rest::WorkoutTemplate,
            "workout templates"
        )
    }

    async fn read_workout_template(
        &self,
        id: &domain::WorkoutTemplateID,
    ) -> Result<domain::WorkoutTemplate, domain::ReadError> {
        self.read_workout_templates()
            .await?
            .into_iter()
            .find(|t| t.id == *id)
            .ok_or(domain::ReadError::NotFound)
    }

    async fn create_workout_template(
        &self,
        name: domain::Name,
        global: bool,
        exercises: Vec<domain::TemplateExercise>,
    ) -> Result<domain::WorkoutTemplate, domain::CreateError> {
        let template = self
            .rest
            .create_workout_template(name, global, exercises)
            .await?;
        self.update_cached_list::<rest::WorkoutTemplate, domain::WorkoutTemplate>(
            KEY_WORKOUT_TEMPLATES,
            "workout templates",
            |templates| templates.push(template.clone()),
        );
        Ok(template)
    }

    async fn replace_workout_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, domain::UpdateError> {
        let template = self.rest.replace_workout_template(template).await?;
        self.update_cached_list::<rest::WorkoutTemplate, domain::WorkoutTemplate>(
            KEY_WORKOUT_TEMPLATES,
            "workout templates",
            |templates| {
                for t in templates.iter_mut().filter(|t| t.id == template.id) {
                    *t = template.clone();
                }
            },
        );
        Ok(template)
    }

    async fn delete_workout_template(
        &self,
        id: domain::WorkoutTemplateID,
    ) -> Result<domain::WorkoutTemplateID, domain::DeleteError> {
        let id = self.rest.delete_workout_template(id).await?;
        self.update_cached_list::<rest::WorkoutTemplate, domain::WorkoutTemplate>(
            KEY_WORKOUT_TEMPLATES,
            "workout templates",
            |templates| templates.retain(|t| t.id != id),
        );
        Ok(id)
    }

    async fn import_workout_templates(
        &self,
        templates: Vec<domain::WorkoutTemplate>,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::CreateError> {
        let templates = self.rest.import_workout_templates(templates).await?;
        self.update_cached_list::<rest::WorkoutTemplate, domain::WorkoutTemplate>(
            KEY_WORKOUT_TEMPLATES,
            "workout templates",
            |cached| cached.extend(templates.iter().cloned()),
        );
        Ok(templates)
    }
}

impl<S: SendRequest, K: KeyValueStore> domain::CompletedWorkoutRepository for CachedREST<S, K> {
    async fn sync_completed_workouts(
        &self,
    ) -> Result<Vec<domain::CompletedWorkout>, domain::SyncError> {
        sync!(
            self,
            sync_completed_workouts,
            KEY_COMPLETED_WORKOUTS,
            rest::CompletedWorkout,
            "completed workouts"
        )
    }

    async fn read_completed_workouts(
        &self,
        user_id: Option<&domain::UserID>,
    ) -> Result<Vec<domain::CompletedWorkout>, domain::ReadError> {
        let workouts: Vec<domain::CompletedWorkout> = read_or_cached!(
            self,
            self.rest.read_completed_workouts(None),
            KEY_COMPLETED_WORKOUTS,
            rest::CompletedWorkout,
            "completed workouts"
        )?;
        Ok(workouts
            .into_iter()
            .filter(|w| user_id.is_none_or(|id| w.user_id == *id))
            .collect())
    }

    async fn read_completed_workout(
        &self,
        id: &domain::CompletedWorkoutID,
    ) -> Result<domain::CompletedWorkout, domain::ReadError> {
        match self.rest.read_completed_workout(id).await {
            Err(domain::ReadError::Storage(domain::StorageError::NoConnection)) => self
                .cached_list::<rest::CompletedWorkout, domain::CompletedWorkout>(
                    KEY_COMPLETED_WORKOUTS,
                )
                .and_then(|workouts| workouts.into_iter().find(|w| w.id == *id))
                .ok_or(domain::ReadError::Storage(
                    domain::StorageError::NoConnection,
                )),
            result => result,
        }
    }

    async fn create_completed_workout(
        &self,
        template_id: Option<domain::WorkoutTemplateID>,
        template_name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exercises: Vec<domain::WorkoutExercise>,
    ) -> Result<domain::CompletedWorkout, domain::CreateError> {
        let workout = self
            .rest
            .create_completed_workout(
                template_id,
                template_name,
                start_time,
                end_time,
                exercises,
            )
            .await?;
        self.cache.remove(KEY_COMPLETED_WORKOUTS);
        Ok(workout)
    }

    async fn replace_completed_workout(
        &self,
        workout: domain::CompletedWorkout,
    ) -> Result<domain::CompletedWorkout, domain::UpdateError> {
        let workout = self.rest.replace_completed_workout(workout).await?;
        self.update_cached_list::<rest::CompletedWorkout, domain::CompletedWorkout>(
            KEY_COMPLETED_WORKOUTS,
            "completed workouts",
            |workouts| {
                for w in workouts.iter_mut().filter(|w| w.id == workout.id) {
                    *w = workout.clone();
                }
            },
        );
        Ok(workout)
    }

    async fn delete_completed_workout(
        &self,
        id: domain::CompletedWorkoutID,
    ) -> Result<domain::CompletedWorkoutID, domain::DeleteError> {
        let id = self.rest.delete_completed_workout(id).await?;
        self.update_cached_list::<rest::CompletedWorkout, domain::CompletedWorkout>(
            KEY_COMPLETED_WORKOUTS,
            "completed workouts",
            |workouts| workouts.retain(|w| w.id != id),
        );
        Ok(id)
    }
}
