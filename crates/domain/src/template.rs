use derive_more::{Deref, Display};

use crate::{
    Category, CreateError, DeleteError, ExerciseRef, Name, ReadError, Reps, SyncError,
    UpdateError, User, UserID,
};

#[allow(async_fn_in_trait)]
pub trait WorkoutTemplateService {
    async fn get_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn get_workout_template(
        &self,
        id: &WorkoutTemplateID,
    ) -> Result<WorkoutTemplate, ReadError>;
    async fn create_workout_template(
        &self,
        name: Name,
        global: bool,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError>;
    async fn replace_workout_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_workout_template(
        &self,
        id: WorkoutTemplateID,
    ) -> Result<WorkoutTemplateID, DeleteError>;
    async fn import_workout_templates(
        &self,
        templates: Vec<WorkoutTemplate>,
    ) -> Result<Vec<WorkoutTemplate>, CreateError>;

    async fn get_workout_templates_for(
        &self,
        user: &User,
    ) -> Result<Vec<WorkoutTemplate>, ReadError> {
        Ok(self
            .get_workout_templates()
            .await?
            .into_iter()
            .filter(|t| t.is_visible_to(user))
            .collect())
    }
}

#[allow(async_fn_in_trait)]
pub trait WorkoutTemplateRepository {
    async fn sync_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, SyncError>;
    async fn read_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError>;
    async fn read_workout_template(
        &self,
        id: &WorkoutTemplateID,
    ) -> Result<WorkoutTemplate, ReadError>;
    async fn create_workout_template(
        &self,
        name: Name,
        global: bool,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError>;
    async fn replace_workout_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError>;
    async fn delete_workout_template(
        &self,
        id: WorkoutTemplateID,
    ) -> Result<WorkoutTemplateID, DeleteError>;
    async fn import_workout_templates(
        &self,
        templates: Vec<WorkoutTemplate>,
    ) -> Result<Vec<WorkoutTemplate>, CreateError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutTemplate {
    pub id: WorkoutTemplateID,
    pub name: Name,
    pub owner: Option<UserID>,
    pub global: bool,
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    #[must_use]
    pub fn is_visible_to(&self, user: &User) -> bool {
        self.global || user.is_admin() || self.owner.as_ref() == Some(&user.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateExercise {
    pub exercise: ExerciseRef,
    pub category: Category,
    pub sets: u32,
    pub reps: Reps,
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkoutTemplateID(String);

impl WorkoutTemplateID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for WorkoutTemplateID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for WorkoutTemplateID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for WorkoutTemplateID {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}
