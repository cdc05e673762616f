use chrono::{DateTime, Utc};
use log::{debug, error};

use crate::{
    Category, CompletedWorkout, CompletedWorkoutID, CompletedWorkoutRepository,
    CompletedWorkoutService, CreateError, DeleteError, Exercise, ExerciseID, ExerciseRepository,
    ExerciseService, Health, HealthRepository, HealthService, Name, NewExercise, ReadError, Reps,
    Role, SessionRepository, SessionService, SyncError, TemplateExercise, UpdateError, User,
    UserID, UserRepository, UserService, WorkoutExercise, WorkoutTemplate, WorkoutTemplateID,
    WorkoutTemplateRepository, WorkoutTemplateService,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R> Service<R>
where
    R: WorkoutTemplateRepository + CompletedWorkoutRepository,
{
    pub async fn sync(&self) -> Result<(), SyncError> {
        self.repository.sync_workout_templates().await?;
        self.repository.sync_completed_workouts().await?;
        Ok(())
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: HealthRepository> HealthService for Service<R> {
    async fn get_health(&self) -> Result<Health, ReadError> {
        log_on_error!(self.repository.read_health(), ReadError, "get", "health")
    }
}

impl<R: SessionRepository> SessionService for Service<R> {
    async fn login(&self, username: &str, password: &str) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.login(username, password),
            ReadError,
            "create",
            "session"
        )
    }

    async fn register(
        &self,
        username: Name,
        email: String,
        password: String,
    ) -> Result<User, CreateError> {
        log_on_error!(
            self.repository.register(username, email, password),
            CreateError,
            "register",
            "user"
        )
    }

    async fn get_session(&self) -> Result<User, ReadError> {
        log_on_error!(
            self.repository.initialize_session(),
            ReadError,
            "get",
            "session"
        )
    }

    async fn delete_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_session(),
            DeleteError,
            "delete",
            "session"
        )
    }

    async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository
                .change_password(current_password, new_password),
            UpdateError,
            "change",
            "password"
        )
    }

    async fn request_password_reset(&self, email: String) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.request_password_reset(email),
            UpdateError,
            "request",
            "password reset"
        )
    }

    async fn reset_password(&self, token: String, new_password: String) -> Result<(), UpdateError> {
        log_on_error!(
            self.repository.reset_password(token, new_password),
            UpdateError,
            "reset",
            "password"
        )
    }
}

impl<R: UserRepository> UserService for Service<R> {
    async fn get_users(&self) -> Result<Vec<User>, ReadError> {
        log_on_error!(self.repository.read_users(), ReadError, "get", "users")
    }

    async fn create_user(
        &self,
        username: Name,
        email: String,
        password: String,
        role: Role,
    ) -> Result<User, CreateError> {
        log_on_error!(
            self.repository.create_user(username, email, password, role),
            CreateError,
            "create",
            "user"
        )
    }

    async fn replace_user(&self, user: User) -> Result<User, UpdateError> {
        log_on_error!(
            self.repository.replace_user(user),
            UpdateError,
            "replace",
            "user"
        )
    }
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }

    async fn create_exercise(
        &self,
        name: Name,
        category: Category,
        default_reps: Option<Reps>,
    ) -> Result<Exercise, CreateError> {
        log_on_error!(
            self.repository
                .create_exercise(name, category, default_reps),
            CreateError,
            "create",
            "exercise"
        )
    }

    async fn create_exercises(
        &self,
        exercises: Vec<NewExercise>,
    ) -> Result<Vec<Exercise>, CreateError> {
        log_on_error!(
            self.repository.create_exercises(exercises),
            CreateError,
            "create",
            "exercises"
        )
    }

    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
        log_on_error!(
            self.repository.replace_exercise(exercise),
            UpdateError,
            "replace",
            "exercise"
        )
    }

    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
        log_on_error!(
            self.repository.delete_exercise(id),
            DeleteError,
            "delete",
            "exercise"
        )
    }
}

impl<R: WorkoutTemplateRepository> WorkoutTemplateService for Service<R> {
    async fn get_workout_templates(&self) -> Result<Vec<WorkoutTemplate>, ReadError> {
        log_on_error!(
            self.repository.read_workout_templates(),
            ReadError,
            "get",
            "workout templates"
        )
    }

    async fn get_workout_template(
        &self,
        id: &WorkoutTemplateID,
    ) -> Result<WorkoutTemplate, ReadError> {
        log_on_error!(
            self.repository.read_workout_template(id),
            ReadError,
            "get",
            "workout template"
        )
    }

    async fn create_workout_template(
        &self,
        name: Name,
        global: bool,
        exercises: Vec<TemplateExercise>,
    ) -> Result<WorkoutTemplate, CreateError> {
        log_on_error!(
            self.repository
                .create_workout_template(name, global, exercises),
            CreateError,
            "create",
            "workout template"
        )
    }

    async fn replace_workout_template(
        &self,
        template: WorkoutTemplate,
    ) -> Result<WorkoutTemplate, UpdateError> {
        log_on_error!(
            self.repository.replace_workout_template(template),
            UpdateError,
            "replace",
            "workout template"
        )
    }

    async fn delete_workout_template(
        &self,
        id: WorkoutTemplateID,
    ) -> Result<WorkoutTemplateID, DeleteError> {
        log_on_error!(
            self.repository.delete_workout_template(id),
            DeleteError,
            "delete",
            "workout template"
        )
    }

    async fn import_workout_templates(
        &self,
        templates: Vec<WorkoutTemplate>,
    ) -> Result<Vec<WorkoutTemplate>, CreateError> {
        log_on_error!(
            self.repository.import_workout_templates(templates),
            CreateError,
            "import",
            "workout templates"
        )
    }
}

impl<R: CompletedWorkoutRepository> CompletedWorkoutService for Service<R> {
    async fn get_completed_workouts(
        &self,
        user_id: Option<&UserID>,
    ) -> Result<Vec<CompletedWorkout>, ReadError> {
        log_on_error!(
            self.repository.read_completed_workouts(user_id),
            ReadError,
            "get",
            "completed workouts"
        )
    }

    async fn get_completed_workout(
        &self,
        id: &CompletedWorkoutID,
    ) -> Result<CompletedWorkout, ReadError> {
        log_on_error!(
            self.repository.read_completed_workout(id),
            ReadError,
            "get",
            "completed workout"
        )
    }

    async fn create_completed_workout(
        &self,
        template_id: Option<WorkoutTemplateID>,
        template_name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exercises: Vec<WorkoutExercise>,
    ) -> Result<CompletedWorkout, CreateError> {
        log_on_error!(
            self.repository.create_completed_workout(
                template_id,
                template_name,
                start_time,
                end_time,
                exercises
            ),
            CreateError,
            "create",
            "completed workout"
        )
    }

    async fn replace_completed_workout(
        &self,
        workout: CompletedWorkout,
    ) -> Result<CompletedWorkout, UpdateError> {
        log_on_error!(
            self.repository.replace_completed_workout(workout),
            UpdateError,
            "replace",
            "completed workout"
        )
    }

    async fn delete_completed_workout(
        &self,
        id: CompletedWorkoutID,
    ) -> Result<CompletedWorkoutID, DeleteError> {
        log_on_error!(
            self.repository.delete_completed_workout(id),
            DeleteError,
            "delete",
            "completed workout"
        )
    }
}
