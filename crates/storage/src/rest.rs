//! REST client
//!
//! Every request passes through a `SendRequest` implementation. Network failures, timeouts and
//! server errors are retried with a linearly increasing delay. The server is not consistent in
//! how it encodes identifiers, timestamps and numbers, so the DTOs in this module accept every
//! encoding observed and resolve it once when converting into domain types.

use std::{cell::RefCell, pin::pin, time::Duration};

use chrono::{DateTime, Utc};
use futures_util::future::{Either, select};
use gloo_net::http::Request;
use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use workitout_domain as domain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Network(String),
    Timeout,
}

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send(
        &self,
        request: &HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send(
        &self,
        request: &HttpRequest,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let controller = web_sys::AbortController::new()
            .map_err(|err| TransportError::Network(format!("{err:?}")))?;
        let signal = controller.signal();
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Delete => Request::delete(&request.url),
        }
        .abort_signal(Some(&signal));
        if let Some(token) = &request.token {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let gloo_request = match &request.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|err| TransportError::Network(err.to_string()))?;

        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let response = pin!(gloo_request.send());
        let timer = pin!(gloo_timers::future::TimeoutFuture::new(millis));
        match select(response, timer).await {
            Either::Left((result, _)) => {
                let response = result.map_err(|err| TransportError::Network(err.to_string()))?;
                let body = response
                    .text()
                    .await
                    .map_err(|err| TransportError::Network(err.to_string()))?;
                Ok(HttpResponse {
                    status: response.status(),
                    status_text: response.status_text(),
                    body,
                })
            }
            Either::Right(((), _)) => {
                controller.abort();
                Err(TransportError::Timeout)
            }
        }
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            base_url: "api".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt`, starting at one.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    NoConnection,
    NoSession,
    NotFound,
    Conflict,
    Other(String),
}

impl From<FetchError> for domain::StorageError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::NoConnection => domain::StorageError::NoConnection,
            FetchError::NoSession => domain::StorageError::NoSession,
            FetchError::NotFound => domain::StorageError::Other("not found".into()),
            FetchError::Conflict => domain::StorageError::Other("conflict".into()),
            FetchError::Other(message) => domain::StorageError::Other(message.into()),
        }
    }
}

impl From<FetchError> for domain::ReadError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::NotFound => domain::ReadError::NotFound,
            err => domain::ReadError::Storage(err.into()),
        }
    }
}

impl From<FetchError> for domain::SyncError {
    fn from(value: FetchError) -> Self {
        domain::ReadError::from(value).into()
    }
}

impl From<FetchError> for domain::CreateError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Conflict => domain::CreateError::Conflict,
            err => domain::CreateError::Storage(err.into()),
        }
    }
}

impl From<FetchError> for domain::UpdateError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Conflict => domain::UpdateError::Conflict,
            err => domain::UpdateError::Storage(err.into()),
        }
    }
}

impl From<FetchError> for domain::DeleteError {
    fn from(value: FetchError) -> Self {
        domain::DeleteError::Storage(value.into())
    }
}

pub struct REST<S> {
    pub sender: S,
    pub config: RestConfig,
    token: RefCell<Option<String>>,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub fn new() -> Self {
        Self::with(GlooNetSendRequest, RestConfig::default())
    }
}

impl Default for REST<GlooNetSendRequest> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SendRequest> REST<S> {
    #[must_use]
    pub fn with(sender: S, config: RestConfig) -> Self {
        Self {
            sender,
            config,
            token: RefCell::new(None),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.borrow_mut() = token;
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, FetchError> {
        let response = self.fetch_no_content(method, path, body).await?;
        serde_json::from_str(&response.body)
            .map_err(|err| FetchError::Other(format!("deserialization failed: {err}")))
    }

    async fn fetch_no_content(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, FetchError> {
        let request = HttpRequest {
            method,
            url: format!("{}/{path}", self.config.base_url.trim_end_matches('/')),
            token: self.token(),
            body,
        };
        let retry = self.config.retry;
        let mut attempt = 0;
        let result = loop {
            let result = self.sender.send(&request, self.config.timeout).await;
            let retryable = match &result {
                Ok(response) => response.status >= 500,
                Err(_) => true,
            };
            if !retryable || attempt >= retry.max_retries {
                break result;
            }
            attempt += 1;
            debug!(
                "retrying {:?} {} ({attempt}/{})",
                request.method, request.url, retry.max_retries
            );
            self.sender.sleep(retry.delay(attempt)).await;
        };

        match result {
            Ok(response) if response.ok() => Ok(response),
            Ok(response) => Err(match response.status {
                401 => FetchError::NoSession,
                404 => FetchError::NotFound,
                409 => FetchError::Conflict,
                status => FetchError::Other(format!("{status} {}", response.status_text)),
            }),
            Err(err) => {
                debug!("request to {} failed: {err:?}", request.url);
                Err(FetchError::NoConnection)
            }
        }
    }
}

impl<S: SendRequest> domain::HealthRepository for REST<S> {
    async fn read_health(&self) -> Result<domain::Health, domain::ReadError> {
        Ok(self
            .fetch::<Health>(Method::Get, "health", None)
            .await?
            .into())
    }
}

impl<S: SendRequest> domain::SessionRepository for REST<S> {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<domain::User, domain::ReadError> {
        let auth: Auth = self
            .fetch(
                Method::Post,
                "auth/login",
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        self.set_token(Some(auth.token));
        domain::User::try_from(auth.user).map_err(invalid)
    }

    async fn register(
        &self,
        username: domain::Name,
        email: String,
        password: String,
    ) -> Result<domain::User, domain::CreateError> {
        let auth: Auth = self
            .fetch(
                Method::Post,
                "auth/register",
                Some(json!({
                    "username": username.as_str(),
                    "email": email,
                    "password": password,
                })),
            )
            .await?;
        self.set_token(Some(auth.token));
        domain::User::try_from(auth.user).map_err(invalid)
    }

    async fn initialize_session(&self) -> Result<domain::User, domain::ReadError> {
        if self.token.borrow().is_none() {
            return Err(domain::StorageError::NoSession.into());
        }
        let me: Me = self.fetch(Method::Get, "auth/me", None).await?;
        domain::User::try_from(me.into_user()).map_err(invalid)
    }

    async fn delete_session(&self) -> Result<(), domain::DeleteError> {
        self.set_token(None);
        Ok(())
    }

    async fn change_password(
        &self,
        current_password: String,
        new_password: String,
    ) -> Result<(), domain::UpdateError> {
        self.fetch_no_content(
            Method::Post,
            "auth/change-password",
            Some(json!({
                "currentPassword": current_password,
                "newPassword": new_password,
            })),
        )
        .await?;
        Ok(())
    }

    async fn request_password_reset(&self, email: String) -> Result<(), domain::UpdateError> {
        self.fetch_no_content(
            Method::Post,
            "auth/forgot-password",
            Some(json!({ "email": email })),
        )
        .await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        token: String,
        new_password: String,
    ) -> Result<(), domain::UpdateError> {
        self.fetch_no_content(
            Method::Post,
            "auth/reset-password",
            Some(json!({ "token": token, "password": new_password })),
        )
        .await?;
        Ok(())
    }
}

impl<S: SendRequest> domain::UserRepository for REST<S> {
    async fn read_users(&self) -> Result<Vec<domain::User>, domain::ReadError> {
        let users: Vec<User> = self.fetch(Method::Get, "users", None).await?;
        Ok(valid(users))
    }

    async fn create_user(
        &self,
        username: domain::Name,
        email: String,
        password: String,
        role: domain::Role,
    ) -> Result<domain::User, domain::CreateError> {
        let user: User = self
            .fetch(
                Method::Post,
                "users",
                Some(json!({
                    "username": username.as_str(),
                    "email": email,
                    "password": password,
                    "role": role.to_string(),
                })),
            )
            .await?;
        domain::User::try_from(user).map_err(invalid)
    }

    async fn replace_user(&self, user: domain::User) -> Result<domain::User, domain::UpdateError> {
        let user: User = self
            .fetch(
                Method::Put,
                &format!("users/{}", user.id),
                Some(json!(User::from(user))),
            )
            .await?;
        domain::User::try_from(user).map_err(invalid)
    }
}

impl<S: SendRequest> domain::ExerciseRepository for REST<S> {
    async fn read_exercises(&self) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let exercises: Vec<Exercise> = self.fetch(Method::Get, "exercises", None).await?;
        Ok(valid(exercises))
    }

    async fn create_exercise(
        &self,
        name: domain::Name,
        category: domain::Category,
        default_reps: Option<domain::Reps>,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let exercise: Exercise = self
            .fetch(
                Method::Post,
                "exercises",
                Some(json!(NewExercise::from(domain::NewExercise {
                    name,
                    category,
                    default_reps
                }))),
            )
            .await?;
        domain::Exercise::try_from(exercise).map_err(invalid)
    }

    async fn create_exercises(
        &self,
        exercises: Vec<domain::NewExercise>,
    ) -> Result<Vec<domain::Exercise>, domain::CreateError> {
        let exercises: Vec<Exercise> = self
            .fetch(
                Method::Post,
                "exercises/bulk",
                Some(json!({
                    "exercises": exercises
                        .into_iter()
                        .map(NewExercise::from)
                        .collect::<Vec<_>>()
                })),
            )
            .await?;
        Ok(valid(exercises))
    }

    async fn replace_exercise(
        &self,
        exercise: domain::Exercise,
    ) -> Result<domain::Exercise, domain::UpdateError> {
        let exercise: Exercise = self
            .fetch(
                Method::Put,
                &format!("exercises/{}", exercise.id),
                Some(json!(Exercise::from(exercise))),
            )
            .await?;
        domain::Exercise::try_from(exercise).map_err(invalid)
    }

    async fn delete_exercise(
        &self,
        id: domain::ExerciseID,
    ) -> Result<domain::ExerciseID, domain::DeleteError> {
        self.fetch_no_content(Method::Delete, &format!("exercises/{id}"), None)
            .await?;
        Ok(id)
    }
}

impl<S: SendRequest> domain::WorkoutTemplateRepository for REST<S> {
    async fn sync_workout_templates(
        &self,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::SyncError> {
        Ok(self.read_workout_templates().await?)
    }

    async fn read_workout_templates(
        &self,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::ReadError> {
        let templates: Vec<WorkoutTemplate> =
            self.fetch(Method::Get, "workout-templates", None).await?;
        Ok(valid(templates))
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
        let template: WorkoutTemplate = self
            .fetch(
                Method::Post,
                "workout-templates",
                Some(json!({
                    "name": name.as_str(),
                    "isGlobal": global,
                    "exercises": exercises
                        .into_iter()
                        .map(TemplateExercise::from)
                        .collect::<Vec<_>>(),
                })),
            )
            .await?;
        domain::WorkoutTemplate::try_from(template).map_err(invalid)
    }

    async fn replace_workout_template(
        &self,
        template: domain::WorkoutTemplate,
    ) -> Result<domain::WorkoutTemplate, domain::UpdateError> {
        let template: WorkoutTemplate = self
            .fetch(
                Method::Put,
                &format!("workout-templates/{}", template.id),
                Some(json!(WorkoutTemplate::from(template))),
            )
            .await?;
        domain::WorkoutTemplate::try_from(template).map_err(invalid)
    }

    async fn delete_workout_template(
        &self,
        id: domain::WorkoutTemplateID,
    ) -> Result<domain::WorkoutTemplateID, domain::DeleteError> {
        self.fetch_no_content(Method::Delete, &format!("workout-templates/{id}"), None)
            .await?;
        Ok(id)
    }

    async fn import_workout_templates(
        &self,
        templates: Vec<domain::WorkoutTemplate>,
    ) -> Result<Vec<domain::WorkoutTemplate>, domain::CreateError> {
        let templates: Vec<WorkoutTemplate> = self
            .fetch(
                Method::Post,
                "workout-templates/import",
                Some(json!({
                    "templates": templates
                        .into_iter()
                        .map(WorkoutTemplate::from)
                        .collect::<Vec<_>>()
                })),
            )
            .await?;
        Ok(valid(templates))
    }
}

impl<S: SendRequest> domain::CompletedWorkoutRepository for REST<S> {
    async fn sync_completed_workouts(
        &self,
    ) -> Result<Vec<domain::CompletedWorkout>, domain::SyncError> {
        Ok(self.read_completed_workouts(None).await?)
    }

    async fn read_completed_workouts(
        &self,
        user_id: Option<&domain::UserID>,
    ) -> Result<Vec<domain::CompletedWorkout>, domain::ReadError> {
        let workouts: Vec<CompletedWorkout> =
            self.fetch(Method::Get, "completed-workouts", None).await?;
        Ok(workouts
            .into_iter()
            .map(domain::CompletedWorkout::from)
            .filter(|w| user_id.is_none_or(|id| w.user_id == *id))
            .collect())
    }

    async fn read_completed_workout(
        &self,
        id: &domain::CompletedWorkoutID,
    ) -> Result<domain::CompletedWorkout, domain::ReadError> {
        let workout: CompletedWorkout = self
            .fetch(Method::Get, &format!("completed-workouts/{id}"), None)
            .await?;
        Ok(workout.into())
    }

    async fn create_completed_workout(
        &self,
        template_id: Option<domain::WorkoutTemplateID>,
        template_name: String,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exercises: Vec<domain::WorkoutExercise>,
    ) -> Result<domain::CompletedWorkout, domain::CreateError> {
        let workout: CompletedWorkout = self
            .fetch(
                Method::Post,
                "completed-workouts",
                Some(json!({
                    "templateId": template_id.map(|id| id.to_string()),
                    "templateName": template_name,
                    "startTime": start_time.to_rfc3339(),
                    "endTime": end_time.to_rfc3339(),
                    "exercises": exercises
                        .into_iter()
                        .map(WorkoutExercise::from)
                        .collect::<Vec<_>>(),
                })),
            )
            .await?;
        Ok(workout.into())
    }

    async fn replace_completed_workout(
        &self,
        workout: domain::CompletedWorkout,
    ) -> Result<domain::CompletedWorkout, domain::UpdateError> {
        let workout: CompletedWorkout = self
            .fetch(
                Method::Put,
                &format!("completed-workouts/{}", workout.id),
                Some(json!(CompletedWorkout::from(workout))),
            )
            .await?;
        Ok(workout.into())
    }

    async fn delete_completed_workout(
        &self,
        id: domain::CompletedWorkoutID,
    ) -> Result<domain::CompletedWorkoutID, domain::DeleteError> {
        self.fetch_no_content(Method::Delete, &format!("completed-workouts/{id}"), None)
            .await?;
        Ok(id)
    }
}

/// Converts all entries that form valid domain objects and drops the rest.
fn valid<D, T>(entries: Vec<D>) -> Vec<T>
where
    T: TryFrom<D, Error = String>,
{
    entries
        .into_iter()
        .filter_map(|entry| match T::try_from(entry) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("ignoring invalid entry: {err}");
                None
            }
        })
        .collect()
}

fn invalid<E: From<Box<dyn std::error::Error>>>(message: String) -> E {
    E::from(message.into())
}

/// An identifier as sent by the server: a string, a number or a (populated) document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawID {
    Text(String),
    Number(serde_json::Number),
    Document(IDDocument),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IDDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<Box<RawID>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Box<RawID>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RawID {
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        match self {
            RawID::Text(text) => Some(text.trim().to_string()).filter(|id| !id.is_empty()),
            RawID::Number(number) => Some(number.to_string()),
            RawID::Document(document) => document
                .mongo_id
                .as_ref()
                .and_then(|id| id.resolve())
                .or_else(|| document.id.as_ref().and_then(|id| id.resolve())),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            RawID::Document(IDDocument {
                name: Some(name), ..
            }) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for RawID {
    fn from(value: &str) -> Self {
        RawID::Text(value.to_string())
    }
}

fn resolve_id<T: From<String> + Default>(ids: &[&Option<RawID>]) -> T {
    ids.iter()
        .find_map(|id| id.as_ref().and_then(RawID::resolve))
        .map(T::from)
        .unwrap_or_default()
}

fn to_raw_id(id: &str) -> Option<RawID> {
    (!id.is_empty()).then(|| RawID::from(id))
}

/// A number that may also be sent as a string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawNumber {
    Integer(u64),
    Number(f64),
    Text(String),
}

impl RawNumber {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn weight(&self) -> Option<domain::Weight> {
        match self {
            RawNumber::Integer(number) => domain::Weight::new(*number as f32).ok(),
            RawNumber::Number(number) => domain::Weight::new(*number as f32).ok(),
            RawNumber::Text(text) => domain::Weight::try_from(text.as_str()).ok(),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn reps(&self) -> Option<domain::Reps> {
        match self {
            RawNumber::Integer(number) => domain::Reps::new(u32::try_from(*number).ok()?).ok(),
            RawNumber::Number(number) if *number >= 0.0 => {
                domain::Reps::new(number.round() as u32).ok()
            }
            RawNumber::Number(_) => None,
            RawNumber::Text(text) => domain::Reps::try_from(text.as_str()).ok(),
        }
    }
}

impl From<domain::Weight> for RawNumber {
    fn from(value: domain::Weight) -> Self {
        let text = value.to_string();
        text.parse().map_or(RawNumber::Text(text), RawNumber::Number)
    }
}

impl From<u32> for RawNumber {
    fn from(value: u32) -> Self {
        RawNumber::Integer(u64::from(value))
    }
}

/// Accepts RFC 3339 strings and milliseconds since the epoch.
fn parse_time(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|time| time.with_timezone(&Utc)),
        Value::Number(number) => DateTime::from_timestamp_millis(number.as_i64()?),
        _ => None,
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> Option<Value> {
    time.map(|time| Value::String(time.to_rfc3339()))
}

fn name(value: &str) -> Result<domain::Name, String> {
    domain::Name::new(&value.trim().chars().take(64).collect::<String>())
        .map_err(|err| format!("invalid name \"{value}\": {err}"))
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Health {
    #[serde(default)]
    pub status: String,
}

impl From<Health> for domain::Health {
    fn from(value: Health) -> Self {
        domain::Health {
            status: value.status,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Auth {
    pub token: String,
    pub user: User,
}

/// Response of `auth/me`, either the user itself or wrapped into an object.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Me {
    Wrapped { user: User },
    Plain(User),
}

impl Me {
    fn into_user(self) -> User {
        match self {
            Me::Wrapped { user } | Me::Plain(user) => user,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawID>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TryFrom<User> for domain::User {
    type Error = String;

    fn try_from(value: User) -> Result<Self, Self::Error> {
        Ok(domain::User {
            id: resolve_id(&[&value.mongo_id, &value.id]),
            username: name(&value.username)?,
            email: value.email.unwrap_or_default(),
            role: value
                .role
                .as_deref()
                .map(domain::Role::parse_lenient)
                .unwrap_or_default(),
        })
    }
}

impl From<domain::User> for User {
    fn from(value: domain::User) -> Self {
        User {
            mongo_id: to_raw_id(&value.id),
            id: None,
            username: value.username.to_string(),
            email: Some(value.email),
            role: Some(value.role.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawID>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub default_reps: Option<RawNumber>,
}

impl TryFrom<Exercise> for domain::Exercise {
    type Error = String;

    fn try_from(value: Exercise) -> Result<Self, Self::Error> {
        Ok(domain::Exercise {
            id: resolve_id(&[&value.mongo_id, &value.id]),
            name: name(&value.name)?,
            category: value
                .category
                .as_deref()
                .map(domain::Category::parse_lenient)
                .unwrap_or_default(),
            default_reps: value.default_reps.as_ref().and_then(RawNumber::reps),
        })
    }
}

impl From<domain::Exercise> for Exercise {
    fn from(value: domain::Exercise) -> Self {
        Exercise {
            mongo_id: to_raw_id(&value.id),
            id: None,
            name: value.name.to_string(),
            category: Some(value.category.to_string()),
            default_reps: value
                .default_reps
                .map(|reps| RawNumber::from(u32::from(reps))),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    pub default_reps: Option<u32>,
}

impl From<domain::NewExercise> for NewExercise {
    fn from(value: domain::NewExercise) -> Self {
        NewExercise {
            name: value.name.to_string(),
            category: value.category.to_string(),
            default_reps: value.default_reps.map(u32::from),
        }
    }
}

/// Reference to an exercise inside a template or a completed workout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<RawID>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<ExerciseRef> for domain::ExerciseRef {
    fn from(value: ExerciseRef) -> Self {
        let id = [&value.exercise_id, &value.mongo_id, &value.id]
            .iter()
            .find_map(|id| id.as_ref().and_then(RawID::resolve))
            .map(domain::ExerciseID::from);
        let name = value
            .name
            .as_deref()
            .or_else(|| value.exercise_id.as_ref().and_then(RawID::name))
            .unwrap_or_default()
            .trim()
            .to_string();
        domain::ExerciseRef::new(id, &name)
    }
}

impl From<domain::ExerciseRef> for ExerciseRef {
    fn from(value: domain::ExerciseRef) -> Self {
        ExerciseRef {
            exercise_id: value.id.as_ref().and_then(|id| to_raw_id(id)),
            mongo_id: None,
            id: None,
            name: Some(value.name),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawID>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "owner", alias = "createdBy")]
    pub user_id: Option<RawID>,
    #[serde(default, alias = "global")]
    pub is_global: Option<bool>,
    #[serde(default)]
    pub exercises: Option<Vec<TemplateExercise>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    #[serde(flatten)]
    pub exercise: ExerciseRef,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sets: Option<RawNumber>,
    #[serde(default)]
    pub reps: Option<RawNumber>,
}

impl TryFrom<WorkoutTemplate> for domain::WorkoutTemplate {
    type Error = String;

    fn try_from(value: WorkoutTemplate) -> Result<Self, Self::Error> {
        Ok(domain::WorkoutTemplate {
            id: resolve_id(&[&value.mongo_id, &value.id]),
            name: name(&value.name)?,
            owner: value
                .user_id
                .as_ref()
                .and_then(RawID::resolve)
                .map(domain::UserID::from),
            global: value.is_global.unwrap_or_default(),
            exercises: value
                .exercises
                .unwrap_or_default()
                .into_iter()
                .map(domain::TemplateExercise::from)
                .collect(),
        })
    }
}

impl From<TemplateExercise> for domain::TemplateExercise {
    fn from(value: TemplateExercise) -> Self {
        domain::TemplateExercise {
            category: value
                .category
                .as_deref()
                .map(domain::Category::parse_lenient)
                .unwrap_or_default(),
            sets: value
                .sets
                .as_ref()
                .and_then(RawNumber::reps)
                .map_or(0, u32::from),
            reps: value
                .reps
                .as_ref()
                .and_then(RawNumber::reps)
                .unwrap_or_default(),
            exercise: value.exercise.into(),
        }
    }
}

impl From<domain::WorkoutTemplate> for WorkoutTemplate {
    fn from(value: domain::WorkoutTemplate) -> Self {
        WorkoutTemplate {
            mongo_id: to_raw_id(&value.id),
            id: None,
            name: value.name.to_string(),
            user_id: value.owner.as_ref().and_then(|id| to_raw_id(id)),
            is_global: Some(value.global),
            exercises: Some(
                value
                    .exercises
                    .into_iter()
                    .map(TemplateExercise::from)
                    .collect(),
            ),
        }
    }
}

impl From<domain::TemplateExercise> for TemplateExercise {
    fn from(value: domain::TemplateExercise) -> Self {
        TemplateExercise {
            exercise: value.exercise.into(),
            category: Some(value.category.to_string()),
            sets: Some(RawNumber::from(value.sets)),
            reps: Some(RawNumber::from(u32::from(value.reps))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedWorkout {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<RawID>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawID>,
    #[serde(default)]
    pub user_id: Option<RawID>,
    #[serde(default)]
    pub template_id: Option<RawID>,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default)]
    pub start_time: Option<Value>,
    #[serde(default)]
    pub end_time: Option<Value>,
    #[serde(default)]
    pub exercises: Option<Vec<WorkoutExercise>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    #[serde(flatten)]
    pub exercise: ExerciseRef,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sets: Option<Vec<Set>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Set {
    #[serde(default)]
    pub weight: Option<RawNumber>,
    #[serde(default)]
    pub reps: Option<RawNumber>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl From<CompletedWorkout> for domain::CompletedWorkout {
    fn from(value: CompletedWorkout) -> Self {
        domain::CompletedWorkout {
            id: resolve_id(&[&value.mongo_id, &value.id]),
            user_id: resolve_id(&[&value.user_id]),
            template_id: value
                .template_id
                .as_ref()
                .and_then(RawID::resolve)
                .map(domain::WorkoutTemplateID::from),
            template_name: value.template_name.unwrap_or_default(),
            start_time: parse_time(value.start_time.as_ref()),
            end_time: parse_time(value.end_time.as_ref()),
            exercises: value
                .exercises
                .unwrap_or_default()
                .into_iter()
                .map(domain::WorkoutExercise::from)
                .collect(),
        }
    }
}

impl From<WorkoutExercise> for domain::WorkoutExercise {
    fn from(value: WorkoutExercise) -> Self {
        domain::WorkoutExercise {
            category: value
                .category
                .as_deref()
                .map(domain::Category::parse_lenient)
                .unwrap_or_default(),
            sets: value
                .sets
                .map(|sets| sets.into_iter().map(domain::Set::from).collect()),
            exercise: value.exercise.into(),
        }
    }
}

impl From<Set> for domain::Set {
    fn from(value: Set) -> Self {
        domain::Set {
            weight: value.weight.as_ref().and_then(RawNumber::weight),
            reps: value.reps.as_ref().and_then(RawNumber::reps),
            completed: value.completed.unwrap_or_default(),
        }
    }
}

impl From<domain::CompletedWorkout> for CompletedWorkout {
    fn from(value: domain::CompletedWorkout) -> Self {
        CompletedWorkout {
            mongo_id: to_raw_id(&value.id),
            id: None,
            user_id: to_raw_id(&value.user_id),
            template_id: value.template_id.as_ref().and_then(|id| to_raw_id(id)),
            template_name: Some(value.template_name),
            start_time: format_time(value.start_time),
            end_time: format_time(value.end_time),
            exercises: Some(
                value
                    .exercises
                    .into_iter()
                    .map(WorkoutExercise::from)
                    .collect(),
            ),
        }
    }
}

impl From<domain::WorkoutExercise> for WorkoutExercise {
    fn from(value: domain::WorkoutExercise) -> Self {
        WorkoutExercise {
            exercise: value.exercise.into(),
            category: Some(value.category.to_string()),
            sets: value
                .sets
                .map(|sets| sets.into_iter().map(Set::from).collect()),
        }
    }
}

impl From<domain::Set> for Set {
    fn from(value: domain::Set) -> Self {
        Set {
            weight: value.weight.map(RawNumber::from),
            reps: value.reps.map(|reps| RawNumber::from(u32::from(reps))),
            completed: Some(value.completed),
        }
    }
}
