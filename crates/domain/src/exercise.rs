use derive_more::{Deref, Display};

use crate::{CreateError, DeleteError, Name, ReadError, Reps, UpdateError, ValidationError};

#[allow(async_fn_in_trait)]
pub trait ExerciseService {
    async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        category: Category,
        default_reps: Option<Reps>,
    ) -> Result<Exercise, CreateError>;
    async fn create_exercises(&self, exercises: Vec<NewExercise>)
    -> Result<Vec<Exercise>, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;

    async fn validate_exercise_name(
        &self,
        name: &str,
        id: &ExerciseID,
    ) -> Result<Name, ValidationError> {
        match Name::new(name) {
            Ok(name) => match self.get_exercises().await {
                Ok(exercises) => {
                    let normalized = normalize_name(name.as_str());
                    if exercises
                        .iter()
                        .all(|e| e.id == *id || normalize_name(e.name.as_str()) != normalized)
                    {
                        Ok(name)
                    } else {
                        Err(ValidationError::Conflict("name".to_string()))
                    }
                }
                Err(err) => Err(ValidationError::Other(err.into())),
            },
            Err(err) => Err(ValidationError::Other(err.into())),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait ExerciseRepository {
    async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError>;
    async fn create_exercise(
        &self,
        name: Name,
        category: Category,
        default_reps: Option<Reps>,
    ) -> Result<Exercise, CreateError>;
    async fn create_exercises(&self, exercises: Vec<NewExercise>)
    -> Result<Vec<Exercise>, CreateError>;
    async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError>;
    async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: Name,
    pub category: Category,
    pub default_reps: Option<Reps>,
}

impl Exercise {
    #[must_use]
    pub fn to_ref(&self) -> ExerciseRef {
        ExerciseRef {
            id: Some(self.id.clone()),
            name: self.name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExercise {
    pub name: Name,
    pub category: Category,
    pub default_reps: Option<Reps>,
}

#[derive(Deref, Display, Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseID(String);

impl ExerciseID {
    #[must_use]
    pub fn nil() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for ExerciseID {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Category {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    Cardio,
    #[default]
    Other,
}

impl Category {
    /// Parses a category name, falling back to [`Category::Other`] for unknown names.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

/// Identity of an exercise as it appears inside templates and completed workouts.
///
/// Stored records do not reliably carry an exercise id, so the name acts as a secondary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseRef {
    pub id: Option<ExerciseID>,
    pub name: String,
}

impl ExerciseRef {
    #[must_use]
    pub fn new(id: Option<ExerciseID>, name: &str) -> Self {
        Self {
            id: id.filter(|id| !id.is_nil()),
            name: name.to_string(),
        }
    }

    /// Returns how strongly `other` refers to the same exercise, if at all.
    #[must_use]
    pub fn match_with(&self, other: &ExerciseRef) -> Option<ExerciseMatch> {
        if let (Some(id), Some(other_id)) = (&self.id, &other.id) {
            if id == other_id {
                return Some(ExerciseMatch::Id);
            }
        }

        let name = normalize_name(&self.name);
        let other_name = normalize_name(&other.name);

        if name.is_empty() || other_name.is_empty() {
            return None;
        }

        if name == other_name {
            Some(ExerciseMatch::Name)
        } else if name.contains(&other_name) || other_name.contains(&name) {
            Some(ExerciseMatch::Containment)
        } else {
            None
        }
    }
}

/// Strength of a match between two exercise references, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ExerciseMatch {
    Id,
    Name,
    Containment,
}

#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    struct Exercises(Vec<Exercise>);

    impl ExerciseService for Exercises {
        async fn get_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            Ok(self.0.clone())
        }

        async fn create_exercise(
            &self,
            _: Name,
            _: Category,
            _: Option<Reps>,
        ) -> Result<Exercise, CreateError> {
            Err(CreateError::Conflict)
        }

        async fn create_exercises(&self, _: Vec<NewExercise>) -> Result<Vec<Exercise>, CreateError> {
            Err(CreateError::Conflict)
        }

        async fn replace_exercise(&self, exercise: Exercise) -> Result<Exercise, UpdateError> {
            Ok(exercise)
        }

        async fn delete_exercise(&self, id: ExerciseID) -> Result<ExerciseID, DeleteError> {
            Ok(id)
        }
    }

    fn exercise(id: u128, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            category: Category::Chest,
            default_reps: Some(Reps::new(10).unwrap()),
        }
    }

    #[test]
    fn test_exercise_id_nil() {
        assert!(ExerciseID::nil().is_nil());
        assert_eq!(ExerciseID::nil(), ExerciseID::default());
    }

    #[test]
    fn test_exercise_to_ref() {
        assert_eq!(
            exercise(1, "Bench Press").to_ref(),
            ExerciseRef {
                id: Some(1.into()),
                name: "Bench Press".to_string()
            }
        );
    }

    #[rstest]
    #[case("chest", Category::Chest)]
    #[case("LEGS", Category::Legs)]
    #[case(" Core ", Category::Core)]
    #[case("Olympic", Category::Other)]
    #[case("", Category::Other)]
    fn test_category_parse_lenient(#[case] value: &str, #[case] expected: Category) {
        assert_eq!(Category::parse_lenient(value), expected);
    }

    #[test]
    fn test_category_display_round_trips() {
        for category in Category::iter() {
            assert_eq!(Category::parse_lenient(&category.to_string()), category);
        }
    }

    #[test]
    fn test_exercise_ref_new_drops_nil_id() {
        assert_eq!(ExerciseRef::new(Some(ExerciseID::nil()), "Squat").id, None);
        assert_eq!(
            ExerciseRef::new(Some(7.into()), "Squat").id,
            Some(ExerciseID::from(7))
        );
    }

    #[rstest]
    #[case(Some("1"), "Bench Press", Some("1"), "Flat Bench", Some(ExerciseMatch::Id))]
    #[case(Some("1"), "Bench Press", Some("2"), "bench press", Some(ExerciseMatch::Name))]
    #[case(None, "Bench Press", None, "  BENCH   press ", Some(ExerciseMatch::Name))]
    #[case(None, "Bench Press", None, "Incline Bench Press", Some(ExerciseMatch::Containment))]
    #[case(None, "Incline Bench Press", None, "bench press", Some(ExerciseMatch::Containment))]
    #[case(Some("1"), "Bench Press", Some("2"), "Squat", None)]
    #[case(None, "", None, "Squat", None)]
    #[case(None, "Squat", None, "   ", None)]
    fn test_exercise_ref_match_with(
        #[case] id: Option<&str>,
        #[case] name: &str,
        #[case] other_id: Option<&str>,
        #[case] other_name: &str,
        #[case] expected: Option<ExerciseMatch>,
    ) {
        let a = ExerciseRef::new(id.map(ExerciseID::from), name);
        let b = ExerciseRef::new(other_id.map(ExerciseID::from), other_name);
        assert_eq!(a.match_with(&b), expected);
        assert_eq!(b.match_with(&a), expected);
    }

    #[test]
    fn test_exercise_match_order() {
        assert!(ExerciseMatch::Id < ExerciseMatch::Name);
        assert!(ExerciseMatch::Name < ExerciseMatch::Containment);
    }

    #[rstest]
    #[case("Bench Press", "bench press")]
    #[case("  Bench \t Press  ", "bench press")]
    #[case("", "")]
    fn test_normalize_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_name(name), expected);
    }

    #[rstest]
    #[case("Deadlift", ExerciseID::from(3), true)]
    #[case("bench press", ExerciseID::from(1), true)]
    #[case("bench  PRESS", ExerciseID::from(3), false)]
    #[case("", ExerciseID::from(3), false)]
    fn test_validate_exercise_name(
        #[case] name: &str,
        #[case] id: ExerciseID,
        #[case] valid: bool,
    ) {
        let exercises = Exercises(vec![exercise(1, "Bench Press"), exercise(2, "Squat")]);
        assert_eq!(
            block_on(exercises.validate_exercise_name(name, &id)).is_ok(),
            valid
        );
    }
}
