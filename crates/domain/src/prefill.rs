//! Weight pre-fill
//!
//! Suggests starting weights for a new workout from the most recent completed workout that
//! contains the same exercise. Workouts performed with the same template are searched first,
//! followed by the whole history. Only a single historical workout is ever used as the source.
//! Every anomaly in the history results in empty suggestions instead of an error.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use log::debug;

use crate::{CompletedWorkout, ExerciseRef, Set, Weight, WorkoutTemplate};

/// Returns exactly `set_count` suggested weights for `exercise` of `template`.
///
/// `history` must already be restricted to the workouts of the current user.
#[must_use]
pub fn prefill_weights(
    history: &[CompletedWorkout],
    template: &WorkoutTemplate,
    exercise: &ExerciseRef,
    set_count: usize,
) -> Vec<Option<Weight>> {
    if history.is_empty() || set_count == 0 {
        return vec![None; set_count];
    }

    let mut workouts = history.iter().collect::<Vec<_>>();
    workouts.sort_by(|a, b| most_recent_first(a.end_time, b.end_time));

    let same_template = workouts.iter().copied().filter(|w| {
        !template.id.is_nil() && w.template_id.as_ref() == Some(&template.id)
    });

    let weights = recorded_weights(same_template, exercise).or_else(|| {
        debug!(
            "no workout of template {} contains {}, searching whole history",
            template.name, exercise.name
        );
        recorded_weights(workouts.iter().copied(), exercise)
    });

    match weights {
        Some(weights) => fit_to_set_count(weights, set_count),
        None => vec![None; set_count],
    }
}

/// Whether at least one suggested weight is a positive value.
#[must_use]
pub fn were_weights_prefilled(weights: &[Option<Weight>]) -> bool {
    weights.iter().flatten().any(Weight::is_positive)
}

fn most_recent_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn recorded_weights<'a>(
    workouts: impl Iterator<Item = &'a CompletedWorkout>,
    exercise: &ExerciseRef,
) -> Option<Vec<Option<Weight>>> {
    workouts
        .filter_map(|w| w.exercise(exercise))
        .find_map(|e| e.sets.as_deref().map(set_weights))
}

fn set_weights(sets: &[Set]) -> Vec<Option<Weight>> {
    if sets.iter().any(|s| s.completed) {
        sets.iter()
            .filter(|s| s.completed)
            .map(|s| s.weight)
            .collect()
    } else {
        sets.iter().map(|s| s.weight).collect()
    }
}

fn fit_to_set_count(mut weights: Vec<Option<Weight>>, set_count: usize) -> Vec<Option<Weight>> {
    let last = weights.last().copied().flatten();
    weights.resize(set_count, last);
    weights
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        Category, ExerciseID, Name, Reps, TemplateExercise, WorkoutExercise, WorkoutTemplateID,
    };

    use super::*;

    fn time(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 18, 0, 0).unwrap()
    }

    fn template(id: &str) -> WorkoutTemplate {
        WorkoutTemplate {
            id: id.into(),
            name: Name::new("Push").unwrap(),
            owner: None,
            global: true,
            exercises: vec![TemplateExercise {
                exercise: bench_press(),
                category: Category::Chest,
                sets: 4,
                reps: Reps::new(5).unwrap(),
            }],
        }
    }

    fn bench_press() -> ExerciseRef {
        ExerciseRef::new(Some("e1".into()), "Bench Press")
    }

    fn sets(values: &[(Option<f32>, bool)]) -> Vec<Set> {
        values
            .iter()
            .map(|(weight, completed)| Set {
                weight: weight.map(|w| Weight::new(w).unwrap()),
                reps: Some(Reps::new(5).unwrap()),
                completed: *completed,
            })
            .collect()
    }

    fn completed(values: &[f32]) -> Vec<Set> {
        sets(&values.iter().map(|w| (Some(*w), true)).collect::<Vec<_>>())
    }

    fn workout(
        id: &str,
        template_id: Option<&str>,
        end_time: Option<DateTime<Utc>>,
        exercise: ExerciseRef,
        sets: Option<Vec<Set>>,
    ) -> CompletedWorkout {
        CompletedWorkout {
            id: id.into(),
            user_id: "u1".into(),
            template_id: template_id.map(WorkoutTemplateID::from),
            template_name: String::from("Push"),
            start_time: end_time.map(|t| t - TimeDelta::hours(1)),
            end_time,
            exercises: vec![WorkoutExercise {
                exercise,
                category: Category::Chest,
                sets,
            }],
        }
    }

    fn weights(values: &[Option<f32>]) -> Vec<Option<Weight>> {
        values
            .iter()
            .map(|v| v.map(|w| Weight::new(w).unwrap()))
            .collect()
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    #[case(8)]
    fn test_prefill_weights_empty_history(#[case] set_count: usize) {
        assert_eq!(
            prefill_weights(&[], &template("t1"), &bench_press(), set_count),
            vec![None::<Weight>; set_count]
        );
    }

    #[test]
    fn test_prefill_weights_zero_sets() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            bench_press(),
            Some(completed(&[50.0])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 0),
            Vec::<Option<Weight>>::new()
        );
    }

    #[rstest]
    #[case(&[50.0, 50.0, 60.0], 4, &[Some(50.0), Some(50.0), Some(60.0), Some(60.0)])]
    #[case(&[50.0, 50.0, 60.0, 70.0], 2, &[Some(50.0), Some(50.0)])]
    #[case(&[50.0, 55.0], 2, &[Some(50.0), Some(55.0)])]
    #[case(&[0.0, 20.0], 3, &[Some(0.0), Some(20.0), Some(20.0)])]
    #[case(&[], 2, &[None, None])]
    fn test_prefill_weights_fits_set_count(
        #[case] recorded: &[f32],
        #[case] set_count: usize,
        #[case] expected: &[Option<f32>],
    ) {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            bench_press(),
            Some(completed(recorded)),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), set_count),
            weights(expected)
        );
    }

    #[test]
    fn test_prefill_weights_prefers_completed_sets() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            bench_press(),
            Some(sets(&[
                (Some(40.0), false),
                (Some(50.0), true),
                (Some(70.0), false),
                (Some(55.0), true),
            ])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 3),
            weights(&[Some(50.0), Some(55.0), Some(55.0)])
        );
    }

    #[test]
    fn test_prefill_weights_uses_all_sets_if_none_completed() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            bench_press(),
            Some(sets(&[(Some(40.0), false), (None, false), (Some(45.0), false)])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 4),
            weights(&[Some(40.0), None, Some(45.0), Some(45.0)])
        );
    }

    #[test]
    fn test_prefill_weights_pads_with_empty_if_last_weight_missing() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            bench_press(),
            Some(sets(&[(Some(40.0), true), (None, true)])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 3),
            weights(&[Some(40.0), None, None])
        );
    }

    #[test]
    fn test_prefill_weights_selects_most_recent_workout() {
        let history = [
            workout(
                "w1",
                Some("t1"),
                Some(time(1)),
                bench_press(),
                Some(completed(&[40.0, 40.0, 40.0])),
            ),
            workout(
                "w2",
                Some("t1"),
                Some(time(8)),
                bench_press(),
                Some(completed(&[60.0])),
            ),
            workout(
                "w3",
                Some("t1"),
                Some(time(4)),
                bench_press(),
                Some(completed(&[50.0, 50.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 3),
            weights(&[Some(60.0), Some(60.0), Some(60.0)])
        );
    }

    #[test]
    fn test_prefill_weights_sorts_missing_end_time_last() {
        let history = [
            workout(
                "w1",
                Some("t1"),
                None,
                bench_press(),
                Some(completed(&[90.0])),
            ),
            workout(
                "w2",
                Some("t1"),
                Some(time(1)),
                bench_press(),
                Some(completed(&[45.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 1),
            weights(&[Some(45.0)])
        );
        assert_eq!(
            prefill_weights(&history[..1], &template("t1"), &bench_press(), 1),
            weights(&[Some(90.0)])
        );
    }

    #[test]
    fn test_prefill_weights_prefers_same_template() {
        let history = [
            workout(
                "w1",
                Some("t2"),
                Some(time(9)),
                bench_press(),
                Some(completed(&[80.0])),
            ),
            workout(
                "w2",
                Some("t1"),
                Some(time(2)),
                bench_press(),
                Some(completed(&[60.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 2),
            weights(&[Some(60.0), Some(60.0)])
        );
    }

    #[test]
    fn test_prefill_weights_falls_back_to_other_templates() {
        let history = [
            workout(
                "w1",
                Some("t2"),
                Some(time(3)),
                ExerciseRef::new(None, "bench press"),
                Some(completed(&[70.0])),
            ),
            workout(
                "w2",
                None,
                Some(time(1)),
                bench_press(),
                Some(completed(&[65.0])),
            ),
            workout(
                "w3",
                Some("t1"),
                Some(time(5)),
                ExerciseRef::new(None, "Squat"),
                Some(completed(&[100.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 2),
            weights(&[Some(70.0), Some(70.0)])
        );
    }

    #[test]
    fn test_prefill_weights_no_matching_exercise() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            ExerciseRef::new(Some("e2".into()), "Squat"),
            Some(completed(&[100.0])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 3),
            weights(&[None, None, None])
        );
    }

    #[test]
    fn test_prefill_weights_matches_name_ignoring_case_and_whitespace() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            ExerciseRef::new(None, "  BENCH press "),
            Some(completed(&[62.5, 62.5])),
        )];
        assert_eq!(
            prefill_weights(
                &history,
                &template("t1"),
                &ExerciseRef::new(None, "Bench Press"),
                2
            ),
            weights(&[Some(62.5), Some(62.5)])
        );
    }

    #[test]
    fn test_prefill_weights_matches_id_despite_renamed_exercise() {
        let history = [workout(
            "w1",
            Some("t1"),
            Some(time(1)),
            ExerciseRef::new(Some(ExerciseID::from("e1")), "Barbell Bench"),
            Some(completed(&[75.0])),
        )];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 1),
            weights(&[Some(75.0)])
        );
    }

    #[test]
    fn test_prefill_weights_skips_workouts_without_sets() {
        let history = [
            workout("w1", Some("t1"), Some(time(9)), bench_press(), None),
            workout(
                "w2",
                Some("t1"),
                Some(time(2)),
                bench_press(),
                Some(completed(&[57.5])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 2),
            weights(&[Some(57.5), Some(57.5)])
        );
    }

    #[test]
    fn test_prefill_weights_ignores_weaker_match_if_matched_exercise_has_no_sets() {
        let mut latest = workout("w1", Some("t1"), Some(time(9)), bench_press(), None);
        latest.exercises.push(WorkoutExercise {
            exercise: ExerciseRef::new(Some("e9".into()), "Incline Bench Press"),
            category: Category::Chest,
            sets: Some(completed(&[30.0])),
        });
        let history = [
            latest,
            workout(
                "w2",
                Some("t1"),
                Some(time(2)),
                bench_press(),
                Some(completed(&[60.0, 60.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 2),
            weights(&[Some(60.0), Some(60.0)])
        );
    }

    #[test]
    fn test_prefill_weights_never_merges_workouts() {
        let history = [
            workout(
                "w1",
                Some("t1"),
                Some(time(9)),
                bench_press(),
                Some(completed(&[60.0])),
            ),
            workout(
                "w2",
                Some("t1"),
                Some(time(2)),
                bench_press(),
                Some(completed(&[40.0, 45.0, 50.0])),
            ),
        ];
        assert_eq!(
            prefill_weights(&history, &template("t1"), &bench_press(), 3),
            weights(&[Some(60.0), Some(60.0), Some(60.0)])
        );
    }

    #[test]
    fn test_prefill_weights_is_idempotent() {
        let history = [
            workout(
                "w1",
                Some("t1"),
                Some(time(3)),
                bench_press(),
                Some(completed(&[50.0, 52.5])),
            ),
            workout(
                "w2",
                Some("t2"),
                None,
                bench_press(),
                Some(completed(&[30.0])),
            ),
        ];
        let first = prefill_weights(&history, &template("t1"), &bench_press(), 5);
        let second = prefill_weights(&history, &template("t1"), &bench_press(), 5);
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[rstest]
    #[case(&[Some(50.0), Some(0.0), None], true)]
    #[case(&[None, Some(0.0), None], false)]
    #[case(&[], false)]
    #[case(&[None], false)]
    #[case(&[Some(0.5)], true)]
    fn test_were_weights_prefilled(#[case] values: &[Option<f32>], #[case] expected: bool) {
        assert_eq!(were_weights_prefilled(&weights(values)), expected);
    }
}
