use std::fmt;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc, Weekday};

use crate::{
    ExerciseID, Graph, ReadError, Reps, Weight, Workout, WorkoutExerciseID, WorkoutID,
    format_decimal,
};

/// Maximum number of weeks considered for a streak.
pub const MAX_STREAK_WEEKS: u32 = 52;

pub trait HistoryService {
    /// All persisted entities as a graph.
    fn get_graph(&self) -> Result<Graph, ReadError>;

    fn get_previous_sets(
        &self,
        exercise_id: ExerciseID,
        excluding: Option<WorkoutID>,
    ) -> Result<Vec<PreviousSet>, ReadError> {
        Ok(previous_sets(&self.get_graph()?, exercise_id, excluding))
    }

    fn get_last_performed(&self, exercise_id: ExerciseID) -> Result<Option<DateTime<Utc>>, ReadError> {
        Ok(last_performed(&self.get_graph()?, exercise_id))
    }

    fn get_progression(&self, exercise_id: ExerciseID) -> Result<Vec<ProgressionPoint>, ReadError> {
        Ok(progression(&self.get_graph()?, exercise_id))
    }

    fn get_personal_best(&self, exercise_id: ExerciseID) -> Result<Option<Weight>, ReadError> {
        Ok(personal_best(&self.get_graph()?, exercise_id))
    }

    fn get_weekly_summary<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        first_weekday: Weekday,
    ) -> Result<WeeklySummary, ReadError> {
        Ok(WeeklySummary::new(&self.get_graph()?, now, first_weekday))
    }
}

/// A set of the most recent previous performance of an exercise.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousSet {
    pub weight: Weight,
    pub reps: Reps,
    pub completed_at: Option<DateTime<Utc>>,
}

impl fmt::Display for PreviousSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} × {}",
            format_decimal(f64::from(self.weight)),
            self.reps
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionPoint {
    pub date: DateTime<Utc>,
    pub max_weight: Weight,
    pub total_sets: usize,
    pub total_reps: u32,
}

/// Completed workouts containing the exercise, paired with the respective workout exercise.
fn completed_history(
    graph: &Graph,
    exercise_id: ExerciseID,
) -> impl Iterator<Item = (WorkoutExerciseID, &Workout)> {
    graph
        .workout_exercises_of(exercise_id)
        .into_iter()
        .filter_map(move |we| graph.workout(we.workout_id).map(|w| (we.id, w)))
        .filter(|(_, w)| w.completed)
}

/// Sets of the most recently completed workout containing the exercise, in stored order.
///
/// The sets are returned regardless of their individual completion state.
#[must_use]
pub fn previous_sets(
    graph: &Graph,
    exercise_id: ExerciseID,
    excluding: Option<WorkoutID>,
) -> Vec<PreviousSet> {
    let Some((workout_exercise_id, _)) = completed_history(graph, exercise_id)
        .filter(|(_, w)| excluding != Some(w.id))
        .max_by_key(|(we, w)| (w.date(), *we))
    else {
        return vec![];
    };

    graph
        .sets(workout_exercise_id)
        .into_iter()
        .map(|s| PreviousSet {
            weight: s.weight,
            reps: s.reps,
            completed_at: s.completed_at,
        })
        .collect()
}

/// Completion time of the most recent completed workout containing the exercise.
#[must_use]
pub fn last_performed(graph: &Graph, exercise_id: ExerciseID) -> Option<DateTime<Utc>> {
    completed_history(graph, exercise_id)
        .filter_map(|(_, w)| w.completed_at)
        .max()
}

/// One point per completed workout exercise with at least one completed set above zero weight,
/// oldest first.
#[must_use]
pub fn progression(graph: &Graph, exercise_id: ExerciseID) -> Vec<ProgressionPoint> {
    let mut points = completed_history(graph, exercise_id)
        .filter_map(|(workout_exercise_id, workout)| {
            let sets = graph
                .sets(workout_exercise_id)
                .into_iter()
                .filter(|s| s.completed && !s.weight.is_zero())
                .collect::<Vec<_>>();
            let max_weight = sets
                .iter()
                .map(|s| s.weight)
                .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))?;
            Some(ProgressionPoint {
                date: workout.date(),
                max_weight,
                total_sets: sets.len(),
                total_reps: sets.iter().map(|s| u32::from(s.reps)).sum(),
            })
        })
        .collect::<Vec<_>>();
    points.sort_by_key(|p| p.date);
    points
}

#[must_use]
pub fn personal_best(graph: &Graph, exercise_id: ExerciseID) -> Option<Weight> {
    progression(graph, exercise_id)
        .into_iter()
        .map(|p| p.max_weight)
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

/// Sum of weight times reps over all sets, completed or not.
#[must_use]
pub fn workout_exercise_volume(graph: &Graph, workout_exercise_id: WorkoutExerciseID) -> f64 {
    graph
        .sets(workout_exercise_id)
        .iter()
        .map(|s| s.volume())
        .sum()
}

/// Sum of the volumes of all workout exercises of a workout, including incomplete sets.
#[must_use]
pub fn workout_volume(graph: &Graph, workout_id: WorkoutID) -> f64 {
    graph
        .workout_exercises(workout_id)
        .iter()
        .map(|we| workout_exercise_volume(graph, we.id))
        .sum()
}

/// First day of the week containing `now`, in the time zone of `now`.
#[must_use]
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>, first_weekday: Weekday) -> NaiveDate {
    now.date_naive().week(first_weekday).first_day()
}

fn local_date<Tz: TimeZone>(time: DateTime<Utc>, now: &DateTime<Tz>) -> NaiveDate {
    time.with_timezone(&now.timezone()).date_naive()
}

fn completed_this_week<'a, Tz: TimeZone>(
    graph: &'a Graph,
    now: &'a DateTime<Tz>,
    first_weekday: Weekday,
) -> impl Iterator<Item = &'a Workout> {
    let start = week_start(now, first_weekday);
    let fallback = now.with_timezone(&Utc);
    graph
        .workouts()
        .filter(|w| w.completed)
        .filter(move |w| local_date(w.completed_at.unwrap_or(fallback), now) >= start)
}

/// Number of completed workouts since the start of the current week.
///
/// A completed workout without completion time counts as completed now.
#[must_use]
pub fn workouts_this_week<Tz: TimeZone>(
    graph: &Graph,
    now: &DateTime<Tz>,
    first_weekday: Weekday,
) -> usize {
    completed_this_week(graph, now, first_weekday).count()
}

#[must_use]
pub fn volume_this_week<Tz: TimeZone>(
    graph: &Graph,
    now: &DateTime<Tz>,
    first_weekday: Weekday,
) -> f64 {
    completed_this_week(graph, now, first_weekday)
        .map(|w| workout_volume(graph, w.id))
        .sum()
}

/// Number of consecutive weeks with a completed workout, starting at the current week.
///
/// The first week without a completed workout ends the streak, even if it is the current week.
#[must_use]
pub fn current_streak<Tz: TimeZone>(
    graph: &Graph,
    now: &DateTime<Tz>,
    first_weekday: Weekday,
) -> u32 {
    let completion_dates = graph
        .workouts()
        .filter(|w| w.completed)
        .filter_map(|w| w.completed_at)
        .map(|c| local_date(c, now))
        .collect::<Vec<_>>();

    let mut start = week_start(now, first_weekday);
    let mut streak = 0;

    for _ in 0..MAX_STREAK_WEEKS {
        let end = start + Days::new(7);
        if !completion_dates.iter().any(|d| *d >= start && *d < end) {
            break;
        }
        streak += 1;
        match start.checked_sub_days(Days::new(7)) {
            Some(previous) => start = previous,
            None => break,
        }
    }

    streak
}

/// Training figures of the current week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklySummary {
    pub workouts: usize,
    pub volume: f64,
    pub streak: u32,
}

impl WeeklySummary {
    #[must_use]
    pub fn new<Tz: TimeZone>(graph: &Graph, now: &DateTime<Tz>, first_weekday: Weekday) -> Self {
        Self {
            workouts: workouts_this_week(graph, now, first_weekday),
            volume: volume_this_week(graph, now, first_weekday),
            streak: current_streak(graph, now, first_weekday),
        }
    }
}

/// Completed workouts, most recent first.
#[must_use]
pub fn completed_workouts(graph: &Graph) -> Vec<&Workout> {
    let mut workouts = graph.workouts().filter(|w| w.completed).collect::<Vec<_>>();
    workouts.sort_by(|a, b| b.date().cmp(&a.date()).then(b.id.cmp(&a.id)));
    workouts
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<'a> {
    pub year: i32,
    pub month: u32,
    pub workouts: Vec<&'a Workout>,
}

impl MonthGroup<'_> {
    /// Month name and year, e.g. "March 2024".
    #[must_use]
    pub fn title(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

/// Completed workouts grouped by calendar month in the time zone of `tz`, most recent first.
#[must_use]
pub fn history_by_month<'a, Tz: TimeZone>(graph: &'a Graph, tz: &Tz) -> Vec<MonthGroup<'a>> {
    let mut groups: Vec<MonthGroup<'a>> = vec![];
    for workout in completed_workouts(graph) {
        let date = workout.date().with_timezone(tz).date_naive();
        match groups.last_mut() {
            Some(group) if group.year == date.year() && group.month == date.month() => {
                group.workouts.push(workout);
            }
            _ => groups.push(MonthGroup {
                year: date.year(),
                month: date.month(),
                workouts: vec![workout],
            }),
        }
    }
    groups
}
