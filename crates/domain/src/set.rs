use std::{fmt, ops::Mul};

use chrono::{DateTime, Utc};
use derive_more::{Display, Into};

use crate::{WorkoutExerciseID, entity_id};

/// Weight in pounds, the unit every weight is stored in.
#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub const ZERO: Weight = Weight(0.0);

    pub fn new(value: f64) -> Result<Self, WeightError> {
        if !value.is_finite() {
            return Err(WeightError::ParseError);
        }

        if value < 0.0 {
            return Err(WeightError::Negative);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f64>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

impl Mul<Reps> for Weight {
    type Output = f64;

    fn mul(self, rhs: Reps) -> Self::Output {
        self.0 * f64::from(rhs.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must not be negative")]
    Negative,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub const ZERO: Reps = Reps(0);

    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Rate of perceived exertion.
#[derive(Debug, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct RPE(u8);

impl RPE {
    pub fn new(value: u8) -> Result<Self, RPEError> {
        if !(1..=10).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<&str> for RPE {
    type Error = RPEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u8>() {
            Ok(parsed_value) => RPE::new(parsed_value),
            Err(_) => Err(RPEError::ParseError),
        }
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 1 to 10")]
    OutOfRange,
    #[error("RPE must be an integer")]
    ParseError,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum SetType {
    WarmUp,
    #[default]
    Working,
    Drop,
    Failure,
}

impl SetType {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            SetType::WarmUp => "Warm-up",
            SetType::Working => "Working",
            SetType::Drop => "Drop Set",
            SetType::Failure => "Failure",
        }
    }

    #[must_use]
    pub fn short_label(self) -> &'static str {
        match self {
            SetType::WarmUp => "W",
            SetType::Working => "",
            SetType::Drop => "D",
            SetType::Failure => "F",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        [
            SetType::WarmUp,
            SetType::Working,
            SetType::Drop,
            SetType::Failure,
        ]
        .into_iter()
        .find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSet {
    pub id: WorkoutSetID,
    pub workout_exercise_id: WorkoutExerciseID,
    pub order: u32,
    pub weight: Weight,
    pub reps: Reps,
    pub rpe: Option<RPE>,
    pub set_type: SetType,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_pr: bool,
}

impl WorkoutSet {
    /// An empty, not completed working set.
    #[must_use]
    pub fn new(id: WorkoutSetID, workout_exercise_id: WorkoutExerciseID, order: u32) -> Self {
        Self {
            id,
            workout_exercise_id,
            order,
            weight: Weight::ZERO,
            reps: Reps::ZERO,
            rpe: None,
            set_type: SetType::Working,
            completed: false,
            completed_at: None,
            is_pr: false,
        }
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        self.weight * self.reps
    }

    /// Estimated one-rep max based on the Brzycki formula.
    ///
    /// The formula is only applied for 2 to 12 reps. The raw weight is returned otherwise.
    #[must_use]
    pub fn estimated_one_rep_max(&self) -> f64 {
        let reps = u32::from(self.reps);
        let weight = f64::from(self.weight);
        if !(2..=12).contains(&reps) {
            return weight;
        }
        weight * (36.0 / (37.0 - f64::from(reps)))
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(now);
    }

    /// Toggle the completion state and report whether the set became completed.
    pub fn toggle_completed(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            self.completed = false;
            self.completed_at = None;
            false
        } else {
            self.complete(now);
            true
        }
    }
}

entity_id!(WorkoutSetID);

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn set(weight: f64, reps: u32) -> WorkoutSet {
        WorkoutSet {
            weight: Weight::new(weight).unwrap(),
            reps: Reps::new(reps).unwrap(),
            ..WorkoutSet::new(1.into(), 2.into(), 0)
        }
    }

    #[rstest]
    #[case(0.0, Ok(Weight(0.0)))]
    #[case(45.5, Ok(Weight(45.5)))]
    #[case(10_000.0, Ok(Weight(10_000.0)))]
    #[case(-1.0, Err(WeightError::Negative))]
    #[case(-0.5, Err(WeightError::Negative))]
    #[case(f64::INFINITY, Err(WeightError::ParseError))]
    #[case(f64::NAN, Err(WeightError::ParseError))]
    fn test_weight_new(#[case] value: f64, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::new(value), expected);
    }

    #[rstest]
    #[case("135", Ok(Weight(135.0)))]
    #[case(" 2.5 ", Ok(Weight(2.5)))]
    #[case("", Err(WeightError::ParseError))]
    #[case("heavy", Err(WeightError::ParseError))]
    fn test_weight_try_from_str(#[case] value: &str, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::try_from(value), expected);
    }

    #[rstest]
    #[case(0, Ok(Reps(0)))]
    #[case(999, Ok(Reps(999)))]
    #[case(1000, Err(RepsError::OutOfRange))]
    fn test_reps_new(#[case] value: u32, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::new(value), expected);
    }

    #[rstest]
    #[case("8", Ok(Reps(8)))]
    #[case("8.5", Err(RepsError::ParseError))]
    #[case("-1", Err(RepsError::ParseError))]
    fn test_reps_try_from_str(#[case] value: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(value), expected);
    }

    #[rstest]
    #[case(0, Err(RPEError::OutOfRange))]
    #[case(1, Ok(RPE(1)))]
    #[case(10, Ok(RPE(10)))]
    #[case(11, Err(RPEError::OutOfRange))]
    fn test_rpe_new(#[case] value: u8, #[case] expected: Result<RPE, RPEError>) {
        assert_eq!(RPE::new(value), expected);
    }

    #[test]
    fn test_rpe_display() {
        assert_eq!(RPE::new(8).unwrap().to_string(), "8");
        assert_eq!(RPE::try_from("x"), Err(RPEError::ParseError));
    }

    #[test]
    fn test_set_type() {
        assert_eq!(SetType::default(), SetType::Working);
        for set_type in [
            SetType::WarmUp,
            SetType::Working,
            SetType::Drop,
            SetType::Failure,
        ] {
            assert_eq!(SetType::from_name(set_type.name()), Some(set_type));
        }
        assert_eq!(SetType::WarmUp.short_label(), "W");
        assert_eq!(SetType::Working.short_label(), "");
        assert_eq!(SetType::from_name("Cluster"), None);
    }

    #[rstest]
    #[case(100.0, 5, 500.0)]
    #[case(0.0, 5, 0.0)]
    #[case(80.0, 0, 0.0)]
    #[case(22.5, 12, 270.0)]
    fn test_workout_set_volume(#[case] weight: f64, #[case] reps: u32, #[case] expected: f64) {
        assert_approx_eq!(set(weight, reps).volume(), expected);
    }

    #[rstest]
    #[case(100.0, 0, 100.0)]
    #[case(100.0, 1, 100.0)]
    #[case(100.0, 2, 102.857_142)]
    #[case(100.0, 10, 133.333_333)]
    #[case(100.0, 12, 144.0)]
    #[case(100.0, 13, 100.0)]
    #[case(100.0, 30, 100.0)]
    fn test_workout_set_estimated_one_rep_max(
        #[case] weight: f64,
        #[case] reps: u32,
        #[case] expected: f64,
    ) {
        assert_approx_eq!(set(weight, reps).estimated_one_rep_max(), expected, 1e-5);
    }

    #[test]
    fn test_workout_set_toggle_completed() {
        let now = Utc.with_ymd_and_hms(2024, 3, 4, 18, 30, 0).unwrap();
        let mut set = set(100.0, 5);

        assert!(set.toggle_completed(now));
        assert!(set.completed);
        assert_eq!(set.completed_at, Some(now));

        assert!(!set.toggle_completed(now));
        assert!(!set.completed);
        assert_eq!(set.completed_at, None);
    }
}
