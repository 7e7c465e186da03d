use std::slice::Iter;

use chrono::Duration;

use crate::Property;

/// Unit used to display weights. Stored weights are always in pounds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    #[must_use]
    pub fn to_lbs_factor(self) -> f64 {
        match self {
            WeightUnit::Lbs => 1.0,
            WeightUnit::Kg => 2.204_62,
        }
    }

    #[must_use]
    pub fn from_lbs_factor(self) -> f64 {
        match self {
            WeightUnit::Lbs => 1.0,
            WeightUnit::Kg => 0.453_592,
        }
    }

    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            WeightUnit::Lbs => "lbs",
            WeightUnit::Kg => "kg",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            WeightUnit::Lbs => "Pounds (lbs)",
            WeightUnit::Kg => "Kilograms (kg)",
        }
    }
}

impl Property for WeightUnit {
    fn iter() -> Iter<'static, WeightUnit> {
        static UNITS: [WeightUnit; 2] = [WeightUnit::Lbs, WeightUnit::Kg];
        UNITS.iter()
    }

    fn name(self) -> &'static str {
        self.abbreviation()
    }
}

#[must_use]
pub fn convert_to_lbs(value: f64, unit: WeightUnit) -> f64 {
    value * unit.to_lbs_factor()
}

#[must_use]
pub fn convert_from_lbs(lbs: f64, unit: WeightUnit) -> f64 {
    lbs * unit.from_lbs_factor()
}

/// Render a number without decimals if it is integral, with one decimal otherwise.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    if value == value.floor() {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

#[must_use]
pub fn format_weight(lbs: f64, unit: WeightUnit) -> String {
    format_decimal(convert_from_lbs(lbs, unit))
}

#[must_use]
pub fn format_weight_with_unit(lbs: f64, unit: WeightUnit) -> String {
    format!("{} {}", format_weight(lbs, unit), unit.abbreviation())
}

/// Abbreviated volume, e.g. "12.3k lbs" or "850 kg".
#[must_use]
pub fn format_volume(lbs: f64, unit: WeightUnit) -> String {
    let volume = convert_from_lbs(lbs, unit);
    if volume >= 1000.0 {
        format!("{:.1}k {}", volume / 1000.0, unit.abbreviation())
    } else {
        format!("{volume:.0} {}", unit.abbreviation())
    }
}

/// Duration of a workout, "In Progress" if the workout is not finished.
#[must_use]
pub fn format_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return "In Progress".to_string();
    };
    let seconds = duration.num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes} min")
    }
}

/// Running time of a workout in progress, e.g. "1:02:03" or "02:03".
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let seconds = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Remaining rest time, e.g. "1:30" or "0:45".
#[must_use]
pub fn format_rest(remaining: Duration) -> String {
    let seconds = remaining.num_seconds().max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
