use std::slice::Iter;

use chrono::Duration;
use liftlog_domain::{self as domain, Property, WeightUnit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub trait SettingsService {
    fn get_settings(&self) -> Result<Settings, String>;
    fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

pub trait SettingsRepository {
    /// Read the stored settings, [`Settings::default`] if nothing has been stored yet.
    fn read_settings(&self) -> Result<Settings, String>;
    fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

/// Default rest duration in seconds.
pub const DEFAULT_REST_DURATION: f64 = 90.0;

/// User preferences.
///
/// Weights are always stored in pounds. The weight unit only affects how values are entered and
/// displayed, changing it never touches stored data.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    #[serde(
        serialize_with = "serialize_property",
        deserialize_with = "deserialize_property"
    )]
    pub weight_unit: WeightUnit,
    #[serde(deserialize_with = "deserialize_rest_duration")]
    pub default_rest_duration: f64,
    pub haptic_feedback_enabled: bool,
    pub sound_enabled: bool,
    #[serde(
        serialize_with = "serialize_property",
        deserialize_with = "deserialize_property"
    )]
    pub appearance_mode: Appearance,
}

impl Settings {
    #[must_use]
    pub fn rest_duration(&self) -> Duration {
        #[allow(clippy::cast_possible_truncation)]
        Duration::milliseconds((valid_rest_duration(self.default_rest_duration) * 1000.0) as i64)
    }

    #[must_use]
    pub fn convert_to_lbs(&self, value: f64) -> f64 {
        domain::convert_to_lbs(value, self.weight_unit)
    }

    #[must_use]
    pub fn convert_from_lbs(&self, lbs: f64) -> f64 {
        domain::convert_from_lbs(lbs, self.weight_unit)
    }

    #[must_use]
    pub fn format_weight(&self, lbs: f64) -> String {
        domain::format_weight(lbs, self.weight_unit)
    }

    #[must_use]
    pub fn format_weight_with_unit(&self, lbs: f64) -> String {
        domain::format_weight_with_unit(lbs, self.weight_unit)
    }

    #[must_use]
    pub fn format_volume(&self, lbs: f64) -> String {
        domain::format_volume(lbs, self.weight_unit)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weight_unit: WeightUnit::Lbs,
            default_rest_duration: DEFAULT_REST_DURATION,
            haptic_feedback_enabled: true,
            sound_enabled: true,
            appearance_mode: Appearance::Light,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    #[default]
    Light,
    Dark,
    System,
}

impl Appearance {
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Appearance::Light => "Light",
            Appearance::Dark => "Dark",
            Appearance::System => "System",
        }
    }
}

impl Property for Appearance {
    fn iter() -> Iter<'static, Appearance> {
        static APPEARANCES: [Appearance; 3] =
            [Appearance::Light, Appearance::Dark, Appearance::System];
        APPEARANCES.iter()
    }

    fn name(self) -> &'static str {
        match self {
            Appearance::Light => "light",
            Appearance::Dark => "dark",
            Appearance::System => "system",
        }
    }
}

fn valid_rest_duration(seconds: f64) -> f64 {
    if seconds > 0.0 && seconds.is_finite() {
        seconds
    } else {
        DEFAULT_REST_DURATION
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_property<S: Serializer, P: Property>(
    property: &P,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(property.name())
}

fn deserialize_property<'de, D: Deserializer<'de>, P: Property + Default>(
    deserializer: D,
) -> Result<P, D::Error> {
    let name = String::deserialize(deserializer)?;
    Ok(P::from_name(&name).unwrap_or_default())
}

fn deserialize_rest_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(valid_rest_duration(f64::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();

        assert_eq!(settings.weight_unit, WeightUnit::Lbs);
        assert_eq!(settings.rest_duration(), Duration::seconds(90));
        assert!(settings.haptic_feedback_enabled);
        assert!(settings.sound_enabled);
        assert_eq!(settings.appearance_mode, Appearance::Light);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings {
            weight_unit: WeightUnit::Kg,
            default_rest_duration: 120.0,
            haptic_feedback_enabled: false,
            sound_enabled: true,
            appearance_mode: Appearance::System,
        };
        let json = serde_json::to_string(&settings).unwrap();

        assert_eq!(
            json,
            r#"{"weightUnit":"kg","defaultRestDuration":120.0,"hapticFeedbackEnabled":false,"soundEnabled":true,"appearanceMode":"system"}"#
        );
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
    }

    #[rstest]
    #[case("{}", Settings::default())]
    #[case(
        r#"{"weightUnit":"stone","appearanceMode":"sepia"}"#,
        Settings::default()
    )]
    #[case(
        r#"{"weightUnit":"kg","soundEnabled":false}"#,
        Settings { weight_unit: WeightUnit::Kg, sound_enabled: false, ..Settings::default() }
    )]
    #[case(
        r#"{"appearanceMode":"dark","defaultRestDuration":45}"#,
        Settings { appearance_mode: Appearance::Dark, default_rest_duration: 45.0, ..Settings::default() }
    )]
    fn test_settings_deserialization(#[case] json: &str, #[case] expected: Settings) {
        assert_eq!(serde_json::from_str::<Settings>(json).unwrap(), expected);
    }

    #[rstest]
    #[case(0.0, 90)]
    #[case(-30.0, 90)]
    #[case(60.0, 60)]
    #[case(150.0, 150)]
    fn test_settings_rest_duration(#[case] stored: f64, #[case] expected: i64) {
        let json = format!(r#"{{"defaultRestDuration":{stored}}}"#);
        let settings = serde_json::from_str::<Settings>(&json).unwrap();

        assert_eq!(settings.rest_duration(), Duration::seconds(expected));
        assert_eq!(
            Settings {
                default_rest_duration: stored,
                ..Settings::default()
            }
            .rest_duration(),
            Duration::seconds(expected)
        );
    }

    #[test]
    fn test_settings_formatting() {
        let kg = Settings {
            weight_unit: WeightUnit::Kg,
            ..Settings::default()
        };
        let lbs = Settings::default();

        assert_approx_eq!(kg.convert_to_lbs(100.0), 220.462);
        assert_approx_eq!(kg.convert_from_lbs(220.462), 100.0, 1e-4);
        assert_approx_eq!(lbs.convert_to_lbs(135.0), 135.0);
        assert_eq!(kg.format_weight(100.0), "45.4");
        assert_eq!(lbs.format_weight(135.0), "135");
        assert_eq!(kg.format_weight_with_unit(220.462), "100.0 kg");
        assert_eq!(lbs.format_weight_with_unit(137.5), "137.5 lbs");
        assert_eq!(lbs.format_volume(12_345.0), "12.3k lbs");
    }

    #[test]
    fn test_appearance() {
        assert_eq!(Appearance::from_name("system"), Some(Appearance::System));
        assert_eq!(Appearance::from_name("System"), None);
        assert_eq!(Appearance::Dark.display_name(), "Dark");
    }
}
