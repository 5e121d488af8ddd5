//! Preference accumulator: maps one step's answer onto the preferences record.
//!
//! `apply` is pure: it reads only its arguments and returns a patch. The
//! session merges the patch; nothing here touches shared state.

use serde::{Deserialize, Serialize};

use super::catalog::step_ids;
use super::labels::headcount_for;
use super::HearingError;

/// Token the budget step uses for "ask the model to negotiate".
pub const CUSTOM_BUDGET_TOKEN: &str = "custom";
/// Duration token meaning "five days or more".
pub const LONG_TRIP_TOKEN: &str = "5+";
const LONG_TRIP_DAYS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BudgetRepr", into = "BudgetRepr")]
pub enum Budget {
    /// Upper bound in yen.
    Amount(u32),
    /// No amount given; the model should negotiate one.
    Custom,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BudgetRepr {
    Amount(u32),
    Token(String),
}

impl TryFrom<BudgetRepr> for Budget {
    type Error = String;

    fn try_from(repr: BudgetRepr) -> Result<Self, Self::Error> {
        match repr {
            BudgetRepr::Amount(n) => Ok(Budget::Amount(n)),
            BudgetRepr::Token(t) if t == CUSTOM_BUDGET_TOKEN => Ok(Budget::Custom),
            BudgetRepr::Token(t) => Err(format!("unrecognised budget token '{t}'")),
        }
    }
}

impl From<Budget> for BudgetRepr {
    fn from(budget: Budget) -> Self {
        match budget {
            Budget::Amount(n) => BudgetRepr::Amount(n),
            Budget::Custom => BudgetRepr::Token(CUSTOM_BUDGET_TOKEN.to_string()),
        }
    }
}

/// Accumulated answers for one hearing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    /// Days; 1 is a day trip, 5 is a floor for "5+".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    /// Derived from `group_type`; a policy default, not a measured count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_location: Option<String>,
}

/// The update produced by one answered step.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferencePatch {
    /// The step records nothing (welcome, confirmation).
    Nothing,
    Budget(Budget),
    Group {
        group_type: String,
        group_size: Option<u32>,
    },
    Duration(u32),
    Transportation(String),
    Interests(Vec<String>),
    DepartureLocation(String),
}

impl Preferences {
    /// Merges a patch. The latest answer for a field replaces any earlier one.
    pub fn merge(&mut self, patch: PreferencePatch) {
        match patch {
            PreferencePatch::Nothing => {}
            PreferencePatch::Budget(budget) => self.budget = Some(budget),
            PreferencePatch::Group {
                group_type,
                group_size,
            } => {
                self.group_type = Some(group_type);
                self.group_size = group_size;
            }
            PreferencePatch::Duration(days) => self.duration = Some(days),
            PreferencePatch::Transportation(t) => self.transportation = Some(t),
            PreferencePatch::Interests(interests) => self.interests = interests,
            PreferencePatch::DepartureLocation(place) => self.departure_location = Some(place),
        }
    }
}

/// Maps a step's selected values to a preferences patch.
///
/// The interests step takes every value as a set (duplicates collapse, first
/// occurrence keeps its position). Every other step takes exactly one value,
/// the first element.
pub fn apply(step_id: &str, selected: &[String]) -> Result<PreferencePatch, HearingError> {
    if step_id == step_ids::INTERESTS {
        let mut interests: Vec<String> = Vec::with_capacity(selected.len());
        for value in selected {
            if !interests.contains(value) {
                interests.push(value.clone());
            }
        }
        return Ok(PreferencePatch::Interests(interests));
    }

    let records_answer = matches!(
        step_id,
        step_ids::BUDGET
            | step_ids::GROUP_SIZE
            | step_ids::DURATION
            | step_ids::TRANSPORTATION
            | step_ids::DEPARTURE_LOCATION
    );
    if !records_answer {
        return Ok(PreferencePatch::Nothing);
    }

    let value = selected
        .first()
        .ok_or_else(|| HearingError::MissingAnswer(step_id.to_string()))?;

    let patch = match step_id {
        step_ids::BUDGET if value == CUSTOM_BUDGET_TOKEN => PreferencePatch::Budget(Budget::Custom),
        step_ids::BUDGET => {
            PreferencePatch::Budget(Budget::Amount(parse_number(step_id, value)?))
        }
        step_ids::GROUP_SIZE => PreferencePatch::Group {
            group_type: value.clone(),
            group_size: headcount_for(value),
        },
        step_ids::DURATION if value == LONG_TRIP_TOKEN => {
            PreferencePatch::Duration(LONG_TRIP_DAYS)
        }
        step_ids::DURATION => match parse_number(step_id, value)? {
            0 => return Err(invalid(step_id, value)),
            days => PreferencePatch::Duration(days),
        },
        step_ids::TRANSPORTATION => PreferencePatch::Transportation(value.clone()),
        _ => PreferencePatch::DepartureLocation(value.clone()),
    };
    Ok(patch)
}

/// Toggles `value` in a multi-select answer: removes it if present, appends otherwise.
pub fn toggle_value(current: &[String], value: &str) -> Vec<String> {
    if current.iter().any(|v| v == value) {
        current.iter().filter(|v| *v != value).cloned().collect()
    } else {
        let mut next = current.to_vec();
        next.push(value.to_string());
        next
    }
}

/// Whether a step counts as answered for the given preferences.
/// Optional and non-question steps always count.
pub fn is_step_answered(step_id: &str, preferences: &Preferences) -> bool {
    match step_id {
        step_ids::WELCOME
        | step_ids::INTERESTS
        | step_ids::DEPARTURE_LOCATION
        | step_ids::CONFIRMATION => true,
        step_ids::BUDGET => preferences.budget.is_some(),
        step_ids::GROUP_SIZE => {
            preferences.group_size.is_some() || preferences.group_type.is_some()
        }
        step_ids::DURATION => preferences.duration.is_some(),
        step_ids::TRANSPORTATION => preferences.transportation.is_some(),
        _ => false,
    }
}

fn parse_number(step_id: &str, value: &str) -> Result<u32, HearingError> {
    value.trim().parse::<u32>().map_err(|_| invalid(step_id, value))
}

fn invalid(step_id: &str, value: &str) -> HearingError {
    HearingError::InvalidValue {
        step: step_id.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_long_duration_maps_to_floor() {
        assert_eq!(
            apply(step_ids::DURATION, &values(&["5+"])).unwrap(),
            PreferencePatch::Duration(5)
        );
        assert_eq!(
            apply(step_ids::DURATION, &values(&["1"])).unwrap(),
            PreferencePatch::Duration(1)
        );
    }

    #[test]
    fn test_group_size_derives_headcount() {
        let patch = apply(step_ids::GROUP_SIZE, &values(&["family"])).unwrap();
        let mut prefs = Preferences::default();
        prefs.merge(patch);
        assert_eq!(prefs.group_type.as_deref(), Some("family"));
        assert_eq!(prefs.group_size, Some(4));
    }

    #[test]
    fn test_unknown_group_type_has_no_headcount() {
        let patch = apply(step_ids::GROUP_SIZE, &values(&["band"])).unwrap();
        assert_eq!(
            patch,
            PreferencePatch::Group {
                group_type: "band".to_string(),
                group_size: None
            }
        );
    }

    #[test]
    fn test_custom_budget_is_sentinel() {
        assert_eq!(
            apply(step_ids::BUDGET, &values(&["custom"])).unwrap(),
            PreferencePatch::Budget(Budget::Custom)
        );
        assert_eq!(
            apply(step_ids::BUDGET, &values(&["20000"])).unwrap(),
            PreferencePatch::Budget(Budget::Amount(20000))
        );
    }

    #[test]
    fn test_first_value_is_authoritative_for_single_steps() {
        assert_eq!(
            apply(step_ids::TRANSPORTATION, &values(&["train", "car"])).unwrap(),
            PreferencePatch::Transportation("train".to_string())
        );
    }

    #[test]
    fn test_later_answer_replaces_earlier() {
        let mut prefs = Preferences::default();
        prefs.merge(apply(step_ids::BUDGET, &values(&["5000"])).unwrap());
        prefs.merge(apply(step_ids::BUDGET, &values(&["custom"])).unwrap());
        assert_eq!(prefs.budget, Some(Budget::Custom));
    }

    #[test]
    fn test_interests_collapse_duplicates() {
        assert_eq!(
            apply(step_ids::INTERESTS, &values(&["onsen", "gourmet", "onsen"])).unwrap(),
            PreferencePatch::Interests(values(&["onsen", "gourmet"]))
        );
        assert_eq!(
            apply(step_ids::INTERESTS, &[]).unwrap(),
            PreferencePatch::Interests(Vec::new())
        );
    }

    #[test]
    fn test_apply_is_deterministic() {
        let input = values(&["large_group"]);
        assert_eq!(
            apply(step_ids::GROUP_SIZE, &input).unwrap(),
            apply(step_ids::GROUP_SIZE, &input).unwrap()
        );
    }

    #[test]
    fn test_non_recording_steps_yield_nothing() {
        assert_eq!(
            apply(step_ids::WELCOME, &values(&["new_plan"])).unwrap(),
            PreferencePatch::Nothing
        );
        assert_eq!(apply(step_ids::CONFIRMATION, &[]).unwrap(), PreferencePatch::Nothing);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(matches!(
            apply(step_ids::BUDGET, &values(&["lots"])),
            Err(HearingError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply(step_ids::DURATION, &values(&["0"])),
            Err(HearingError::InvalidValue { .. })
        ));
        assert!(matches!(
            apply(step_ids::TRANSPORTATION, &[]),
            Err(HearingError::MissingAnswer(_))
        ));
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let start = values(&["gourmet"]);
        let once = toggle_value(&start, "onsen");
        assert_eq!(once, values(&["gourmet", "onsen"]));
        let twice = toggle_value(&once, "onsen");
        assert_eq!(twice, start);
    }

    #[test]
    fn test_is_step_answered() {
        let mut prefs = Preferences::default();
        assert!(!is_step_answered(step_ids::BUDGET, &prefs));
        assert!(is_step_answered(step_ids::INTERESTS, &prefs));
        assert!(is_step_answered(step_ids::WELCOME, &prefs));
        prefs.budget = Some(Budget::Amount(10000));
        assert!(is_step_answered(step_ids::BUDGET, &prefs));
        assert!(!is_step_answered(step_ids::RESULT, &prefs));
    }

    #[test]
    fn test_budget_serde_shapes() {
        assert_eq!(serde_json::to_string(&Budget::Amount(30000)).unwrap(), "30000");
        assert_eq!(serde_json::to_string(&Budget::Custom).unwrap(), "\"custom\"");
        let parsed: Budget = serde_json::from_str("\"custom\"").unwrap();
        assert_eq!(parsed, Budget::Custom);
        assert!(serde_json::from_str::<Budget>("\"plenty\"").is_err());
    }

    #[test]
    fn test_preferences_serialize_only_present_fields() {
        let prefs = Preferences {
            duration: Some(2),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&prefs).unwrap(), serde_json::json!({"duration": 2}));
    }
}
