//! Prompt compiler and confirmation summary for accumulated preferences.

use serde::Serialize;

use super::labels::{label_for, GROUP_TYPE_LABELS, INTEREST_LABELS, TRANSPORTATION_LABELS};
use super::preferences::{Budget, Preferences};

pub const LEAD_IN: &str = "以下の条件に合う旅行プランを提案してください。";
/// Rendered in place of an amount when the user chose the custom budget.
pub const BUDGET_NEGOTIATE: &str = "未定のため、相談しながら最適な金額を提案してください";
const INTEREST_DELIMITER: &str = "、";
const SUMMARY_CUSTOM_BUDGET: &str = "その他";

/// Renders preferences into the instruction block sent to the chat transport.
///
/// Line order is fixed; a field left unset contributes no line.
pub fn compile(preferences: &Preferences) -> String {
    let mut lines = vec![LEAD_IN.to_string()];

    if let Some(budget) = preferences.budget {
        let text = match budget {
            Budget::Amount(yen) => format!("{yen}円"),
            Budget::Custom => BUDGET_NEGOTIATE.to_string(),
        };
        lines.push(format!("- 予算: {text}"));
    }

    if let Some(days) = preferences.duration {
        lines.push(format!("- 期間: {}", duration_text(days)));
    }

    if let Some(size) = preferences.group_size {
        lines.push(format!("- 人数: {size}人"));
    } else if let Some(group_type) = preferences.group_type.as_deref() {
        lines.push(format!("- 人数: {}", label_for(GROUP_TYPE_LABELS, group_type)));
    }

    if let Some(transport) = preferences.transportation.as_deref() {
        lines.push(format!(
            "- 交通手段: {}",
            label_for(TRANSPORTATION_LABELS, transport)
        ));
    }

    if !preferences.interests.is_empty() {
        lines.push(format!("- 興味: {}", interest_labels(&preferences.interests)));
    }

    if let Some(place) = preferences.departure_location.as_deref() {
        lines.push(format!("- 出発地: {place}"));
    }

    lines.join("\n")
}

/// One labelled row of the confirmation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub label: &'static str,
    pub value: String,
}

/// Rows shown on the confirmation step, present fields only.
pub fn summary(preferences: &Preferences) -> Vec<SummaryLine> {
    let mut rows = Vec::new();
    let mut push = |label: &'static str, value: String| rows.push(SummaryLine { label, value });

    if let Some(budget) = preferences.budget {
        push(
            "予算",
            match budget {
                Budget::Amount(yen) => format!("{yen}円"),
                Budget::Custom => SUMMARY_CUSTOM_BUDGET.to_string(),
            },
        );
    }
    if let Some(group_type) = preferences.group_type.as_deref() {
        push("人数", label_for(GROUP_TYPE_LABELS, group_type).to_string());
    }
    if let Some(days) = preferences.duration {
        push("期間", duration_text(days));
    }
    if let Some(transport) = preferences.transportation.as_deref() {
        push(
            "交通手段",
            label_for(TRANSPORTATION_LABELS, transport).to_string(),
        );
    }
    if !preferences.interests.is_empty() {
        push("興味", interest_labels(&preferences.interests));
    }
    if let Some(place) = preferences.departure_location.as_deref() {
        push("出発地", place.to_string());
    }

    rows
}

fn duration_text(days: u32) -> String {
    if days == 1 {
        "日帰り".to_string()
    } else {
        format!("{days}日間")
    }
}

fn interest_labels(interests: &[String]) -> String {
    interests
        .iter()
        .map(|i| label_for(INTEREST_LABELS, i))
        .collect::<Vec<_>>()
        .join(INTEREST_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Preferences {
        Preferences {
            budget: Some(Budget::Amount(30000)),
            duration: Some(3),
            group_type: Some("couple".to_string()),
            group_size: Some(2),
            transportation: Some("train".to_string()),
            interests: vec!["onsen".to_string(), "gourmet".to_string()],
            departure_location: Some("東京".to_string()),
        }
    }

    #[test]
    fn test_empty_preferences_compile_to_lead_in_only() {
        assert_eq!(compile(&Preferences::default()), LEAD_IN);
    }

    #[test]
    fn test_full_preferences_in_fixed_order() {
        let expected = [
            LEAD_IN,
            "- 予算: 30000円",
            "- 期間: 3日間",
            "- 人数: 2人",
            "- 交通手段: 電車・新幹線",
            "- 興味: 温泉・リラクゼーション、グルメ・食べ歩き",
            "- 出発地: 東京",
        ]
        .join("\n");
        assert_eq!(compile(&full()), expected);
    }

    #[test]
    fn test_custom_budget_negotiates_without_amount() {
        let prefs = Preferences {
            budget: Some(Budget::Custom),
            ..Default::default()
        };
        let text = compile(&prefs);
        assert!(text.contains(BUDGET_NEGOTIATE));
        assert!(!text.chars().any(|c| c.is_ascii_digit()));
        assert!(!text.contains('円'));
    }

    #[test]
    fn test_day_trip_wording() {
        let prefs = Preferences {
            duration: Some(1),
            ..Default::default()
        };
        assert!(compile(&prefs).ends_with("- 期間: 日帰り"));
    }

    #[test]
    fn test_unknown_tokens_pass_through() {
        let prefs = Preferences {
            transportation: Some("ferry".to_string()),
            interests: vec!["karaoke".to_string(), "onsen".to_string()],
            group_type: Some("band".to_string()),
            ..Default::default()
        };
        let text = compile(&prefs);
        assert!(text.contains("- 交通手段: ferry"));
        assert!(text.contains("- 興味: karaoke、温泉・リラクゼーション"));
        assert!(text.contains("- 人数: band"));
    }

    #[test]
    fn test_empty_interests_omitted() {
        let prefs = Preferences {
            departure_location: Some("大阪".to_string()),
            ..Default::default()
        };
        let text = compile(&prefs);
        assert!(!text.contains("興味"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_summary_rows() {
        let rows = summary(&full());
        let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["予算", "人数", "期間", "交通手段", "興味", "出発地"]);
        assert_eq!(rows[1].value, "2人（カップル・夫婦）");

        let custom = Preferences {
            budget: Some(Budget::Custom),
            ..Default::default()
        };
        assert_eq!(summary(&custom)[0].value, "その他");
        assert!(summary(&Preferences::default()).is_empty());
    }
}
