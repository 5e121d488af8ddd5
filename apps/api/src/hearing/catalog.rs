//! Step catalog: the fixed directed graph of hearing steps.
//!
//! Built once at startup and validated before the server accepts traffic:
//! every branch target must exist, the graph must be acyclic, and only the
//! terminal `result` step may have no way forward.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

/// Well-known step ids of the travel hearing flow.
pub mod step_ids {
    pub const WELCOME: &str = "welcome";
    pub const BUDGET: &str = "budget";
    pub const GROUP_SIZE: &str = "group_size";
    pub const DURATION: &str = "duration";
    pub const TRANSPORTATION: &str = "transportation";
    pub const INTERESTS: &str = "interests";
    pub const DEPARTURE_LOCATION: &str = "departure_location";
    pub const CONFIRMATION: &str = "confirmation";
    pub const RESULT: &str = "result";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Question,
    Confirmation,
    Result,
}

/// How many options a question step accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// One answer; selecting it also advances.
    Single,
    /// Zero or more toggled answers; advances only on an explicit proceed.
    Multiple,
}

#[derive(Debug, Clone, Serialize)]
pub struct HearingOption {
    pub id: String,
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub id: String,
    pub kind: StepKind,
    pub prompt: String,
    pub options: Vec<HearingOption>,
    pub required: bool,
    pub selection: SelectionMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_next_id: Option<String>,
}

impl Step {
    fn new(id: &str, kind: StepKind, prompt: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            prompt: prompt.to_string(),
            options: Vec::new(),
            required: true,
            selection: SelectionMode::Single,
            default_next_id: None,
        }
    }

    pub fn question(id: &str, prompt: &str) -> Self {
        Self::new(id, StepKind::Question, prompt)
    }

    pub fn confirmation(id: &str, prompt: &str) -> Self {
        Self::new(id, StepKind::Confirmation, prompt)
    }

    pub fn result(id: &str, prompt: &str) -> Self {
        Self {
            required: false,
            ..Self::new(id, StepKind::Result, prompt)
        }
    }

    /// Adds an option that follows the step's default branch.
    pub fn option(self, id: &str, label: &str, value: &str) -> Self {
        self.push_option(id, label, value, None)
    }

    /// Adds an option with its own branch target.
    pub fn option_to(self, id: &str, label: &str, value: &str, next_id: &str) -> Self {
        self.push_option(id, label, value, Some(next_id))
    }

    fn push_option(mut self, id: &str, label: &str, value: &str, next_id: Option<&str>) -> Self {
        self.options.push(HearingOption {
            id: id.to_string(),
            label: label.to_string(),
            value: value.to_string(),
            next_id: next_id.map(str::to_string),
        });
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.selection = SelectionMode::Multiple;
        self
    }

    pub fn then(mut self, next_id: &str) -> Self {
        self.default_next_id = Some(next_id.to_string());
        self
    }

    pub fn find_option(&self, value: &str) -> Option<&HearingOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Resolves the branch target: the selected option's own target first,
    /// then the step default.
    pub fn next_for(&self, selected: Option<&str>) -> Option<&str> {
        selected
            .and_then(|value| self.find_option(value))
            .and_then(|o| o.next_id.as_deref())
            .or(self.default_next_id.as_deref())
    }

    fn targets(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .filter_map(|o| o.next_id.as_deref())
            .chain(self.default_next_id.as_deref())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate step id '{0}'")]
    DuplicateStep(String),

    #[error("Initial step '{0}' is not in the catalog")]
    MissingInitial(String),

    #[error("Step '{from}' branches to unknown step '{target}'")]
    DanglingTarget { from: String, target: String },

    #[error("Step '{0}' has no way forward")]
    DeadEnd(String),

    #[error("Result step '{0}' must not branch anywhere")]
    TerminalHasEdges(String),

    #[error("Step graph has a cycle through '{0}'")]
    Cycle(String),

    #[error("Catalog has no result step")]
    MissingTerminal,
}

/// Immutable map of step id to step definition, in display order.
#[derive(Debug)]
pub struct StepCatalog {
    steps: Vec<Step>,
    index: HashMap<String, usize>,
    initial: String,
}

impl StepCatalog {
    /// Builds and validates a catalog. `steps` order is the display order used
    /// for progress reporting.
    pub fn new(initial: &str, steps: Vec<Step>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            if index.insert(step.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateStep(step.id.clone()));
            }
        }

        let catalog = Self {
            steps,
            index,
            initial: initial.to_string(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The travel hearing flow.
    pub fn travel() -> Result<Self, CatalogError> {
        use step_ids::*;

        let steps = vec![
            Step::question(
                WELCOME,
                "こんにちは！あなたの理想の旅行プランを一緒に考えましょう。まず、どのような旅行をお考えですか？",
            )
            .option_to("new_plan", "新しい旅行を計画したい", "new_plan", BUDGET)
            .option_to("idea_search", "旅行先のアイデアを探している", "idea_search", BUDGET)
            .then(BUDGET),
            Step::question(BUDGET, "今回の旅行のご予算はどのくらいでしょうか？")
                .option("budget_5k", "5千円以内（日帰り）", "5000")
                .option("budget_10k", "1万円以内", "10000")
                .option("budget_20k", "2万円以内", "20000")
                .option("budget_30k", "3万円以内", "30000")
                .option("budget_custom", "その他（後で詳しく）", "custom")
                .then(GROUP_SIZE),
            Step::question(GROUP_SIZE, "何名での旅行でしょうか？")
                .option("solo", "1人（一人旅）", "solo")
                .option("couple", "2人（カップル・夫婦）", "couple")
                .option("family", "3-4人（家族）", "family")
                .option("friends", "3-6人（友人グループ）", "friends")
                .option("large_group", "7人以上", "large_group")
                .then(DURATION),
            Step::question(DURATION, "何日間の旅行をお考えですか？")
                .option("day_trip", "日帰り", "1")
                .option("one_night", "1泊2日", "2")
                .option("two_nights", "2泊3日", "3")
                .option("three_nights", "3泊4日", "4")
                .option("longer", "4泊以上", "5+")
                .then(TRANSPORTATION),
            Step::question(TRANSPORTATION, "希望の交通手段はありますか？")
                .option("train", "電車・新幹線", "train")
                .option("car", "車（レンタカー・マイカー）", "car")
                .option("bus", "高速バス", "bus")
                .option("plane", "飛行機", "plane")
                .option("mixed", "組み合わせ", "mixed")
                .option("any_transport", "お任せ", "any")
                .then(INTERESTS),
            Step::question(INTERESTS, "旅行で特に楽しみたいことはありますか？（複数選択可）")
                .option("sightseeing", "観光・名所巡り", "sightseeing")
                .option("gourmet", "グルメ・食べ歩き", "gourmet")
                .option("onsen", "温泉・リラクゼーション", "onsen")
                .option("nature", "自然・アウトドア", "nature")
                .option("culture", "歴史・文化体験", "culture")
                .option("shopping", "ショッピング", "shopping")
                .option("nightlife", "夜景・ナイトライフ", "nightlife")
                .option("photography", "写真・インスタ映え", "photography")
                .multiple()
                .optional()
                .then(DEPARTURE_LOCATION),
            Step::question(DEPARTURE_LOCATION, "出発地はどちらからでしょうか？")
                .option("tokyo", "東京都心", "東京")
                .option("osaka", "大阪市内", "大阪")
                .option("nagoya", "名古屋市内", "名古屋")
                .option("fukuoka", "福岡市内", "福岡")
                .option("other", "その他", "other")
                .optional()
                .then(CONFIRMATION),
            Step::confirmation(
                CONFIRMATION,
                "ヒアリング内容を確認します。これらの情報をもとに、あなたにぴったりの旅行プランをご提案いたします。",
            )
            .then(RESULT),
            Step::result(RESULT, "プランを生成中です..."),
        ];

        Self::new(WELCOME, steps)
    }

    pub fn get(&self, id: &str) -> Option<&Step> {
        self.index.get(id).map(|&i| &self.steps[i])
    }

    pub fn initial_step_id(&self) -> &str {
        &self.initial
    }

    /// Zero-based display position of a step.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Steps a user walks through, excluding the terminal result step.
    pub fn total_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.kind != StepKind::Result)
            .count()
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if !self.index.contains_key(&self.initial) {
            return Err(CatalogError::MissingInitial(self.initial.clone()));
        }
        if !self.steps.iter().any(|s| s.kind == StepKind::Result) {
            return Err(CatalogError::MissingTerminal);
        }

        for step in &self.steps {
            for target in step.targets() {
                if !self.index.contains_key(target) {
                    return Err(CatalogError::DanglingTarget {
                        from: step.id.clone(),
                        target: target.to_string(),
                    });
                }
            }

            let has_edges = step.targets().next().is_some();
            match step.kind {
                StepKind::Result if has_edges => {
                    return Err(CatalogError::TerminalHasEdges(step.id.clone()));
                }
                StepKind::Result => {}
                _ => {
                    // Every option must lead somewhere, either on its own or via the default.
                    let stranded = step.default_next_id.is_none()
                        && (step.options.is_empty()
                            || step.options.iter().any(|o| o.next_id.is_none()));
                    if stranded {
                        return Err(CatalogError::DeadEnd(step.id.clone()));
                    }
                }
            }
        }

        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), CatalogError> {
        let mut done: HashSet<&str> = HashSet::new();
        let mut on_path: HashSet<&str> = HashSet::new();

        for step in &self.steps {
            self.visit(step, &mut on_path, &mut done)?;
        }
        Ok(())
    }

    fn visit<'a>(
        &'a self,
        step: &'a Step,
        on_path: &mut HashSet<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), CatalogError> {
        if done.contains(step.id.as_str()) {
            return Ok(());
        }
        if !on_path.insert(step.id.as_str()) {
            return Err(CatalogError::Cycle(step.id.clone()));
        }
        for target in step.targets() {
            if let Some(next) = self.get(target) {
                self.visit(next, on_path, done)?;
            }
        }
        on_path.remove(step.id.as_str());
        done.insert(step.id.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminal() -> Step {
        Step::result("end", "done")
    }

    #[test]
    fn test_travel_catalog_is_valid() {
        let catalog = StepCatalog::travel().unwrap();
        assert_eq!(catalog.initial_step_id(), step_ids::WELCOME);
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.total_steps(), 8);
        assert_eq!(catalog.position(step_ids::BUDGET), Some(1));
    }

    #[test]
    fn test_get_unknown_step_is_absent() {
        let catalog = StepCatalog::travel().unwrap();
        assert!(catalog.get("nope").is_none());
    }

    #[test]
    fn test_only_interests_is_multi_select() {
        let catalog = StepCatalog::travel().unwrap();
        let multi: Vec<&str> = catalog
            .steps
            .iter()
            .filter(|s| s.selection == SelectionMode::Multiple)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(multi, vec![step_ids::INTERESTS]);
    }

    #[test]
    fn test_option_branch_takes_precedence_over_default() {
        let step = Step::question("q", "?")
            .option_to("a", "A", "a", "left")
            .option("b", "B", "b")
            .then("right");
        assert_eq!(step.next_for(Some("a")), Some("left"));
        assert_eq!(step.next_for(Some("b")), Some("right"));
        assert_eq!(step.next_for(Some("unknown")), Some("right"));
        assert_eq!(step.next_for(None), Some("right"));
    }

    #[test]
    fn test_dangling_target_rejected() {
        let steps = vec![Step::question("q", "?").option("a", "A", "a").then("ghost"), terminal()];
        assert_eq!(
            StepCatalog::new("q", steps).unwrap_err(),
            CatalogError::DanglingTarget {
                from: "q".to_string(),
                target: "ghost".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let steps = vec![
            Step::question("q", "?").option("a", "A", "a").then("end"),
            Step::question("q", "again").option("a", "A", "a").then("end"),
            terminal(),
        ];
        assert_eq!(
            StepCatalog::new("q", steps).unwrap_err(),
            CatalogError::DuplicateStep("q".to_string())
        );
    }

    #[test]
    fn test_dead_end_rejected() {
        let steps = vec![Step::question("q", "?").option("a", "A", "a"), terminal()];
        assert_eq!(
            StepCatalog::new("q", steps).unwrap_err(),
            CatalogError::DeadEnd("q".to_string())
        );
    }

    #[test]
    fn test_options_with_own_targets_need_no_default() {
        let steps = vec![
            Step::question("q", "?").option_to("a", "A", "a", "end"),
            terminal(),
        ];
        assert!(StepCatalog::new("q", steps).is_ok());
    }

    #[test]
    fn test_cycle_rejected() {
        let steps = vec![
            Step::question("a", "?").option("x", "X", "x").then("b"),
            Step::question("b", "?")
                .option_to("back", "Back", "back", "a")
                .then("end"),
            terminal(),
        ];
        assert!(matches!(
            StepCatalog::new("a", steps).unwrap_err(),
            CatalogError::Cycle(_)
        ));
    }

    #[test]
    fn test_terminal_with_edges_rejected() {
        let steps = vec![
            Step::question("q", "?").option("a", "A", "a").then("end"),
            Step::result("end", "done").then("q"),
        ];
        assert_eq!(
            StepCatalog::new("q", steps).unwrap_err(),
            CatalogError::TerminalHasEdges("end".to_string())
        );
    }

    #[test]
    fn test_missing_initial_and_terminal_rejected() {
        let steps = vec![terminal()];
        assert_eq!(
            StepCatalog::new("start", steps).unwrap_err(),
            CatalogError::MissingInitial("start".to_string())
        );

        let no_end = vec![Step::question("q", "?").option_to("a", "A", "a", "q")];
        assert_eq!(
            StepCatalog::new("q", no_end).unwrap_err(),
            CatalogError::MissingTerminal
        );
    }
}
