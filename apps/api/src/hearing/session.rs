//! Hearing state machine: walks the step catalog one answer at a time.
//!
//! Transitions resolve in order: the selected option's own target, then the
//! step default, otherwise stay put. Every transition appends the step being
//! left to `completed_step_ids`; no step is entered twice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::catalog::{SelectionMode, Step, StepCatalog, StepKind};
use super::preferences::{apply, toggle_value, Preferences};
use super::prompts::compile;
use super::HearingError;

/// Position of the current step for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingSession {
    pub id: Uuid,
    pub current_step_id: String,
    pub preferences: Preferences,
    pub completed_step_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed: bool,
    /// Values toggled on the current multi-select step.
    pub current_selection: Vec<String>,
    /// Whether the current step has received any answer yet.
    #[serde(skip)]
    current_answered: bool,
}

impl HearingSession {
    pub fn new(catalog: &StepCatalog) -> Self {
        Self {
            id: Uuid::new_v4(),
            current_step_id: catalog.initial_step_id().to_string(),
            preferences: Preferences::default(),
            completed_step_ids: Vec::new(),
            started_at: Utc::now(),
            completed: false,
            current_selection: Vec::new(),
            current_answered: false,
        }
    }

    pub fn current_step<'a>(&self, catalog: &'a StepCatalog) -> Result<&'a Step, HearingError> {
        catalog
            .get(&self.current_step_id)
            .ok_or_else(|| HearingError::UnknownStep(self.current_step_id.clone()))
    }

    pub fn progress(&self, catalog: &StepCatalog) -> Progress {
        let total = catalog.total_steps();
        let current = catalog
            .position(&self.current_step_id)
            .map(|i| i + 1)
            .unwrap_or(0)
            .min(total);
        Progress { current, total }
    }

    /// Answers a single-select step and advances immediately.
    pub fn select(&mut self, catalog: &StepCatalog, value: &str) -> Result<String, HearingError> {
        let step = self.question_step(catalog, SelectionMode::Single)?;
        if step.find_option(value).is_none() {
            return Err(unknown_option(step, value));
        }

        let patch = apply(&step.id, &[value.to_string()])?;
        self.preferences.merge(patch);
        self.current_answered = true;

        self.advance(step.next_for(Some(value)))
    }

    /// Toggles one option of a multi-select step. Never advances.
    pub fn toggle(&mut self, catalog: &StepCatalog, value: &str) -> Result<(), HearingError> {
        let step = self.question_step(catalog, SelectionMode::Multiple)?;
        if step.find_option(value).is_none() {
            return Err(unknown_option(step, value));
        }

        let selection = toggle_value(&self.current_selection, value);
        let patch = apply(&step.id, &selection)?;
        self.preferences.merge(patch);
        // Toggling everything back off leaves the step unanswered again.
        self.current_answered = !selection.is_empty();
        self.current_selection = selection;
        Ok(())
    }

    /// Leaves a multi-select step, whatever is currently toggled.
    pub fn proceed(&mut self, catalog: &StepCatalog) -> Result<String, HearingError> {
        let step = self.question_step(catalog, SelectionMode::Multiple)?;
        self.advance(step.next_for(None))
    }

    /// Leaves an optional, unanswered question step without recording anything.
    pub fn skip(&mut self, catalog: &StepCatalog) -> Result<String, HearingError> {
        self.ensure_open()?;
        let step = self.current_step(catalog)?;
        if step.kind != StepKind::Question {
            return Err(HearingError::NotAQuestion(step.id.clone()));
        }
        if step.required {
            return Err(HearingError::SkipRequired(step.id.clone()));
        }
        if self.current_answered {
            return Err(HearingError::AlreadyAnswered(step.id.clone()));
        }
        self.advance(step.next_for(None))
    }

    /// Acknowledges the confirmation step: marks the session completed, moves
    /// to the result step, and returns the compiled prompt.
    pub fn confirm(&mut self, catalog: &StepCatalog) -> Result<String, HearingError> {
        self.ensure_open()?;
        let step = self.current_step(catalog)?;
        if step.kind != StepKind::Confirmation {
            return Err(HearingError::NotAtConfirmation(step.id.clone()));
        }

        let prompt = compile(&self.preferences);
        self.advance(step.next_for(None))?;
        self.completed = true;
        debug!(session_id = %self.id, "Hearing completed");
        Ok(prompt)
    }

    fn question_step<'a>(
        &self,
        catalog: &'a StepCatalog,
        mode: SelectionMode,
    ) -> Result<&'a Step, HearingError> {
        self.ensure_open()?;
        let step = self.current_step(catalog)?;
        if step.kind != StepKind::Question {
            return Err(HearingError::NotAQuestion(step.id.clone()));
        }
        if step.selection != mode {
            return Err(HearingError::WrongSelectionMode(step.id.clone()));
        }
        Ok(step)
    }

    fn ensure_open(&self) -> Result<(), HearingError> {
        if self.completed {
            Err(HearingError::AlreadyCompleted)
        } else {
            Ok(())
        }
    }

    fn advance(&mut self, next: Option<&str>) -> Result<String, HearingError> {
        let Some(next) = next else {
            warn!(
                step = %self.current_step_id,
                "Step has no branch target; staying put"
            );
            return Ok(self.current_step_id.clone());
        };

        if self.completed_step_ids.iter().any(|s| s == next || *s == self.current_step_id) {
            return Err(HearingError::Revisit(next.to_string()));
        }

        let left = std::mem::replace(&mut self.current_step_id, next.to_string());
        debug!(session_id = %self.id, from = %left, to = %next, "Hearing advanced");
        self.completed_step_ids.push(left);
        self.current_selection.clear();
        self.current_answered = false;
        Ok(self.current_step_id.clone())
    }
}

fn unknown_option(step: &Step, value: &str) -> HearingError {
    HearingError::UnknownOption {
        step: step.id.clone(),
        value: value.to_string(),
    }
}
