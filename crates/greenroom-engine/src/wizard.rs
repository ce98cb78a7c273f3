//! Wizard step state machine.
//!
//! Fixed step order with per-step readiness gates, resume-from-draft, and the
//! trigger rule that starts a media family's upload batch exactly when the
//! user leaves the step that owns it. Readiness predicates are injected at
//! construction, so cross-component validation is explicit wiring rather
//! than ambient state.

use std::collections::HashMap;
use thiserror::Error;

use greenroom_core::WizardStep;

use crate::token::MediaFamily;

/// Hero step sub-mode: picking an image vs adjusting the picked one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroMode {
    Upload,
    Adjust,
}

/// Explicit state machine for the post-creation hero edit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroEditState {
    Viewing,
    Editing,
    Repositioning,
}

impl HeroEditState {
    /// Enter the edit region. Only legal from `Viewing`.
    pub fn begin_edit(self) -> Result<Self, StepError> {
        match self {
            HeroEditState::Viewing => Ok(HeroEditState::Editing),
            other => Err(StepError::InvalidHeroEdit {
                from: other,
                action: "begin edit",
            }),
        }
    }

    /// Toggle repositioning. Only legal while inside the edit region.
    pub fn toggle_reposition(self) -> Result<Self, StepError> {
        match self {
            HeroEditState::Editing => Ok(HeroEditState::Repositioning),
            HeroEditState::Repositioning => Ok(HeroEditState::Editing),
            HeroEditState::Viewing => Err(StepError::InvalidHeroEdit {
                from: self,
                action: "toggle reposition",
            }),
        }
    }

    /// Leave the edit region (save or cancel). Legal from any state.
    pub fn finish(self) -> Self {
        HeroEditState::Viewing
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("Step '{0}' is not ready to advance")]
    NotReady(WizardStep),

    #[error("Already at the final step")]
    AtFinalStep,

    #[error("Invalid hero edit action '{action}' from state {from:?}")]
    InvalidHeroEdit {
        from: HeroEditState,
        action: &'static str,
    },
}

/// A committed step transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepChange {
    pub from: WizardStep,
    pub to: WizardStep,
}

/// Outcome of a retreat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetreatOutcome {
    Moved(StepChange),
    /// Leaving the hero adjust sub-mode returns to the upload sub-mode
    /// instead of the previous top-level step.
    HeroModeReset,
    AtFirstStep,
}

pub type StepValidator<S> = Box<dyn Fn(&S) -> bool + Send + Sync>;

/// The step machine. Generic over the state the readiness predicates read.
pub struct StepMachine<S> {
    current: WizardStep,
    validators: HashMap<WizardStep, StepValidator<S>>,
}

impl<S> StepMachine<S> {
    pub fn new(validators: HashMap<WizardStep, StepValidator<S>>) -> Self {
        Self {
            current: WizardStep::first(),
            validators,
        }
    }

    pub fn current(&self) -> WizardStep {
        self.current
    }

    /// Whether the current step's readiness gate passes.
    pub fn is_ready(&self, state: &S) -> bool {
        match self.validators.get(&self.current) {
            Some(validator) => validator(state),
            None => true,
        }
    }

    /// Move forward one step if the current step is ready.
    pub fn advance(&mut self, state: &S) -> Result<StepChange, StepError> {
        if !self.is_ready(state) {
            return Err(StepError::NotReady(self.current));
        }
        let next = self.current.next().ok_or(StepError::AtFinalStep)?;
        let change = StepChange {
            from: self.current,
            to: next,
        };
        self.current = next;
        Ok(change)
    }

    /// Move back unconditionally. On the hero step in adjust mode, the
    /// sub-mode resets instead of leaving the step.
    pub fn retreat(&mut self, hero_mode: &mut HeroMode) -> RetreatOutcome {
        if self.current == WizardStep::HeroImage && *hero_mode == HeroMode::Adjust {
            *hero_mode = HeroMode::Upload;
            return RetreatOutcome::HeroModeReset;
        }
        match self.current.previous() {
            Some(previous) => {
                let change = StepChange {
                    from: self.current,
                    to: previous,
                };
                self.current = previous;
                RetreatOutcome::Moved(change)
            }
            None => RetreatOutcome::AtFirstStep,
        }
    }

    /// Jump straight to a saved step when resuming a draft.
    pub fn resume(&mut self, step: WizardStep) {
        self.current = step;
    }
}

/// The media family whose upload batch starts when `step` is exited.
pub fn upload_trigger(step: WizardStep) -> Option<MediaFamily> {
    match step {
        WizardStep::HeroImage => Some(MediaFamily::Hero),
        WizardStep::Tracks => Some(MediaFamily::Tracks),
        WizardStep::Videos => Some(MediaFamily::Videos),
        _ => None,
    }
}
