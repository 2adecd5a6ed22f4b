//! Click interaction types and the click disambiguation state machine.

mod clock;
mod disambiguator;

pub use clock::{Clock, DeadlineTimer, ManualClock, SystemClock, TimePoint};
pub use disambiguator::{
    ClickConfig, ClickDisambiguator, ClickIntent, ClickTarget, DisambiguatorPhase, PendingClick,
    SelectionState,
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Legend,
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }
}

/// Raw click delivered by the engine for a legend entry or series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub target: String,
    pub kind: TargetKind,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl ClickEvent {
    #[must_use]
    pub fn new(target: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            target: target.into(),
            kind,
            modifiers: Modifiers::default(),
        }
    }

    #[must_use]
    pub fn legend(target: impl Into<String>) -> Self {
        Self::new(target, TargetKind::Legend)
    }

    #[must_use]
    pub fn series(target: impl Into<String>) -> Self {
        Self::new(target, TargetKind::Series)
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
