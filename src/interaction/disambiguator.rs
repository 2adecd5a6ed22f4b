use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::render::EngineAction;

use super::{ClickEvent, Clock, DeadlineTimer, TargetKind, TimePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickConfig {
    /// Window in which a second click on the same target counts as a double click.
    #[serde(default = "default_double_click_delay")]
    pub double_click_delay: TimePoint,
    /// Shift-click toggles items in and out of a multi-selection.
    #[serde(default = "default_multi_select")]
    pub multi_select: bool,
    /// Resolve an expired or preempted pending click as a single click.
    #[serde(default = "default_emit_single_on_expiry")]
    pub emit_single_on_expiry: bool,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            double_click_delay: default_double_click_delay(),
            multi_select: default_multi_select(),
            emit_single_on_expiry: default_emit_single_on_expiry(),
        }
    }
}

fn default_double_click_delay() -> TimePoint {
    300
}

fn default_multi_select() -> bool {
    true
}

fn default_emit_single_on_expiry() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClickTarget {
    pub name: String,
    pub kind: TargetKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingClick {
    pub target: String,
    pub kind: TargetKind,
    pub timestamp: TimePoint,
}

/// Legend visibility as tracked by the disambiguator.
///
/// `selected_names` is empty whenever `all_visible` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_names: BTreeSet<String>,
    pub all_visible: bool,
    pub pending: Option<PendingClick>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected_names: BTreeSet::new(),
            all_visible: true,
            pending: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisambiguatorPhase {
    Idle,
    PendingSingle {
        target: String,
        kind: TargetKind,
        deadline: TimePoint,
    },
}

/// Resolved user intent together with the selection commands it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickIntent {
    SingleClick(ClickTarget),
    DoubleClick {
        target: ClickTarget,
        actions: Vec<EngineAction>,
    },
    MultiSelect {
        target: ClickTarget,
        actions: Vec<EngineAction>,
    },
}

impl ClickIntent {
    #[must_use]
    pub fn target(&self) -> &ClickTarget {
        match self {
            Self::SingleClick(target)
            | Self::DoubleClick { target, .. }
            | Self::MultiSelect { target, .. } => target,
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[EngineAction] {
        match self {
            Self::SingleClick(_) => &[],
            Self::DoubleClick { actions, .. } | Self::MultiSelect { actions, .. } => actions,
        }
    }
}

/// Turns a raw click stream into single, double and multi-select intents.
///
/// A plain click arms a timer of `double_click_delay`. A second plain click on
/// the same target and kind strictly before the deadline is a double click;
/// anything else resolves the pending click on its own. Shift-clicks never
/// touch the timer.
#[derive(Debug)]
pub struct ClickDisambiguator<C: Clock> {
    clock: C,
    config: ClickConfig,
    state: SelectionState,
    timer: DeadlineTimer,
    series_names: Vec<String>,
}

impl<C: Clock> ClickDisambiguator<C> {
    #[must_use]
    pub fn new(clock: C, config: ClickConfig) -> Self {
        Self {
            clock,
            config,
            state: SelectionState::default(),
            timer: DeadlineTimer::default(),
            series_names: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> ClickConfig {
        self.config
    }

    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.state
    }

    /// Full set of selectable names, used when isolating or restoring.
    ///
    /// Until names are set, isolating a target only re-selects it.
    pub fn set_series_names(&mut self, names: Vec<String>) {
        self.series_names = names;
    }

    #[must_use]
    pub fn series_names(&self) -> &[String] {
        &self.series_names
    }

    #[must_use]
    pub fn phase(&self) -> DisambiguatorPhase {
        match (&self.state.pending, self.timer.deadline()) {
            (Some(pending), Some(deadline)) => DisambiguatorPhase::PendingSingle {
                target: pending.target.clone(),
                kind: pending.kind,
                deadline,
            },
            _ => DisambiguatorPhase::Idle,
        }
    }

    pub fn handle_click(&mut self, event: &ClickEvent) -> Option<ClickIntent> {
        let now = self.clock.now();

        if event.modifiers.shift && self.config.multi_select {
            self.cancel_pending();
            return Some(self.toggle_multi_select(event));
        }

        let Some(pending) = self.state.pending.take() else {
            self.arm(event, now);
            return None;
        };
        let in_window = !self.timer.is_due(now);
        self.timer.cancel();

        if in_window && pending.target == event.target && pending.kind == event.kind {
            trace!(name = %event.target, "resolved double click");
            return Some(self.isolate_or_restore(event));
        }

        let resolved = self.resolve_single(pending);
        self.arm(event, now);
        resolved
    }

    /// Fires the pending click once its deadline has passed.
    pub fn poll(&mut self) -> Option<ClickIntent> {
        if !self.timer.fire_if_due(self.clock.now()) {
            return None;
        }
        let pending = self.state.pending.take()?;
        self.resolve_single(pending)
    }

    /// Drops any pending click without resolving it. Safe to call repeatedly.
    pub fn cancel_pending(&mut self) {
        self.timer.cancel();
        self.state.pending = None;
    }

    /// Clears selection and pending state, as when the bound instance changes.
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.state = SelectionState::default();
    }

    fn arm(&mut self, event: &ClickEvent, now: TimePoint) {
        self.timer.schedule(now, self.config.double_click_delay);
        self.state.pending = Some(PendingClick {
            target: event.target.clone(),
            kind: event.kind,
            timestamp: now,
        });
    }

    fn resolve_single(&self, pending: PendingClick) -> Option<ClickIntent> {
        self.config.emit_single_on_expiry.then(|| {
            ClickIntent::SingleClick(ClickTarget {
                name: pending.target,
                kind: pending.kind,
            })
        })
    }

    fn isolate_or_restore(&mut self, event: &ClickEvent) -> ClickIntent {
        let actions = if self.state.all_visible {
            self.state.all_visible = false;
            self.state.selected_names = BTreeSet::from([event.target.clone()]);
            self.isolate_actions(&event.target)
        } else {
            self.state.all_visible = true;
            self.state.selected_names.clear();
            vec![EngineAction::SelectAllLegends]
        };
        ClickIntent::DoubleClick {
            target: target_of(event),
            actions,
        }
    }

    fn toggle_multi_select(&mut self, event: &ClickEvent) -> ClickIntent {
        let name = &event.target;
        let actions = if self.state.all_visible {
            self.state.all_visible = false;
            self.state.selected_names = BTreeSet::from([name.clone()]);
            self.isolate_actions(name)
        } else if self.state.selected_names.remove(name) {
            if self.state.selected_names.is_empty() {
                self.state.all_visible = true;
                vec![EngineAction::SelectAllLegends]
            } else {
                vec![EngineAction::UnselectLegend(name.clone())]
            }
        } else {
            self.state.selected_names.insert(name.clone());
            vec![EngineAction::SelectLegend(name.clone())]
        };
        trace!(
            name = %name,
            selected = self.state.selected_names.len(),
            "multi-select toggled"
        );
        ClickIntent::MultiSelect {
            target: target_of(event),
            actions,
        }
    }

    fn isolate_actions(&self, keep: &str) -> Vec<EngineAction> {
        if self.series_names.is_empty() {
            debug!(name = %keep, "no series names known; isolation hides nothing");
        }
        self.series_names
            .iter()
            .filter(|name| name.as_str() != keep)
            .map(|name| EngineAction::UnselectLegend(name.clone()))
            .chain(std::iter::once(EngineAction::SelectLegend(keep.to_owned())))
            .collect()
    }
}

fn target_of(event: &ClickEvent) -> ClickTarget {
    ClickTarget {
        name: event.target.clone(),
        kind: event.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::{ClickConfig, ClickDisambiguator, ClickIntent, DisambiguatorPhase};
    use crate::interaction::{ClickEvent, ManualClock, Modifiers, TargetKind};
    use crate::render::EngineAction;

    fn build() -> (ManualClock, ClickDisambiguator<ManualClock>) {
        let clock = ManualClock::new();
        let mut disambiguator = ClickDisambiguator::new(clock.clone(), ClickConfig::default());
        disambiguator.set_series_names(vec!["a".to_owned(), "b".to_owned(), "c".to_owned()]);
        (clock, disambiguator)
    }

    #[test]
    fn plain_click_enters_pending_phase() {
        let (clock, mut disambiguator) = build();
        clock.set(1_000);
        assert_eq!(disambiguator.handle_click(&ClickEvent::legend("a")), None);
        assert_eq!(
            disambiguator.phase(),
            DisambiguatorPhase::PendingSingle {
                target: "a".to_owned(),
                kind: TargetKind::Legend,
                deadline: 1_300,
            }
        );
    }

    #[test]
    fn second_click_on_deadline_is_not_a_double_click() {
        let (clock, mut disambiguator) = build();
        disambiguator.handle_click(&ClickEvent::legend("a"));
        clock.advance(300);
        let intent = disambiguator.handle_click(&ClickEvent::legend("a"));
        assert!(matches!(intent, Some(ClickIntent::SingleClick(_))));
        assert!(matches!(
            disambiguator.phase(),
            DisambiguatorPhase::PendingSingle { .. }
        ));
    }

    #[test]
    fn different_kind_preempts_pending_click() {
        let (_clock, mut disambiguator) = build();
        disambiguator.handle_click(&ClickEvent::legend("a"));
        let intent = disambiguator.handle_click(&ClickEvent::series("a"));
        let Some(ClickIntent::SingleClick(target)) = intent else {
            panic!("expected single click, got {intent:?}");
        };
        assert_eq!(target.kind, TargetKind::Legend);
    }

    #[test]
    fn shift_click_discards_pending_without_single_click() {
        let (clock, mut disambiguator) = build();
        disambiguator.handle_click(&ClickEvent::legend("a"));
        let intent = disambiguator
            .handle_click(&ClickEvent::legend("b").with_modifiers(Modifiers::shift()));
        assert!(matches!(intent, Some(ClickIntent::MultiSelect { .. })));
        clock.advance(1_000);
        assert_eq!(disambiguator.poll(), None);
    }

    #[test]
    fn isolate_unselects_every_other_known_name() {
        let (_clock, mut disambiguator) = build();
        disambiguator.handle_click(&ClickEvent::legend("b"));
        let intent = disambiguator
            .handle_click(&ClickEvent::legend("b"))
            .expect("double click");
        assert_eq!(
            intent.actions(),
            [
                EngineAction::UnselectLegend("a".to_owned()),
                EngineAction::UnselectLegend("c".to_owned()),
                EngineAction::SelectLegend("b".to_owned()),
            ]
        );
    }

    #[test]
    fn isolation_without_known_names_only_reselects_target() {
        let clock = ManualClock::new();
        let mut disambiguator = ClickDisambiguator::new(clock, ClickConfig::default());
        disambiguator.handle_click(&ClickEvent::legend("b"));
        let intent = disambiguator
            .handle_click(&ClickEvent::legend("b"))
            .expect("double click");
        assert_eq!(intent.actions(), [EngineAction::SelectLegend("b".to_owned())]);
        assert!(!disambiguator.selection().all_visible);
    }

    #[test]
    fn silent_expiry_when_single_click_emission_is_disabled() {
        let clock = ManualClock::new();
        let config = ClickConfig {
            emit_single_on_expiry: false,
            ..ClickConfig::default()
        };
        let mut disambiguator = ClickDisambiguator::new(clock.clone(), config);
        disambiguator.handle_click(&ClickEvent::series("s"));
        clock.advance(400);
        assert_eq!(disambiguator.poll(), None);
        assert_eq!(disambiguator.phase(), DisambiguatorPhase::Idle);
    }
}
