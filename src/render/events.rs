use serde::{Deserialize, Serialize};

use crate::interaction::ClickEvent;

/// Raw event forwarded from the engine to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    Click(ClickEvent),
    LegendSelectionChanged(ClickEvent),
}

impl EngineEvent {
    #[must_use]
    pub fn click_event(&self) -> &ClickEvent {
        match self {
            Self::Click(event) | Self::LegendSelectionChanged(event) => event,
        }
    }
}

/// Selection command dispatched through a live instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineAction {
    SelectLegend(String),
    UnselectLegend(String),
    SelectAllLegends,
}
