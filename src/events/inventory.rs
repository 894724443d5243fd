use serde::Serialize;

use super::EventAction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InventoryEvent {
    /// An item described by a pickup was collected.
    Add { description: String, value: i32 },
}

impl InventoryEvent {
    pub fn action(&self) -> EventAction {
        match self {
            InventoryEvent::Add { .. } => EventAction::OnAddInventory,
        }
    }
}
