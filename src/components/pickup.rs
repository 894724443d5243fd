use serde::{Deserialize, Serialize};

use super::component::{Capabilities, Component, component_boilerplate};

/// Metadata of a collectable object: what it is, what it is worth and which
/// cue plays when it is picked up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupBehaviour {
    pub description: String,
    pub value: i32,
    pub sound: String,
    #[serde(skip, default = "enabled_default")]
    enabled: bool,
}

fn enabled_default() -> bool {
    true
}

impl PickupBehaviour {
    pub fn new(description: impl Into<String>, value: i32, sound: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            value,
            sound: sound.into(),
            enabled: true,
        }
    }
}

impl Component for PickupBehaviour {
    component_boilerplate!("PickupBehaviour");

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}
